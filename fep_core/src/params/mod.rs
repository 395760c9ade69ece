//! # Joint Design Parameters
//!
//! The immutable set of independent inputs of one joint model. Parameters are
//! fixed at the start of a run and passed by reference to the resolver and the
//! build pipeline; nothing downstream mutates them.
//!
//! ## Units
//!
//! Lengths in mm, stresses in MPa, forces in N, density in t/mm³.
//!
//! ## Example
//!
//! ```rust
//! use fep_core::params::JointDesignParams;
//!
//! let mut params = JointDesignParams::default();
//! params.end_plate.z_variation_mm = 10.0;
//!
//! let json = serde_json::to_string_pretty(&params).unwrap();
//! assert!(json.contains("z_variation_mm"));
//! ```

pub mod analysis;
pub mod members;

pub use analysis::{AnalysisParams, LoadParams, MeshParams};
pub use members::{BoltParams, EdgeDistancePolicy, EndPlateParams, SectionParams};

use serde::{Deserialize, Serialize};

use crate::errors::{JointError, JointResult};
use crate::materials::MaterialSet;

/// Current schema version for parameter and model-document files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Independent inputs of a flush end-plate joint model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointDesignParams {
    /// Schema version (for migration compatibility)
    pub schema_version: String,
    /// Name of the model inside the host
    pub model_name: String,
    /// Name of the analysis job
    pub job_name: String,
    pub column: SectionParams,
    pub beam: SectionParams,
    pub end_plate: EndPlateParams,
    pub bolt: BoltParams,
    pub load: LoadParams,
    pub materials: MaterialSet,
    #[serde(default)]
    pub analysis: AnalysisParams,
    #[serde(default)]
    pub mesh: MeshParams,
}

impl Default for JointDesignParams {
    /// Reference specimen of the parametric study.
    fn default() -> Self {
        JointDesignParams {
            schema_version: SCHEMA_VERSION.to_string(),
            model_name: "FEP_Joint".to_string(),
            job_name: "FEP_Joint".to_string(),
            column: SectionParams::symmetric(120.0, 12.0, 240.0, 10.0, 1500.0),
            beam: SectionParams::symmetric(120.0, 12.0, 240.0, 10.0, 1500.0),
            end_plate: EndPlateParams::default(),
            bolt: BoltParams::default(),
            load: LoadParams::default(),
            materials: MaterialSet::default(),
            analysis: AnalysisParams::default(),
            mesh: MeshParams::default(),
        }
    }
}

impl JointDesignParams {
    /// Check scalar inputs that no geometric derivation covers: names,
    /// finiteness, step and mesh controls.
    ///
    /// Geometric consistency is checked by [`crate::resolver::resolve`].
    pub fn validate_inputs(&self) -> JointResult<()> {
        for (field, value) in [("model_name", &self.model_name), ("job_name", &self.job_name)] {
            if value.trim().is_empty() {
                return Err(JointError::invalid_input(
                    field,
                    value.as_str(),
                    "Name must not be empty",
                ));
            }
        }

        let scalars = [
            ("end_plate.z_variation_mm", self.end_plate.z_variation_mm),
            ("load.load_distance_mm", self.load.load_distance_mm),
            ("load.column_axial_force_n", self.load.column_axial_force_n),
            ("load.beam_tip_displacement_mm", self.load.beam_tip_displacement_mm),
            ("analysis.time_period", self.analysis.time_period),
            ("analysis.initial_increment", self.analysis.initial_increment),
            ("analysis.min_increment", self.analysis.min_increment),
            ("analysis.max_increment", self.analysis.max_increment),
            ("analysis.friction_coefficient", self.analysis.friction_coefficient),
            ("analysis.elastic_slip_fraction", self.analysis.elastic_slip_fraction),
        ];
        for (field, value) in scalars {
            if !value.is_finite() {
                return Err(JointError::invalid_input(
                    field,
                    value.to_string(),
                    "Value must be finite",
                ));
            }
        }

        let a = &self.analysis;
        if a.time_period <= 0.0 {
            return Err(JointError::invalid_input(
                "analysis.time_period",
                a.time_period.to_string(),
                "Step time period must be positive",
            ));
        }
        if !(a.min_increment > 0.0
            && a.min_increment <= a.initial_increment
            && a.initial_increment <= a.max_increment)
        {
            return Err(JointError::invalid_input(
                "analysis.initial_increment",
                a.initial_increment.to_string(),
                "Increments must satisfy 0 < min <= initial <= max",
            ));
        }
        if a.max_increment > a.time_period {
            return Err(JointError::invalid_input(
                "analysis.max_increment",
                a.max_increment.to_string(),
                "Maximum increment exceeds the step time period",
            ));
        }
        if a.friction_coefficient < 0.0 {
            return Err(JointError::invalid_input(
                "analysis.friction_coefficient",
                a.friction_coefficient.to_string(),
                "Friction coefficient cannot be negative",
            ));
        }
        if a.elastic_slip_fraction <= 0.0 {
            return Err(JointError::invalid_input(
                "analysis.elastic_slip_fraction",
                a.elastic_slip_fraction.to_string(),
                "Elastic slip fraction must be positive",
            ));
        }

        let m = &self.mesh;
        let sizes = [
            ("mesh.column_size_mm", m.column_size_mm),
            ("mesh.column_joint_edge_size_mm", m.column_joint_edge_size_mm),
            ("mesh.beam_size_mm", m.beam_size_mm),
            ("mesh.beam_edge_size_mm", m.beam_edge_size_mm),
            ("mesh.end_plate_size_mm", m.end_plate_size_mm),
            ("mesh.bolt_size_mm", m.bolt_size_mm),
        ];
        for (field, value) in sizes {
            if value <= 0.0 || !value.is_finite() {
                return Err(JointError::invalid_input(
                    field,
                    value.to_string(),
                    "Seed size must be positive",
                ));
            }
        }
        if m.column_through_thickness == 0 || m.end_plate_through_thickness == 0 {
            return Err(JointError::invalid_input(
                "mesh.through_thickness",
                "0",
                "At least one element is needed through the thickness",
            ));
        }

        self.materials.validate()
    }
}
