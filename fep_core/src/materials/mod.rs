//! # Materials
//!
//! Elastic-plastic steel definitions for the four material roles of the
//! joint: flanges, webs, end plate and bolts.
//!
//! ## Example
//!
//! ```rust
//! use fep_core::materials::{library, MaterialRole};
//!
//! let set = library::reference_set();
//! assert!(set.validate().is_ok());
//! assert_eq!(set.get(MaterialRole::Bolt).name, "Bolt");
//! ```

pub mod library;
pub mod plasticity;

pub use plasticity::{PlasticPoint, PlasticityCurve};

use serde::{Deserialize, Serialize};

use crate::errors::{JointError, JointResult};

/// Role a material plays in the joint model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialRole {
    Flange,
    Web,
    EndPlate,
    Bolt,
}

impl MaterialRole {
    pub const ALL: [MaterialRole; 4] = [
        MaterialRole::Flange,
        MaterialRole::Web,
        MaterialRole::EndPlate,
        MaterialRole::Bolt,
    ];

    /// Name given to the material in the host model unless overridden.
    pub fn default_name(&self) -> &'static str {
        match self {
            MaterialRole::Flange => "Flange",
            MaterialRole::Web => "Web",
            MaterialRole::EndPlate => "End Plate",
            MaterialRole::Bolt => "Bolt",
        }
    }
}

impl std::fmt::Display for MaterialRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.default_name())
    }
}

/// Isotropic elastic-plastic material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialModel {
    /// Name used in the host model
    pub name: String,
    /// Mass density (t/mm³)
    pub density: f64,
    /// Young's modulus (MPa)
    pub elastic_modulus_mpa: f64,
    /// Poisson ratio (-)
    pub poisson_ratio: f64,
    /// True-stress / true-plastic-strain curve
    pub plastic: PlasticityCurve,
}

impl MaterialModel {
    pub fn validate(&self) -> JointResult<()> {
        if self.name.trim().is_empty() {
            return Err(JointError::invalid_input("name", "", "Material name must not be empty"));
        }
        let field = |f: &str| format!("{}.{}", self.name, f);
        if self.density <= 0.0 || !self.density.is_finite() {
            return Err(JointError::invalid_input(
                field("density"),
                self.density.to_string(),
                "Density must be positive",
            ));
        }
        if self.elastic_modulus_mpa <= 0.0 || !self.elastic_modulus_mpa.is_finite() {
            return Err(JointError::invalid_input(
                field("elastic_modulus_mpa"),
                self.elastic_modulus_mpa.to_string(),
                "Elastic modulus must be positive",
            ));
        }
        if !(self.poisson_ratio > 0.0 && self.poisson_ratio < 0.5) {
            return Err(JointError::invalid_input(
                field("poisson_ratio"),
                self.poisson_ratio.to_string(),
                "Poisson ratio must lie in (0, 0.5)",
            ));
        }
        self.plastic.validate(&self.name)
    }

    /// Yield strain implied by the first curve point.
    pub fn yield_strain(&self) -> f64 {
        self.plastic.yield_stress_mpa() / self.elastic_modulus_mpa
    }
}

/// Materials for every role of the joint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSet {
    pub flange: MaterialModel,
    pub web: MaterialModel,
    pub end_plate: MaterialModel,
    pub bolt: MaterialModel,
}

impl MaterialSet {
    pub fn get(&self, role: MaterialRole) -> &MaterialModel {
        match role {
            MaterialRole::Flange => &self.flange,
            MaterialRole::Web => &self.web,
            MaterialRole::EndPlate => &self.end_plate,
            MaterialRole::Bolt => &self.bolt,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (MaterialRole, &MaterialModel)> {
        MaterialRole::ALL.into_iter().map(move |role| (role, self.get(role)))
    }

    /// Validate every material; names must also be unique because the host
    /// addresses materials by name.
    pub fn validate(&self) -> JointResult<()> {
        for (_, mat) in self.iter() {
            mat.validate()?;
        }
        let mut names: Vec<&str> = self.iter().map(|(_, m)| m.name.as_str()).collect();
        names.sort_unstable();
        if let Some(w) = names.windows(2).find(|w| w[0] == w[1]) {
            return Err(JointError::invalid_input(
                "materials",
                w[0],
                "Material names must be unique",
            ));
        }
        Ok(())
    }
}

impl Default for MaterialSet {
    fn default() -> Self {
        library::reference_set()
    }
}
