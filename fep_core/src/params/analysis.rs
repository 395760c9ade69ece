//! Loading, analysis-step and mesh parameters.

use serde::{Deserialize, Serialize};

/// Loads and imposed displacements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadParams {
    /// Column flange face to the beam load point (mm)
    pub load_distance_mm: f64,
    /// Axial force applied at the column top (N, compression positive)
    pub column_axial_force_n: f64,
    /// Vertical displacement imposed at the load point (mm, negative is down)
    pub beam_tip_displacement_mm: f64,
}

impl Default for LoadParams {
    fn default() -> Self {
        LoadParams {
            load_distance_mm: 1470.0,
            column_axial_force_n: 20_000.0,
            beam_tip_displacement_mm: -300.0,
        }
    }
}

/// Static general step controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParams {
    pub step_name: String,
    pub time_period: f64,
    pub initial_increment: f64,
    pub min_increment: f64,
    pub max_increment: f64,
    pub max_increments: u32,
    /// Geometric nonlinearity
    pub nlgeom: bool,
    /// Penalty friction coefficient of the general contact
    pub friction_coefficient: f64,
    /// Allowed elastic slip as a fraction of the characteristic element length
    pub elastic_slip_fraction: f64,
    pub field_outputs: Vec<String>,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        AnalysisParams {
            step_name: "Loading".to_string(),
            time_period: 1.0,
            initial_increment: 0.01,
            min_increment: 1e-15,
            max_increment: 0.1,
            max_increments: 100_000,
            nlgeom: true,
            friction_coefficient: 0.35,
            elastic_slip_fraction: 0.005,
            field_outputs: ["S", "PE", "PEEQ", "U", "RF", "CF", "EVOL", "STATUS"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Mesh seeds per part (sizes in mm).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshParams {
    pub column_size_mm: f64,
    /// Seed size on column edges inside the joint zone
    pub column_joint_edge_size_mm: f64,
    /// Elements through the column flange and web thickness
    pub column_through_thickness: u32,
    pub beam_size_mm: f64,
    /// Seed size on beam edges near the end plate and the load section
    pub beam_edge_size_mm: f64,
    pub end_plate_size_mm: f64,
    /// Elements through the end-plate thickness
    pub end_plate_through_thickness: u32,
    pub bolt_size_mm: f64,
}

impl Default for MeshParams {
    fn default() -> Self {
        MeshParams {
            column_size_mm: 40.0,
            column_joint_edge_size_mm: 8.0,
            column_through_thickness: 2,
            beam_size_mm: 40.0,
            beam_edge_size_mm: 8.0,
            end_plate_size_mm: 8.0,
            end_plate_through_thickness: 2,
            bolt_size_mm: 5.0,
        }
    }
}
