//! CAE host boundary: the command vocabulary and the host trait.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::features::{FeatureLocator, FeatureTag};
use crate::geometry::{Placement, PrincipalPlane, Vec3};
use crate::resolver::Part;

/// Failure reported by a host. The message is the host's own text.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct HostError {
    pub message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        HostError {
            message: message.into(),
        }
    }
}

/// A CAE host session that builds one model.
pub trait CaeHost {
    /// Start (or replace) the named model.
    fn create_model(&mut self, name: &str) -> Result<(), HostError>;

    /// Apply one model-building command.
    fn apply(&mut self, command: &HostCommand) -> Result<(), HostError>;

    /// Submit a previously created job for analysis.
    fn submit(&mut self, job: &str) -> Result<(), HostError>;
}

/// Circle in a part sketch plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub centre: [f64; 2],
    pub diameter_mm: f64,
}

/// Coaxial cylinder segment along the part Z axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CylinderSegment {
    pub z_start_mm: f64,
    pub z_end_mm: f64,
    pub diameter_mm: f64,
}

/// Base feature of a part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PartBody {
    /// Closed XY profile extruded along +Z, minus circular holes
    ExtrudedSolid {
        profile: Vec<[f64; 2]>,
        holes: Vec<Circle>,
        depth_mm: f64,
    },
    /// Open XY polylines extruded along +Z as shell faces
    ExtrudedShell {
        polylines: Vec<Vec<[f64; 2]>>,
        depth_mm: f64,
    },
    StackedCylinders { segments: Vec<CylinderSegment> },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionKind {
    Solid,
    Shell { thickness_mm: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementShape {
    Hex,
    HexDominated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MeshTechnique {
    Structured,
    Sweep,
    SweepMedialAxis,
}

/// Edge seeding rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum SeedRule {
    Size { size_mm: f64 },
    Number { count: u32 },
}

/// Prescribed degrees of freedom; `None` leaves the DOF free.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DofValues {
    pub u1: Option<f64>,
    pub u2: Option<f64>,
    pub u3: Option<f64>,
    pub ur1: Option<f64>,
    pub ur2: Option<f64>,
    pub ur3: Option<f64>,
}

impl DofValues {
    /// Every DOF fixed at zero.
    pub fn encastre() -> Self {
        DofValues {
            u1: Some(0.0),
            u2: Some(0.0),
            u3: Some(0.0),
            ur1: Some(0.0),
            ur2: Some(0.0),
            ur3: Some(0.0),
        }
    }
}

/// One model-building instruction with fully resolved values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HostCommand {
    CreateMaterial {
        name: String,
        density: f64,
        elastic_modulus_mpa: f64,
        poisson_ratio: f64,
        /// (true stress, true plastic strain) table
        plastic: Vec<(f64, f64)>,
    },
    CreatePart {
        part: Part,
        body: PartBody,
    },
    PartitionCells {
        part: Part,
        plane: PrincipalPlane,
        offset_mm: f64,
    },
    CutHole {
        part: Part,
        centre: Vec3,
        direction: Vec3,
        diameter_mm: f64,
        depth_mm: f64,
    },
    CreateSection {
        name: String,
        material: String,
        section: SectionKind,
    },
    AssignSection {
        part: Part,
        section: String,
        region: FeatureTag,
        locator: FeatureLocator,
    },
    CreateInstance {
        name: String,
        part: Part,
        placement: Placement,
    },
    CreateSurface {
        name: String,
        instance: String,
        region: FeatureTag,
        locator: FeatureLocator,
    },
    CreateSet {
        name: String,
        instance: String,
        region: FeatureTag,
        locator: FeatureLocator,
    },
    Tie {
        name: String,
        main_surface: String,
        secondary_surface: String,
    },
    /// All-with-self contact, hard normal behaviour, penalty friction
    GeneralContact {
        name: String,
        friction_coefficient: f64,
        elastic_slip_fraction: f64,
    },
    CreateReferencePoint {
        name: String,
        position: Vec3,
    },
    RigidBody {
        name: String,
        reference_point: String,
        tie_set: String,
    },
    SeedPart {
        part: Part,
        size_mm: f64,
        through_thickness: Option<u32>,
    },
    SeedEdges {
        part: Part,
        region: FeatureTag,
        locator: FeatureLocator,
        rule: SeedRule,
    },
    MeshControl {
        part: Part,
        region: FeatureTag,
        locator: FeatureLocator,
        shape: ElementShape,
        technique: MeshTechnique,
    },
    GenerateMesh {
        part: Part,
    },
    CreateStep {
        name: String,
        time_period: f64,
        initial_increment: f64,
        min_increment: f64,
        max_increment: f64,
        max_increments: u32,
        nlgeom: bool,
    },
    FieldOutput {
        step: String,
        variables: Vec<String>,
    },
    CreateAmplitude {
        name: String,
        /// (time, factor) pairs
        points: Vec<(f64, f64)>,
    },
    ConcentratedForce {
        name: String,
        step: String,
        reference_point: String,
        force: Vec3,
        amplitude: Option<String>,
    },
    DisplacementBc {
        name: String,
        step: String,
        reference_point: String,
        dofs: DofValues,
        amplitude: Option<String>,
    },
    CreateJob {
        name: String,
        model: String,
        memory_percent: u8,
        cpus: u32,
    },
}

impl HostCommand {
    /// Operation name, matching the serialized `op` tag.
    pub fn op(&self) -> &'static str {
        match self {
            HostCommand::CreateMaterial { .. } => "create_material",
            HostCommand::CreatePart { .. } => "create_part",
            HostCommand::PartitionCells { .. } => "partition_cells",
            HostCommand::CutHole { .. } => "cut_hole",
            HostCommand::CreateSection { .. } => "create_section",
            HostCommand::AssignSection { .. } => "assign_section",
            HostCommand::CreateInstance { .. } => "create_instance",
            HostCommand::CreateSurface { .. } => "create_surface",
            HostCommand::CreateSet { .. } => "create_set",
            HostCommand::Tie { .. } => "tie",
            HostCommand::GeneralContact { .. } => "general_contact",
            HostCommand::CreateReferencePoint { .. } => "create_reference_point",
            HostCommand::RigidBody { .. } => "rigid_body",
            HostCommand::SeedPart { .. } => "seed_part",
            HostCommand::SeedEdges { .. } => "seed_edges",
            HostCommand::MeshControl { .. } => "mesh_control",
            HostCommand::GenerateMesh { .. } => "generate_mesh",
            HostCommand::CreateStep { .. } => "create_step",
            HostCommand::FieldOutput { .. } => "field_output",
            HostCommand::CreateAmplitude { .. } => "create_amplitude",
            HostCommand::ConcentratedForce { .. } => "concentrated_force",
            HostCommand::DisplacementBc { .. } => "displacement_bc",
            HostCommand::CreateJob { .. } => "create_job",
        }
    }

    /// Short description for logs and error reports, e.g. `create_part(Column)`.
    pub fn label(&self) -> String {
        let target = match self {
            HostCommand::CreateMaterial { name, .. }
            | HostCommand::CreateSection { name, .. }
            | HostCommand::CreateInstance { name, .. }
            | HostCommand::CreateSurface { name, .. }
            | HostCommand::CreateSet { name, .. }
            | HostCommand::Tie { name, .. }
            | HostCommand::GeneralContact { name, .. }
            | HostCommand::CreateReferencePoint { name, .. }
            | HostCommand::RigidBody { name, .. }
            | HostCommand::CreateStep { name, .. }
            | HostCommand::CreateAmplitude { name, .. }
            | HostCommand::ConcentratedForce { name, .. }
            | HostCommand::DisplacementBc { name, .. }
            | HostCommand::CreateJob { name, .. } => name.clone(),
            HostCommand::CreatePart { part, .. }
            | HostCommand::PartitionCells { part, .. }
            | HostCommand::CutHole { part, .. }
            | HostCommand::SeedPart { part, .. }
            | HostCommand::GenerateMesh { part } => part.to_string(),
            HostCommand::AssignSection { part, section, .. } => format!("{part}:{section}"),
            HostCommand::SeedEdges { part, region, .. }
            | HostCommand::MeshControl { part, region, .. } => format!("{part}:{region:?}"),
            HostCommand::FieldOutput { step, .. } => step.clone(),
        };
        format!("{}({})", self.op(), target)
    }
}
