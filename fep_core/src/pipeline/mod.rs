//! # Model-Build Pipeline
//!
//! Drives a CAE host through the construction of the joint model, one stage
//! at a time. Stages form a dependency graph ([`StageGraph`]); a parameter
//! change re-runs only the stages downstream of the parameters it touches.
//!
//! The host is reached only through the [`CaeHost`] trait. Every host call
//! carries fully resolved values, so a build either fails up front with a
//! design error or hands the host a consistent model.
//!
//! ## Example
//!
//! ```rust
//! use fep_core::params::JointDesignParams;
//! use fep_core::pipeline::{BuildOptions, ModelBuilder, RecordingHost};
//!
//! let params = JointDesignParams::default();
//! let builder = ModelBuilder::new(&params).unwrap();
//!
//! let mut host = RecordingHost::new();
//! let report = builder.build(&mut host, BuildOptions::default()).unwrap();
//! assert_eq!(report.stages.len(), 15);
//! assert!(host.commands().len() > 50);
//! ```

pub mod build;
pub mod graph;
pub mod host;
pub mod recording;

pub use build::{BuildOptions, BuildReport, ModelBuilder};
pub use graph::StageGraph;
pub use host::{CaeHost, HostCommand, HostError};
pub use recording::RecordingHost;

use serde::{Deserialize, Serialize};

use crate::errors::JointError;

/// Build stages, in their default execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    Materials,
    Parts,
    Partitions,
    Holes,
    Sections,
    SectionAssignment,
    Assembly,
    Interactions,
    ReferencePoints,
    RigidBodies,
    Mesh,
    Step,
    Amplitudes,
    Loads,
    Job,
}

impl Stage {
    pub const ALL: [Stage; 15] = [
        Stage::Materials,
        Stage::Parts,
        Stage::Partitions,
        Stage::Holes,
        Stage::Sections,
        Stage::SectionAssignment,
        Stage::Assembly,
        Stage::Interactions,
        Stage::ReferencePoints,
        Stage::RigidBodies,
        Stage::Mesh,
        Stage::Step,
        Stage::Amplitudes,
        Stage::Loads,
        Stage::Job,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Stage::Materials => "materials",
            Stage::Parts => "parts",
            Stage::Partitions => "partitions",
            Stage::Holes => "holes",
            Stage::Sections => "sections",
            Stage::SectionAssignment => "section-assignment",
            Stage::Assembly => "assembly",
            Stage::Interactions => "interactions",
            Stage::ReferencePoints => "reference-points",
            Stage::RigidBodies => "rigid-bodies",
            Stage::Mesh => "mesh",
            Stage::Step => "step",
            Stage::Amplitudes => "amplitudes",
            Stage::Loads => "loads",
            Stage::Job => "job",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Groups of parameters that change together in a study.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamGroup {
    Column,
    Beam,
    EndPlate,
    Bolt,
    Load,
    Materials,
    Analysis,
    Mesh,
}

impl ParamGroup {
    pub const ALL: [ParamGroup; 8] = [
        ParamGroup::Column,
        ParamGroup::Beam,
        ParamGroup::EndPlate,
        ParamGroup::Bolt,
        ParamGroup::Load,
        ParamGroup::Materials,
        ParamGroup::Analysis,
        ParamGroup::Mesh,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ParamGroup::Column => "column",
            ParamGroup::Beam => "beam",
            ParamGroup::EndPlate => "end-plate",
            ParamGroup::Bolt => "bolt",
            ParamGroup::Load => "load",
            ParamGroup::Materials => "materials",
            ParamGroup::Analysis => "analysis",
            ParamGroup::Mesh => "mesh",
        }
    }

    /// Stages that read this group directly.
    pub fn direct_stages(&self) -> &'static [Stage] {
        match self {
            ParamGroup::Column | ParamGroup::EndPlate | ParamGroup::Bolt => &[Stage::Parts],
            // Beam flange and web thicknesses feed the shell sections.
            ParamGroup::Beam => &[Stage::Parts, Stage::Sections],
            // The load distance positions the load section partition.
            ParamGroup::Load => &[Stage::Partitions, Stage::ReferencePoints, Stage::Loads],
            ParamGroup::Materials => &[Stage::Materials],
            ParamGroup::Analysis => &[Stage::Interactions, Stage::Step, Stage::Amplitudes],
            ParamGroup::Mesh => &[Stage::Mesh],
        }
    }
}

impl std::fmt::Display for ParamGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ParamGroup {
    type Err = JointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ParamGroup::ALL
            .into_iter()
            .find(|g| g.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                let known: Vec<&str> = ParamGroup::ALL.iter().map(|g| g.name()).collect();
                JointError::invalid_input(
                    "group",
                    s,
                    format!("Expected one of: {}", known.join(", ")),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_all_is_sorted() {
        let mut sorted = Stage::ALL;
        sorted.sort();
        assert_eq!(sorted, Stage::ALL);
    }

    #[test]
    fn test_param_group_parsing() {
        assert_eq!("end-plate".parse::<ParamGroup>().unwrap(), ParamGroup::EndPlate);
        assert_eq!("MESH".parse::<ParamGroup>().unwrap(), ParamGroup::Mesh);
        assert!("flange".parse::<ParamGroup>().is_err());
    }
}
