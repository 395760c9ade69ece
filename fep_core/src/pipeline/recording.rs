//! In-memory host that records commands and checks that every command only
//! references entities created before it.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::host::{CaeHost, HostCommand, HostError};
use crate::document::ModelDocument;
use crate::features::Frame;
use crate::params::JointDesignParams;
use crate::resolver::{Part, ResolvedGeometry};

/// Recording host session.
///
/// Creating an entity under an existing name replaces it, as a CAE host
/// would, so a partial rebuild can be replayed into the same session.
#[derive(Debug, Default)]
pub struct RecordingHost {
    model: Option<String>,
    materials: BTreeSet<String>,
    parts: BTreeSet<Part>,
    sections: BTreeSet<String>,
    instances: BTreeMap<String, Part>,
    surfaces: BTreeSet<String>,
    sets: BTreeSet<String>,
    reference_points: BTreeSet<String>,
    seeded: BTreeSet<Part>,
    steps: BTreeSet<String>,
    amplitudes: BTreeSet<String>,
    jobs: BTreeSet<String>,
    commands: Vec<HostCommand>,
    submitted: Vec<String>,
    fail_on: Option<(String, HostError)>,
}

fn require(known: bool, what: &str, name: &str) -> Result<(), HostError> {
    if known {
        Ok(())
    } else {
        Err(HostError::new(format!("{what} '{name}' does not exist")))
    }
}

impl RecordingHost {
    pub fn new() -> Self {
        RecordingHost::default()
    }

    /// Fail the first command whose operation name is `op` with `message`.
    pub fn failing_on(mut self, op: impl Into<String>, message: impl Into<String>) -> Self {
        self.fail_on = Some((op.into(), HostError::new(message)));
        self
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn commands(&self) -> &[HostCommand] {
        &self.commands
    }

    pub fn submitted_jobs(&self) -> &[String] {
        &self.submitted
    }

    /// Wrap the recorded session into a model document.
    pub fn into_document(
        self,
        params: JointDesignParams,
        geometry: ResolvedGeometry,
    ) -> ModelDocument {
        let mut doc = ModelDocument::new(params, geometry);
        doc.extend_commands(self.commands);
        doc.submitted_jobs = self.submitted;
        doc
    }

    fn require_part(&self, part: Part) -> Result<(), HostError> {
        require(self.parts.contains(&part), "Part", part.name())
    }

    fn require_instance(&self, name: &str) -> Result<(), HostError> {
        require(self.instances.contains_key(name), "Instance", name)
    }

    fn check(&self, command: &HostCommand) -> Result<(), HostError> {
        match command {
            HostCommand::CreateMaterial { plastic, .. } => {
                if plastic.is_empty() {
                    return Err(HostError::new("Plastic table is empty"));
                }
                Ok(())
            }
            HostCommand::CreatePart { .. } | HostCommand::CreateReferencePoint { .. } => Ok(()),
            HostCommand::PartitionCells { part, .. } | HostCommand::CutHole { part, .. } => {
                self.require_part(*part)
            }
            HostCommand::CreateSection { material, .. } => {
                require(self.materials.contains(material), "Material", material)
            }
            HostCommand::AssignSection {
                part, section, locator, ..
            } => {
                self.require_part(*part)?;
                require(self.sections.contains(section), "Section", section)?;
                if locator.frame != Frame::Part(*part) {
                    return Err(HostError::new(format!("Region is not on part '{}'", part)));
                }
                Ok(())
            }
            HostCommand::CreateInstance { part, .. } => self.require_part(*part),
            HostCommand::CreateSurface {
                instance, locator, ..
            }
            | HostCommand::CreateSet {
                instance, locator, ..
            } => {
                self.require_instance(instance)?;
                let part = self.instances[instance.as_str()];
                if locator.frame != Frame::Part(part) {
                    return Err(HostError::new(format!("Region is not on instance '{}'", instance)));
                }
                Ok(())
            }
            HostCommand::Tie {
                main_surface,
                secondary_surface,
                ..
            } => {
                require(self.surfaces.contains(main_surface), "Surface", main_surface)?;
                require(self.surfaces.contains(secondary_surface), "Surface", secondary_surface)
            }
            HostCommand::GeneralContact { .. } => {
                if self.instances.is_empty() {
                    return Err(HostError::new("General contact needs at least one instance"));
                }
                Ok(())
            }
            HostCommand::RigidBody {
                reference_point,
                tie_set,
                ..
            } => {
                require(
                    self.reference_points.contains(reference_point),
                    "Reference point",
                    reference_point,
                )?;
                require(self.sets.contains(tie_set), "Set", tie_set)
            }
            HostCommand::SeedPart { part, .. }
            | HostCommand::SeedEdges { part, .. }
            | HostCommand::MeshControl { part, .. } => self.require_part(*part),
            HostCommand::GenerateMesh { part } => {
                self.require_part(*part)?;
                require(self.seeded.contains(part), "Seed for part", part.name())
            }
            HostCommand::CreateStep { .. } | HostCommand::CreateAmplitude { .. } => Ok(()),
            HostCommand::FieldOutput { step, .. } => {
                require(self.steps.contains(step), "Step", step)
            }
            HostCommand::ConcentratedForce {
                step,
                reference_point,
                amplitude,
                ..
            }
            | HostCommand::DisplacementBc {
                step,
                reference_point,
                amplitude,
                ..
            } => {
                require(self.steps.contains(step), "Step", step)?;
                require(
                    self.reference_points.contains(reference_point),
                    "Reference point",
                    reference_point,
                )?;
                if let Some(amp) = amplitude {
                    require(self.amplitudes.contains(amp), "Amplitude", amp)?;
                }
                Ok(())
            }
            HostCommand::CreateJob { model, .. } => {
                if self.model.as_deref() != Some(model.as_str()) {
                    return Err(HostError::new(format!("Model '{}' does not exist", model)));
                }
                Ok(())
            }
        }
    }

    fn register(&mut self, command: &HostCommand) {
        match command {
            HostCommand::CreateMaterial { name, .. } => {
                self.materials.insert(name.clone());
            }
            HostCommand::CreatePart { part, .. } => {
                self.parts.insert(*part);
            }
            HostCommand::CreateSection { name, .. } => {
                self.sections.insert(name.clone());
            }
            HostCommand::CreateInstance { name, part, .. } => {
                self.instances.insert(name.clone(), *part);
            }
            HostCommand::CreateSurface { name, .. } => {
                self.surfaces.insert(name.clone());
            }
            HostCommand::CreateSet { name, .. } => {
                self.sets.insert(name.clone());
            }
            HostCommand::CreateReferencePoint { name, .. } => {
                self.reference_points.insert(name.clone());
            }
            HostCommand::SeedPart { part, .. } => {
                self.seeded.insert(*part);
            }
            HostCommand::CreateStep { name, .. } => {
                self.steps.insert(name.clone());
            }
            HostCommand::CreateAmplitude { name, .. } => {
                self.amplitudes.insert(name.clone());
            }
            HostCommand::CreateJob { name, .. } => {
                self.jobs.insert(name.clone());
            }
            _ => {}
        }
    }
}

impl CaeHost for RecordingHost {
    fn create_model(&mut self, name: &str) -> Result<(), HostError> {
        if name.trim().is_empty() {
            return Err(HostError::new("Model name must not be empty"));
        }
        self.model = Some(name.to_string());
        Ok(())
    }

    fn apply(&mut self, command: &HostCommand) -> Result<(), HostError> {
        if self.model.is_none() {
            return Err(HostError::new("No model is open"));
        }
        if self.fail_on.as_ref().is_some_and(|(op, _)| op == command.op()) {
            if let Some((_, err)) = self.fail_on.take() {
                return Err(err);
            }
        }
        self.check(command)?;
        self.register(command);
        debug!(command = %command.label(), "recorded");
        self.commands.push(command.clone());
        Ok(())
    }

    fn submit(&mut self, job: &str) -> Result<(), HostError> {
        require(self.jobs.contains(job), "Job", job)?;
        self.submitted.push(job.to_string());
        Ok(())
    }
}
