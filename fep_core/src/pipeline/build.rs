//! Stage-by-stage command emission and host driving.

use serde::{Deserialize, Serialize};
use tracing::{info, info_span, warn};

use super::graph::StageGraph;
use super::host::{
    CaeHost, Circle, CylinderSegment, DofValues, ElementShape, HostCommand, MeshTechnique, PartBody,
    SectionKind, SeedRule,
};
use super::{ParamGroup, Stage};
use crate::errors::{JointError, JointResult};
use crate::features::{locate, FeatureTag};
use crate::geometry::Vec3;
use crate::params::JointDesignParams;
use crate::resolver::{resolve, GeometryNote, Part, ReferenceRole, ResolvedGeometry};

pub const CONSTANT_AMPLITUDE: &str = "Constant_Amp_Load";
pub const RAMP_AMPLITUDE: &str = "Ramp_Amp_Def";

const COLUMN_INSTANCE: &str = "Column-1";
const BEAM_INSTANCE: &str = "Beam-1";
const END_PLATE_INSTANCE: &str = "End_Plate-1";

const JOB_MEMORY_PERCENT: u8 = 90;
const JOB_CPUS: u32 = 1;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Submit the job once the model is complete
    pub submit: bool,
}

/// Summary of one build or rebuild.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildReport {
    pub model_name: String,
    pub job_name: String,
    pub stages: Vec<Stage>,
    pub commands_issued: usize,
    pub submitted: bool,
    pub notes: Vec<GeometryNote>,
}

/// Drives a host through the model build for one parameter set.
#[derive(Debug, Clone)]
pub struct ModelBuilder<'a> {
    params: &'a JointDesignParams,
    geometry: ResolvedGeometry,
    graph: StageGraph,
}

impl<'a> ModelBuilder<'a> {
    /// Resolve the geometry; any design error is returned here, before a
    /// host is involved.
    pub fn new(params: &'a JointDesignParams) -> JointResult<Self> {
        let geometry = resolve(params)?;
        Ok(ModelBuilder {
            params,
            geometry,
            graph: StageGraph::standard(),
        })
    }

    pub fn geometry(&self) -> &ResolvedGeometry {
        &self.geometry
    }

    pub fn graph(&self) -> &StageGraph {
        &self.graph
    }

    /// Build the whole model.
    ///
    /// # Errors
    ///
    /// `Host` with the host's message when the host rejects a command.
    pub fn build(&self, host: &mut dyn CaeHost, options: BuildOptions) -> JointResult<BuildReport> {
        let span = info_span!("build", model = %self.params.model_name);
        let _guard = span.enter();

        host.create_model(&self.params.model_name)
            .map_err(|e| JointError::host("model", "create_model", e.message))?;
        let stages = self.graph.topological_order()?;
        self.run(host, stages, options)
    }

    /// Re-run only the stages affected by a change to `group`.
    pub fn rebuild(
        &self,
        host: &mut dyn CaeHost,
        group: ParamGroup,
        options: BuildOptions,
    ) -> JointResult<BuildReport> {
        let span = info_span!("rebuild", model = %self.params.model_name, %group);
        let _guard = span.enter();

        let stages = self.graph.stages_for_change(group)?;
        self.run(host, stages, options)
    }

    fn run(
        &self,
        host: &mut dyn CaeHost,
        stages: Vec<Stage>,
        options: BuildOptions,
    ) -> JointResult<BuildReport> {
        for note in &self.geometry.notes {
            warn!(code = %note.code, "{}", note.message);
        }

        let mut issued = 0;
        for &stage in &stages {
            let commands = self.commands_for(stage)?;
            info!(%stage, commands = commands.len(), "running stage");
            for command in &commands {
                host.apply(command)
                    .map_err(|e| JointError::host(stage.name(), command.label(), e.message))?;
            }
            issued += commands.len();
        }

        let job = &self.params.job_name;
        let submitted = options.submit && stages.contains(&Stage::Job);
        if submitted {
            host.submit(job).map_err(|e| {
                JointError::host(Stage::Job.name(), format!("submit({job})"), e.message)
            })?;
            info!(%job, "job submitted");
        }

        Ok(BuildReport {
            model_name: self.params.model_name.clone(),
            job_name: job.clone(),
            stages,
            commands_issued: issued,
            submitted,
            notes: self.geometry.notes.clone(),
        })
    }

    /// Commands a stage issues, in order.
    pub fn commands_for(&self, stage: Stage) -> JointResult<Vec<HostCommand>> {
        match stage {
            Stage::Materials => Ok(self.materials()),
            Stage::Parts => Ok(self.parts()),
            Stage::Partitions => Ok(self.partitions()),
            Stage::Holes => Ok(self.holes()),
            Stage::Sections => Ok(self.sections()),
            Stage::SectionAssignment => self.section_assignment(),
            Stage::Assembly => Ok(self.assembly()),
            Stage::Interactions => self.interactions(),
            Stage::ReferencePoints => Ok(self.reference_points()),
            Stage::RigidBodies => self.rigid_bodies(),
            Stage::Mesh => self.mesh(),
            Stage::Step => Ok(self.step()),
            Stage::Amplitudes => Ok(self.amplitudes()),
            Stage::Loads => self.loads(),
            Stage::Job => Ok(self.job()),
        }
    }

    fn materials(&self) -> Vec<HostCommand> {
        self.params
            .materials
            .iter()
            .map(|(_, m)| HostCommand::CreateMaterial {
                name: m.name.clone(),
                density: m.density,
                elastic_modulus_mpa: m.elastic_modulus_mpa,
                poisson_ratio: m.poisson_ratio,
                plastic: m.plastic.as_table(),
            })
            .collect()
    }

    fn parts(&self) -> Vec<HostCommand> {
        let p = self.params;
        let g = &self.geometry;

        let c = &p.column;
        let (ht, hb, tw) = (c.depth_mm / 2.0, -c.depth_mm / 2.0, c.web_thickness_mm / 2.0);
        let (wt, wb) = (c.flange_top_width_mm / 2.0, c.flange_bottom_width_mm / 2.0);
        let (it, ib) = (ht - c.flange_top_thickness_mm, hb + c.flange_bottom_thickness_mm);
        let column_profile = vec![
            [-wb, hb],
            [wb, hb],
            [wb, ib],
            [tw, ib],
            [tw, it],
            [wt, it],
            [wt, ht],
            [-wt, ht],
            [-wt, it],
            [-tw, it],
            [-tw, ib],
            [-wb, ib],
        ];

        let b = &p.beam;
        let yt = b.depth_mm / 2.0 - b.flange_top_thickness_mm / 2.0;
        let yb = -(b.depth_mm / 2.0 - b.flange_bottom_thickness_mm / 2.0);
        let beam_lines = vec![
            vec![[-b.flange_top_width_mm / 2.0, yt], [b.flange_top_width_mm / 2.0, yt]],
            vec![[-b.flange_bottom_width_mm / 2.0, yb], [b.flange_bottom_width_mm / 2.0, yb]],
            vec![[0.0, yb], [0.0, yt]],
        ];

        let ep = &p.end_plate;
        let (hw, hh) = (ep.width_mm / 2.0, ep.height_mm / 2.0);
        let plate_holes: Vec<Circle> = g
            .layout
            .bolt_positions()
            .map(|(_, x, y)| Circle {
                centre: [x, y],
                diameter_mm: g.bolt.hole_diameter_mm,
            })
            .collect();

        let bolt = &g.bolt;
        let segments = vec![
            CylinderSegment {
                z_start_mm: -bolt.nut_thickness_mm,
                z_end_mm: 0.0,
                diameter_mm: bolt.nut_diameter_mm,
            },
            CylinderSegment {
                z_start_mm: 0.0,
                z_end_mm: bolt.grip_length_mm,
                diameter_mm: bolt.shank_diameter_mm,
            },
            CylinderSegment {
                z_start_mm: bolt.grip_length_mm,
                z_end_mm: bolt.grip_length_mm + bolt.head_thickness_mm,
                diameter_mm: bolt.head_diameter_mm,
            },
        ];

        vec![
            HostCommand::CreatePart {
                part: Part::Column,
                body: PartBody::ExtrudedSolid {
                    profile: column_profile,
                    holes: Vec::new(),
                    depth_mm: c.length_mm,
                },
            },
            HostCommand::CreatePart {
                part: Part::Beam,
                body: PartBody::ExtrudedShell {
                    polylines: beam_lines,
                    depth_mm: b.length_mm,
                },
            },
            HostCommand::CreatePart {
                part: Part::EndPlate,
                body: PartBody::ExtrudedSolid {
                    profile: vec![[-hw, -hh], [hw, -hh], [hw, hh], [-hw, hh]],
                    holes: plate_holes,
                    depth_mm: ep.thickness_mm,
                },
            },
            HostCommand::CreatePart {
                part: Part::Bolt,
                body: PartBody::StackedCylinders { segments },
            },
        ]
    }

    fn partitions(&self) -> Vec<HostCommand> {
        self.geometry
            .datum_planes
            .iter()
            .map(|d| HostCommand::PartitionCells {
                part: d.part,
                plane: d.plane,
                offset_mm: d.offset_mm,
            })
            .collect()
    }

    fn holes(&self) -> Vec<HostCommand> {
        self.geometry
            .holes
            .iter()
            .map(|h| HostCommand::CutHole {
                part: Part::Column,
                centre: h.centre,
                direction: h.direction,
                diameter_mm: h.diameter_mm,
                depth_mm: h.depth_mm,
            })
            .collect()
    }

    fn sections(&self) -> Vec<HostCommand> {
        let m = &self.params.materials;
        let b = &self.params.beam;
        let solid = |name: &str, material: &str| HostCommand::CreateSection {
            name: name.to_string(),
            material: material.to_string(),
            section: SectionKind::Solid,
        };
        let shell = |name: &str, material: &str, thickness_mm: f64| HostCommand::CreateSection {
            name: name.to_string(),
            material: material.to_string(),
            section: SectionKind::Shell { thickness_mm },
        };
        vec![
            solid("Column_Flange", &m.flange.name),
            solid("Column_Web", &m.web.name),
            solid("End_Plate", &m.end_plate.name),
            solid("Bolt", &m.bolt.name),
            shell("Beam_Top_Flange", &m.flange.name, b.flange_top_thickness_mm),
            shell("Beam_Bottom_Flange", &m.flange.name, b.flange_bottom_thickness_mm),
            shell("Beam_Web", &m.web.name, b.web_thickness_mm),
        ]
    }

    fn section_assignment(&self) -> JointResult<Vec<HostCommand>> {
        [
            (Part::Column, "Column_Flange", FeatureTag::ColumnFlangeCells),
            (Part::Column, "Column_Web", FeatureTag::ColumnWebCells),
            (Part::EndPlate, "End_Plate", FeatureTag::EndPlateCells),
            (Part::Bolt, "Bolt", FeatureTag::BoltCells),
            (Part::Beam, "Beam_Top_Flange", FeatureTag::BeamTopFlangeFaces),
            (Part::Beam, "Beam_Bottom_Flange", FeatureTag::BeamBottomFlangeFaces),
            (Part::Beam, "Beam_Web", FeatureTag::BeamWebFaces),
        ]
        .into_iter()
        .map(|(part, section, region)| -> JointResult<HostCommand> {
            Ok(HostCommand::AssignSection {
                part,
                section: section.to_string(),
                region,
                locator: locate(&region, &self.geometry)?,
            })
        })
        .collect()
    }

    fn assembly(&self) -> Vec<HostCommand> {
        let pl = &self.geometry.placements;
        let mut commands = vec![
            HostCommand::CreateInstance {
                name: COLUMN_INSTANCE.to_string(),
                part: Part::Column,
                placement: pl.column,
            },
            HostCommand::CreateInstance {
                name: BEAM_INSTANCE.to_string(),
                part: Part::Beam,
                placement: pl.beam,
            },
            HostCommand::CreateInstance {
                name: END_PLATE_INSTANCE.to_string(),
                part: Part::EndPlate,
                placement: pl.end_plate,
            },
        ];
        commands.extend(pl.bolt_instances.iter().map(|b| HostCommand::CreateInstance {
            name: b.name(),
            part: Part::Bolt,
            placement: b.placement,
        }));
        commands
    }

    fn interactions(&self) -> JointResult<Vec<HostCommand>> {
        let a = &self.params.analysis;
        Ok(vec![
            HostCommand::CreateSurface {
                name: "End_Plate_Beam_Face".to_string(),
                instance: END_PLATE_INSTANCE.to_string(),
                region: FeatureTag::EndPlateBeamFace,
                locator: locate(&FeatureTag::EndPlateBeamFace, &self.geometry)?,
            },
            HostCommand::CreateSurface {
                name: "Beam_End".to_string(),
                instance: BEAM_INSTANCE.to_string(),
                region: FeatureTag::BeamEndEdges,
                locator: locate(&FeatureTag::BeamEndEdges, &self.geometry)?,
            },
            HostCommand::Tie {
                name: "End_Plate_Beam_Tie".to_string(),
                main_surface: "End_Plate_Beam_Face".to_string(),
                secondary_surface: "Beam_End".to_string(),
            },
            HostCommand::GeneralContact {
                name: "General_Contact".to_string(),
                friction_coefficient: a.friction_coefficient,
                elastic_slip_fraction: a.elastic_slip_fraction,
            },
        ])
    }

    fn reference_points(&self) -> Vec<HostCommand> {
        self.geometry
            .reference_points
            .iter()
            .map(|rp| HostCommand::CreateReferencePoint {
                name: rp.name.clone(),
                position: rp.position,
            })
            .collect()
    }

    fn reference_point_name(&self, role: ReferenceRole) -> JointResult<String> {
        self.geometry
            .reference_point(role)
            .map(|rp| rp.name.clone())
            .ok_or_else(|| JointError::Pipeline {
                reason: format!("No reference point for {:?}", role),
            })
    }

    fn rigid_bodies(&self) -> JointResult<Vec<HostCommand>> {
        let couplings = [
            (
                "Beam_Load_Section",
                BEAM_INSTANCE,
                FeatureTag::BeamLoadSectionEdges,
                ReferenceRole::BeamLoad,
            ),
            ("Column_Top", COLUMN_INSTANCE, FeatureTag::ColumnTopSection, ReferenceRole::ColumnTop),
            (
                "Column_Base",
                COLUMN_INSTANCE,
                FeatureTag::ColumnBaseSection,
                ReferenceRole::ColumnBase,
            ),
        ];
        let mut commands = Vec::with_capacity(couplings.len() * 2);
        for (set, instance, region, role) in couplings {
            commands.push(HostCommand::CreateSet {
                name: set.to_string(),
                instance: instance.to_string(),
                region,
                locator: locate(&region, &self.geometry)?,
            });
            commands.push(HostCommand::RigidBody {
                name: format!("{set}_Rigid"),
                reference_point: self.reference_point_name(role)?,
                tie_set: set.to_string(),
            });
        }
        Ok(commands)
    }

    fn mesh(&self) -> JointResult<Vec<HostCommand>> {
        let m = &self.params.mesh;
        let g = &self.geometry;
        let edges = |part: Part, region: FeatureTag, size_mm: f64| -> JointResult<HostCommand> {
            Ok(HostCommand::SeedEdges {
                part,
                region,
                locator: locate(&region, g)?,
                rule: SeedRule::Size { size_mm },
            })
        };
        let control = |part: Part,
                       region: FeatureTag,
                       shape: ElementShape,
                       technique: MeshTechnique|
         -> JointResult<HostCommand> {
            Ok(HostCommand::MeshControl {
                part,
                region,
                locator: locate(&region, g)?,
                shape,
                technique,
            })
        };

        let mut commands = vec![
            HostCommand::SeedPart {
                part: Part::Column,
                size_mm: m.column_size_mm,
                through_thickness: Some(m.column_through_thickness),
            },
            edges(Part::Column, FeatureTag::ColumnJointZoneEdges, m.column_joint_edge_size_mm)?,
            control(
                Part::Column,
                FeatureTag::ColumnFlangeCells,
                ElementShape::Hex,
                MeshTechnique::Sweep,
            )?,
            control(
                Part::Column,
                FeatureTag::ColumnWebCells,
                ElementShape::Hex,
                MeshTechnique::Sweep,
            )?,
            HostCommand::SeedPart {
                part: Part::Beam,
                size_mm: m.beam_size_mm,
                through_thickness: None,
            },
            edges(Part::Beam, FeatureTag::BeamJointZoneEdges, m.beam_edge_size_mm)?,
            edges(Part::Beam, FeatureTag::BeamLoadSectionEdges, m.beam_edge_size_mm)?,
            HostCommand::SeedPart {
                part: Part::EndPlate,
                size_mm: m.end_plate_size_mm,
                through_thickness: Some(m.end_plate_through_thickness),
            },
            control(
                Part::EndPlate,
                FeatureTag::EndPlateCells,
                ElementShape::Hex,
                MeshTechnique::Sweep,
            )?,
            HostCommand::SeedPart {
                part: Part::Bolt,
                size_mm: m.bolt_size_mm,
                through_thickness: None,
            },
            control(
                Part::Bolt,
                FeatureTag::BoltCells,
                ElementShape::HexDominated,
                MeshTechnique::SweepMedialAxis,
            )?,
        ];
        commands.extend(Part::ALL.iter().map(|&part| HostCommand::GenerateMesh { part }));
        Ok(commands)
    }

    fn step(&self) -> Vec<HostCommand> {
        let a = &self.params.analysis;
        vec![
            HostCommand::CreateStep {
                name: a.step_name.clone(),
                time_period: a.time_period,
                initial_increment: a.initial_increment,
                min_increment: a.min_increment,
                max_increment: a.max_increment,
                max_increments: a.max_increments,
                nlgeom: a.nlgeom,
            },
            HostCommand::FieldOutput {
                step: a.step_name.clone(),
                variables: a.field_outputs.clone(),
            },
        ]
    }

    fn amplitudes(&self) -> Vec<HostCommand> {
        let t = self.params.analysis.time_period;
        vec![
            HostCommand::CreateAmplitude {
                name: CONSTANT_AMPLITUDE.to_string(),
                points: vec![(0.0, 1.0), (t, 1.0)],
            },
            HostCommand::CreateAmplitude {
                name: RAMP_AMPLITUDE.to_string(),
                points: vec![(0.0, 0.0), (t, 1.0)],
            },
        ]
    }

    /// Column axial load, column end conditions and the beam tip displacement.
    ///
    /// The axial load acts downward at the guided column top and the base is
    /// fully fixed. This deliberately differs from applying +Y force at the
    /// fixed base point (RP-3), where the load would react straight into the
    /// support instead of compressing the column.
    fn loads(&self) -> JointResult<Vec<HostCommand>> {
        let step = &self.params.analysis.step_name;
        let load = &self.params.load;
        let top = self.reference_point_name(ReferenceRole::ColumnTop)?;
        let base = self.reference_point_name(ReferenceRole::ColumnBase)?;
        let tip = self.reference_point_name(ReferenceRole::BeamLoad)?;

        Ok(vec![
            HostCommand::ConcentratedForce {
                name: "Column_Axial_Load".to_string(),
                step: step.clone(),
                reference_point: top.clone(),
                force: Vec3::new(0.0, -load.column_axial_force_n, 0.0),
                amplitude: Some(CONSTANT_AMPLITUDE.to_string()),
            },
            // Column top slides vertically only.
            HostCommand::DisplacementBc {
                name: "Column_Top_Guide".to_string(),
                step: step.clone(),
                reference_point: top,
                dofs: DofValues {
                    u2: None,
                    ..DofValues::encastre()
                },
                amplitude: None,
            },
            HostCommand::DisplacementBc {
                name: "Column_Base_Fixed".to_string(),
                step: step.clone(),
                reference_point: base,
                dofs: DofValues::encastre(),
                amplitude: None,
            },
            // In-plane rotation of the beam end is free.
            HostCommand::DisplacementBc {
                name: "Beam_Tip_Displacement".to_string(),
                step: step.clone(),
                reference_point: tip,
                dofs: DofValues {
                    u1: Some(0.0),
                    u2: Some(load.beam_tip_displacement_mm),
                    ur2: Some(0.0),
                    ur3: Some(0.0),
                    ..DofValues::default()
                },
                amplitude: Some(RAMP_AMPLITUDE.to_string()),
            },
        ])
    }

    fn job(&self) -> Vec<HostCommand> {
        vec![HostCommand::CreateJob {
            name: self.params.job_name.clone(),
            model: self.params.model_name.clone(),
            memory_percent: JOB_MEMORY_PERCENT,
            cpus: JOB_CPUS,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::RecordingHost;

    #[test]
    fn test_invalid_design_fails_before_host() {
        let mut params = JointDesignParams::default();
        params.bolt.hole_clearance_mm = 0.0;
        let err = ModelBuilder::new(&params).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_BOLT");
    }

    #[test]
    fn test_full_build_on_recording_host() {
        let params = JointDesignParams::default();
        let builder = ModelBuilder::new(&params).unwrap();
        let mut host = RecordingHost::new();
        let report = builder.build(&mut host, BuildOptions { submit: true }).unwrap();
        assert_eq!(report.stages, Stage::ALL.to_vec());
        assert_eq!(report.commands_issued, host.commands().len());
        assert!(report.submitted);
        assert_eq!(host.submitted_jobs(), ["FEP_Joint".to_string()]);
    }

    #[test]
    fn test_stage_command_counts() {
        let params = JointDesignParams::default();
        let builder = ModelBuilder::new(&params).unwrap();
        assert_eq!(builder.commands_for(Stage::Materials).unwrap().len(), 4);
        assert_eq!(builder.commands_for(Stage::Parts).unwrap().len(), 4);
        assert_eq!(builder.commands_for(Stage::Holes).unwrap().len(), 6);
        // Column, beam, plate and six bolts.
        assert_eq!(builder.commands_for(Stage::Assembly).unwrap().len(), 9);
        assert_eq!(builder.commands_for(Stage::Amplitudes).unwrap().len(), 2);
        assert_eq!(builder.commands_for(Stage::Job).unwrap().len(), 1);
    }

    #[test]
    fn test_host_error_surfaces_verbatim() {
        let params = JointDesignParams::default();
        let builder = ModelBuilder::new(&params).unwrap();
        let mut host = RecordingHost::new().failing_on("tie", "Tie master surface has no faces");
        match builder.build(&mut host, BuildOptions::default()).unwrap_err() {
            JointError::Host { stage, command, message } => {
                assert_eq!(stage, "interactions");
                assert_eq!(command, "tie(End_Plate_Beam_Tie)");
                assert_eq!(message, "Tie master surface has no faces");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_beam_tip_displacement() {
        let params = JointDesignParams::default();
        let builder = ModelBuilder::new(&params).unwrap();
        let loads = builder.commands_for(Stage::Loads).unwrap();
        let tip = loads
            .iter()
            .find_map(|c| match c {
                HostCommand::DisplacementBc {
                    name,
                    dofs,
                    amplitude,
                    ..
                } if name == "Beam_Tip_Displacement" => Some((*dofs, amplitude.clone())),
                _ => None,
            })
            .unwrap();
        assert_eq!(tip.0.u2, Some(-300.0));
        assert_eq!(tip.0.ur1, None);
        assert_eq!(tip.1.as_deref(), Some(RAMP_AMPLITUDE));
    }

    #[test]
    fn test_rebuild_after_mesh_change() {
        let params = JointDesignParams::default();
        let builder = ModelBuilder::new(&params).unwrap();
        let mut host = RecordingHost::new();
        builder.build(&mut host, BuildOptions::default()).unwrap();
        let before = host.commands().len();

        let report = builder
            .rebuild(&mut host, ParamGroup::Mesh, BuildOptions::default())
            .unwrap();
        assert_eq!(report.stages, vec![Stage::Mesh, Stage::Job]);
        assert_eq!(host.commands().len(), before + report.commands_issued);
    }

    #[test]
    fn test_rebuild_on_fresh_host_fails_on_missing_parts() {
        let params = JointDesignParams::default();
        let builder = ModelBuilder::new(&params).unwrap();
        let mut host = RecordingHost::new();
        host.create_model(&params.model_name).unwrap();
        let err = builder
            .rebuild(&mut host, ParamGroup::Mesh, BuildOptions::default())
            .unwrap_err();
        assert_eq!(err.error_code(), "HOST_ERROR");
    }
}
