//! End-to-end tests: parameters in, model document out, through the
//! recording host.

use std::env::temp_dir;
use std::fs;
use std::path::PathBuf;

use fep_core::errors::JointError;
use fep_core::features::FeatureTag;
use fep_core::file_io::{load_document, save_document};
use fep_core::params::JointDesignParams;
use fep_core::pipeline::host::HostCommand;
use fep_core::pipeline::{BuildOptions, CaeHost, ModelBuilder, ParamGroup, RecordingHost, Stage};
use fep_core::resolver::Part;

fn temp_path(name: &str) -> PathBuf {
    temp_dir().join(format!("fep_e2e_{}_{}.json", name, std::process::id()))
}

#[test]
fn reference_specimen_builds_and_submits() {
    let params = JointDesignParams::default();
    let builder = ModelBuilder::new(&params).unwrap();
    let mut host = RecordingHost::new();
    let report = builder.build(&mut host, BuildOptions { submit: true }).unwrap();

    assert_eq!(report.stages, Stage::ALL.to_vec());
    assert!(report.submitted);
    assert!(report.notes.is_empty());
    assert_eq!(host.model_name(), Some("FEP_Joint"));

    let doc = host.into_document(params.clone(), builder.geometry().clone());
    assert_eq!(doc.command_count(), report.commands_issued);
    assert_eq!(doc.commands_of("create_part").count(), 4);
    assert_eq!(doc.commands_of("create_instance").count(), 9);
    assert_eq!(doc.commands_of("cut_hole").count(), 6);
    assert_eq!(doc.commands_of("create_reference_point").count(), 3);
    assert_eq!(doc.commands_of("rigid_body").count(), 3);
    assert_eq!(doc.commands_of("create_amplitude").count(), 2);
    assert_eq!(doc.submitted_jobs, vec!["FEP_Joint".to_string()]);
}

#[test]
fn every_region_is_addressed_semantically() {
    let params = JointDesignParams::default();
    let builder = ModelBuilder::new(&params).unwrap();
    let commands = builder.commands_for(Stage::SectionAssignment).unwrap();
    let regions: Vec<FeatureTag> = commands
        .iter()
        .filter_map(|c| match c {
            HostCommand::AssignSection { region, locator, .. } => {
                assert!(!locator.points.is_empty());
                Some(*region)
            }
            _ => None,
        })
        .collect();
    assert!(regions.contains(&FeatureTag::ColumnFlangeCells));
    assert!(regions.contains(&FeatureTag::ColumnWebCells));
    assert!(regions.contains(&FeatureTag::BeamWebFaces));
}

#[test]
fn tie_surface_picks_every_plate_partition() {
    for z in [0.0, 10.0, -10.0] {
        let mut params = JointDesignParams::default();
        params.end_plate.z_variation_mm = z;
        let builder = ModelBuilder::new(&params).unwrap();
        let interactions = builder.commands_for(Stage::Interactions).unwrap();
        let locator = interactions
            .iter()
            .find_map(|c| match c {
                HostCommand::CreateSurface {
                    region: FeatureTag::EndPlateBeamFace,
                    locator,
                    ..
                } => Some(locator.clone()),
                _ => None,
            })
            .unwrap();

        // Plate centre and gauge lines across, bolt rows over the height.
        assert_eq!(locator.points.len(), 4 * 4);
        let layout = &builder.geometry().layout;
        for p in &locator.points {
            assert!(p.x != 0.0 && p.y != 0.0, "z={z}: pick point {p} on a centre partition");
            assert!(layout.rows.iter().all(|r| r.y_mm != p.y), "z={z}: pick point {p} on a row");
            assert!(layout.rows.iter().all(|r| r.x_positions().iter().all(|x| *x != p.x)));
        }
    }
}

#[test]
fn shifted_rows_move_the_plate_holes() {
    let mut params = JointDesignParams::default();
    params.end_plate.z_variation_mm = 10.0;
    let builder = ModelBuilder::new(&params).unwrap();
    let parts = builder.commands_for(Stage::Parts).unwrap();

    let plate_holes = parts
        .iter()
        .find_map(|c| match c {
            HostCommand::CreatePart {
                part: Part::EndPlate,
                body: fep_core::pipeline::host::PartBody::ExtrudedSolid { holes, .. },
            } => Some(holes.clone()),
            _ => None,
        })
        .unwrap();
    let ys: Vec<f64> = plate_holes.iter().map(|h| h.centre[1]).collect();
    assert_eq!(ys, vec![75.0, 75.0, 0.0, 0.0, -65.0, -65.0]);

    let mut host = RecordingHost::new();
    let report = builder.build(&mut host, BuildOptions::default()).unwrap();
    assert_eq!(report.notes.len(), 1);
    assert!(!report.submitted);
}

#[test]
fn invalid_design_never_reaches_the_host() {
    let mut params = JointDesignParams::default();
    params.end_plate.z_variation_mm = -70.0;
    let err = ModelBuilder::new(&params).unwrap_err();
    assert!(err.is_design_error());
    assert_eq!(err.error_code(), "INVALID_ROW_SPACING");
}

#[test]
fn host_failure_is_reported_verbatim_and_stops_the_build() {
    let params = JointDesignParams::default();
    let builder = ModelBuilder::new(&params).unwrap();
    let mut host =
        RecordingHost::new().failing_on("generate_mesh", "Mesh generation failed for 3 cells.");

    let err = builder.build(&mut host, BuildOptions { submit: true }).unwrap_err();
    match &err {
        JointError::Host { stage, message, .. } => {
            assert_eq!(stage, "mesh");
            assert_eq!(message, "Mesh generation failed for 3 cells.");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(!err.is_design_error());
    assert!(host.submitted_jobs().is_empty());
    assert!(host.commands().iter().all(|c| c.op() != "create_job"));
}

#[test]
fn host_rejecting_model_name_is_reported() {
    let mut params = JointDesignParams::default();
    params.model_name = "FEP_Joint_Z10".to_string();
    let builder = ModelBuilder::new(&params).unwrap();

    struct ClosedHost;
    impl CaeHost for ClosedHost {
        fn create_model(&mut self, _name: &str) -> Result<(), fep_core::pipeline::HostError> {
            Err(fep_core::pipeline::HostError::new("License not available"))
        }
        fn apply(&mut self, _command: &HostCommand) -> Result<(), fep_core::pipeline::HostError> {
            Ok(())
        }
        fn submit(&mut self, _job: &str) -> Result<(), fep_core::pipeline::HostError> {
            Ok(())
        }
    }

    match builder.build(&mut ClosedHost, BuildOptions::default()).unwrap_err() {
        JointError::Host { command, message, .. } => {
            assert_eq!(command, "create_model");
            assert_eq!(message, "License not available");
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn material_change_rebuilds_only_material_stages() {
    let params = JointDesignParams::default();
    let builder = ModelBuilder::new(&params).unwrap();
    let mut host = RecordingHost::new();
    builder.build(&mut host, BuildOptions::default()).unwrap();

    let report = builder
        .rebuild(&mut host, ParamGroup::Materials, BuildOptions::default())
        .unwrap();
    assert_eq!(
        report.stages,
        vec![Stage::Materials, Stage::Sections, Stage::SectionAssignment, Stage::Job]
    );
}

#[test]
fn model_document_survives_save_and_load() {
    let path = temp_path("document");
    let params = JointDesignParams::default();
    let builder = ModelBuilder::new(&params).unwrap();
    let mut host = RecordingHost::new();
    builder.build(&mut host, BuildOptions::default()).unwrap();
    let geometry = builder.geometry().clone();
    let doc = host.into_document(params.clone(), geometry);

    save_document(&doc, &path).unwrap();
    let loaded = load_document(&path).unwrap();
    assert_eq!(loaded, doc);

    let _ = fs::remove_file(&path);
}
