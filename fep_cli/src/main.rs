//! # fep CLI
//!
//! Command-line front end for the flush end-plate joint model builder:
//! writes the reference parameter set, resolves and checks a design, builds
//! the model on the recording host, and runs Z-variation sweeps.

mod logging;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing::info;

use fep_core::errors::JointResult;
use fep_core::file_io::{load_params, save_document, save_params};
use fep_core::params::JointDesignParams;
use fep_core::pipeline::{BuildOptions, ModelBuilder, ParamGroup, RecordingHost, StageGraph};
use fep_core::resolver::{resolve, ResolvedGeometry};
use fep_core::sweep::{run_sweep, z_values, SweepPoint};

#[derive(Parser, Debug)]
#[command(name = "fep", version, about = "Flush end-plate joint model builder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the reference parameter set
    Defaults(DefaultsArgs),

    /// Resolve a design and print the derived geometry
    Resolve(ResolveArgs),

    /// Build the model on the recording host and save the model document
    Build(BuildArgs),

    /// Resolve a design over a range of Z-variations
    Sweep(SweepArgs),

    /// Print the stage order, or the stages a parameter change re-runs
    Stages(StagesArgs),
}

#[derive(Args, Debug)]
struct DefaultsArgs {
    /// Output file (stdout when omitted)
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ResolveArgs {
    /// Parameter file
    params: PathBuf,

    /// Print the full resolved geometry as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Parameter file
    params: PathBuf,

    /// Model document to write
    #[arg(long, short = 'o')]
    output: PathBuf,

    /// Submit the job once the model is complete
    #[arg(long)]
    submit: bool,
}

#[derive(Args, Debug)]
struct SweepArgs {
    /// Parameter file
    params: PathBuf,

    /// First Z-variation (mm)
    #[arg(long, allow_hyphen_values = true)]
    from: f64,

    /// Last Z-variation (mm)
    #[arg(long, allow_hyphen_values = true)]
    to: f64,

    /// Z-variation increment (mm)
    #[arg(long, default_value = "5")]
    step: f64,

    /// Print the sweep as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct StagesArgs {
    /// Parameter group that changed (column, beam, end-plate, bolt, load,
    /// materials, analysis, mesh)
    #[arg(long)]
    changed: Option<ParamGroup>,
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Defaults(args) => run_defaults(args),
        Commands::Resolve(args) => run_resolve(args),
        Commands::Build(args) => run_build(args),
        Commands::Sweep(args) => run_sweep_cmd(args),
        Commands::Stages(args) => run_stages(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error [{}]: {}", e.error_code(), e);
            ExitCode::FAILURE
        }
    }
}

fn run_defaults(args: DefaultsArgs) -> JointResult<()> {
    let params = JointDesignParams::default();
    match args.output {
        Some(path) => {
            save_params(&params, &path)?;
            info!(path = %path.display(), "reference parameters written");
        }
        None => println!("{}", serde_json::to_string_pretty(&params)?),
    }
    Ok(())
}

fn run_resolve(args: ResolveArgs) -> JointResult<()> {
    let params = load_params(&args.params)?;
    let geometry = resolve(&params)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&geometry)?);
    } else {
        print_geometry(&params, &geometry);
    }
    Ok(())
}

fn run_build(args: BuildArgs) -> JointResult<()> {
    let params = load_params(&args.params)?;
    let builder = ModelBuilder::new(&params)?;
    let mut host = RecordingHost::new();
    let report = builder.build(&mut host, BuildOptions { submit: args.submit })?;

    let document = host.into_document(params.clone(), builder.geometry().clone());
    save_document(&document, &args.output)?;

    println!(
        "Built '{}': {} stages, {} commands{}",
        report.model_name,
        report.stages.len(),
        report.commands_issued,
        if report.submitted { ", job submitted" } else { "" }
    );
    for note in &report.notes {
        println!("  note [{}]: {}", note.code, note.message);
    }
    println!("Model document: {}", display(&args.output));
    Ok(())
}

fn run_sweep_cmd(args: SweepArgs) -> JointResult<()> {
    let params = load_params(&args.params)?;
    let zs = z_values(args.from, args.to, args.step)?;
    let points = run_sweep(&params, &zs)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&points)?);
    } else {
        print_sweep(&points);
    }
    Ok(())
}

fn run_stages(args: StagesArgs) -> JointResult<()> {
    let graph = StageGraph::standard();
    let stages = match args.changed {
        Some(group) => graph.stages_for_change(group)?,
        None => graph.topological_order()?,
    };
    for (i, stage) in stages.iter().enumerate() {
        let deps: Vec<String> = graph.dependencies(*stage).iter().map(|d| d.to_string()).collect();
        if deps.is_empty() {
            println!("{:>2}. {}", i + 1, stage);
        } else {
            println!("{:>2}. {}  (after {})", i + 1, stage, deps.join(", "));
        }
    }
    Ok(())
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

fn print_geometry(params: &JointDesignParams, g: &ResolvedGeometry) {
    println!("Model: {}", params.model_name);
    println!();
    println!("Sections:");
    println!(
        "  Column  web height {:.1} mm, flange centroids {:.1} mm apart",
        g.column.web_height_mm, g.column.flange_centroid_distance_mm
    );
    println!(
        "  Beam    web height {:.1} mm, flange centroids {:.1} mm apart",
        g.beam.web_height_mm, g.beam.flange_centroid_distance_mm
    );
    println!();
    println!("Bolts:");
    println!(
        "  M{:.0}, hole {:.1} mm, grip {:.1} mm, total length {:.1} mm",
        g.bolt.shank_diameter_mm,
        g.bolt.hole_diameter_mm,
        g.bolt.grip_length_mm,
        g.bolt.total_length_mm
    );
    println!(
        "  Row offsets: row 2 at {:.1} mm, row 3 at {:.1} mm, gap {:.1} mm",
        g.rows.row2_mm, g.rows.row3_mm, g.rows.row2_to_row3_mm
    );
    println!(
        "  Edge distances: top {:.1} mm, bottom {:.1} mm ({:?})",
        g.layout.top_edge_distance_mm, g.layout.bottom_edge_distance_mm, g.layout.policy
    );
    for row in &g.layout.rows {
        println!("  Row {}: y = {:.1} mm, gauge {:.1} mm", row.index, row.y_mm, row.gauge_mm);
    }
    println!();
    println!("Placements:");
    println!(
        "  Joint height {:.1} mm, column face at z = {:.1} mm",
        g.placements.joint_height_mm(),
        g.placements.column_face_z_mm()
    );
    for rp in &g.reference_points {
        println!(
            "  {} ({:?}) at ({:.1}, {:.1}, {:.1})",
            rp.name, rp.role, rp.position.x, rp.position.y, rp.position.z
        );
    }
    println!();
    println!(
        "{} datum planes, {} column holes",
        g.datum_planes.len(),
        g.holes.len()
    );
    for note in &g.notes {
        println!("note [{}]: {}", note.code, note.message);
    }
}

fn print_sweep(points: &[SweepPoint]) {
    println!(
        "{:>8} {:>8} {:>8} {:>8} {:>9} {:>9}  status",
        "z", "row2", "row3", "gap", "edge top", "edge bot"
    );
    for point in points {
        match &point.outcome {
            Ok(s) => println!(
                "{:>8.1} {:>8.1} {:>8.1} {:>8.1} {:>9.1} {:>9.1}  {}",
                point.z_variation_mm,
                s.row2_mm,
                s.row3_mm,
                s.row2_to_row3_mm,
                s.top_edge_distance_mm,
                s.bottom_edge_distance_mm,
                if s.note_codes.is_empty() {
                    "ok".to_string()
                } else {
                    s.note_codes.join(",")
                }
            ),
            Err(e) => println!("{:>8.1} {:>48}  {}", point.z_variation_mm, "-", e.error_code()),
        }
    }
}
