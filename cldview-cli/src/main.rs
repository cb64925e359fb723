use anyhow::{anyhow, Context, Result};
use clap::{ArgAction, Parser, Subcommand, ValueHint};
use cldview_core::{RigidTransform, Scene};
use cldview_scene::{
    apply_standard_position, person_nodes, position_data, set_position, standard_camera_positions,
    SceneBuilder, SceneBuilderOptions,
};
use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};
use tracing::{debug, error};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "cldview", version, about = "Inspect Comedy Lab motion-capture scenes")]
struct Cli {
    /// JSON file with scene builder options
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    options: Option<PathBuf>,

    /// Name of the rigid body carrying the recording camera
    #[arg(long, global = true)]
    camera_body: Option<String>,

    /// Factor applied to captured positions, e.g. 0.001 for millimetres
    #[arg(long, global = true)]
    unit_scale: Option<f32>,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Summarize the scene built from a mocap file")]
    Info {
        #[arg(value_hint = ValueHint::FilePath)]
        mocap: PathBuf,

        #[arg(long, value_hint = ValueHint::FilePath, help = "Analysis dataset to attach")]
        dataset: Option<PathBuf>,
    },

    #[command(about = "List the standard camera positions")]
    Positions,

    #[command(about = "Print the camera position blob as hex")]
    SaveView {
        #[arg(value_hint = ValueHint::FilePath)]
        mocap: PathBuf,

        #[arg(short, long, help = "Standard camera position to move to first")]
        position: Option<String>,

        #[arg(short, long, help = "Playback time in seconds")]
        time: Option<f64>,
    },

    #[command(about = "Restore a hex position blob onto the camera")]
    RestoreView {
        #[arg(value_hint = ValueHint::FilePath)]
        mocap: PathBuf,

        hex: String,
    },
}

fn main() -> ExitCode {
    match exec() {
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn exec() -> Result<()> {
    let args = Cli::parse();

    let level = match args.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .without_time()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    let options = load_options(&args)?;
    debug!(?options, "Scene builder options");
    let builder = SceneBuilder::new(options);

    match args.command {
        Commands::Info { mocap, dataset } => cmd_info(&builder, &mocap, dataset.as_deref()),
        Commands::Positions => cmd_positions(),
        Commands::SaveView {
            mocap,
            position,
            time,
        } => cmd_save_view(&builder, &mocap, position.as_deref(), time),
        Commands::RestoreView { mocap, hex } => cmd_restore_view(&builder, &mocap, &hex),
    }
}

/// Options file first, then command-line overrides
fn load_options(args: &Cli) -> Result<SceneBuilderOptions> {
    let mut options = match &args.options {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading options file {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("parsing options file {}", path.display()))?
        }
        None => SceneBuilderOptions::default(),
    };
    if let Some(name) = &args.camera_body {
        options = options.with_camera_body(name.as_str());
    }
    if let Some(scale) = args.unit_scale {
        options = options.with_unit_scale(scale);
    }
    Ok(options)
}

fn build(builder: &SceneBuilder, mocap: &Path) -> Result<Scene> {
    builder
        .build_scene(mocap)
        .with_context(|| format!("building scene from {}", mocap.display()))
}

fn describe(transform: &RigidTransform) -> String {
    let t = transform.translation;
    let (roll, pitch, yaw) = transform.rotation.euler_angles();
    format!(
        "position ({:.3}, {:.3}, {:.3}) rotation ({:.1}°, {:.1}°, {:.1}°)",
        t.x,
        t.y,
        t.z,
        roll.to_degrees(),
        pitch.to_degrees(),
        yaw.to_degrees()
    )
}

fn cmd_info(builder: &SceneBuilder, mocap: &Path, dataset: Option<&Path>) -> Result<()> {
    let mut scene = build(builder, mocap)?;

    let report = match dataset {
        Some(path) => Some(
            builder
                .add_dataset(&mut scene, path)
                .with_context(|| format!("adding dataset {}", path.display()))?,
        ),
        None => None,
    };

    let (start, finish) = scene.time_range();
    println!("time range: {:.3}s - {:.3}s", start, finish);
    match scene.camera() {
        Some(camera) => println!(
            "camera: {} ({} samples)",
            camera.name(),
            camera.timeline().map_or(0, |t| t.len())
        ),
        None => println!("camera: none"),
    }

    let persons = person_nodes(&scene);
    println!("persons: {}", persons.len());
    for person in persons {
        let measures: Vec<&str> = person.annotations().map(|a| a.name()).collect();
        println!(
            "  {} ({} samples){}",
            person.name(),
            person.timeline().map_or(0, |t| t.len()),
            if measures.is_empty() {
                String::new()
            } else {
                format!(" measures: {}", measures.join(", "))
            }
        );
    }

    if let Some(report) = report {
        println!("dataset matched: {}", report.matched.join(", "));
        if !report.skipped.is_empty() {
            println!("dataset skipped: {}", report.skipped.join(", "));
        }
    }
    Ok(())
}

fn cmd_positions() -> Result<()> {
    for position in standard_camera_positions(&Scene::new()) {
        println!("{:<10} {}", position.name, describe(&position.transform));
    }
    Ok(())
}

fn cmd_save_view(
    builder: &SceneBuilder,
    mocap: &Path,
    position: Option<&str>,
    time: Option<f64>,
) -> Result<()> {
    let mut scene = build(builder, mocap)?;
    if let Some(time) = time {
        scene.set_time(time);
    }
    if let Some(name) = position {
        apply_standard_position(&mut scene, name)?;
    }

    let camera = scene
        .camera()
        .ok_or_else(|| anyhow!("{} has no camera body", mocap.display()))?;
    let blob = position_data(camera)?;
    println!("{}", hex::encode(blob));
    Ok(())
}

fn cmd_restore_view(builder: &SceneBuilder, mocap: &Path, blob: &str) -> Result<()> {
    let mut scene = build(builder, mocap)?;
    let blob = hex::decode(blob.trim()).context("position blob is not valid hex")?;

    let camera = scene
        .camera_mut()
        .ok_or_else(|| anyhow!("{} has no camera body", mocap.display()))?;
    set_position(camera, &blob)?;
    println!("{}: {}", camera.name(), describe(camera.transform()));
    Ok(())
}
