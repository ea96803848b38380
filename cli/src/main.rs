//! `uwbtrack` CLI: telemetry replay, simulated scenario runs, replay import/export.

use anyhow::Result;
use clap::{Parser, Subcommand};
use sim::replay::{save_replay, ReplayLog};
use sim::scenarios::{Scenario, ScenarioKind};
use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracker_core::metrics::TrackingMetrics;
use tracker_core::output::SceneTransform;
use tracker_core::pipeline::{Pipeline, PipelineConfig};
use tracker_core::PositionUpdate;
use tracing::info;

#[derive(Parser)]
#[command(name = "uwbtrack", about = "Two-anchor UWB tag localization")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Feed telemetry lines (`anchor,range,tag`) through the pipeline.
    Replay {
        /// Telemetry file, or `-` for stdin
        input: PathBuf,
        /// Pipeline configuration (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print scene coordinates instead of anchor-frame x/y
        #[arg(long)]
        scene: bool,
    },
    /// Simulate a named scenario, track it and report accuracy.
    RunScenario {
        #[arg(value_enum)]
        scenario: ScenarioKind,
        /// Random seed for reproducibility
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Pipeline configuration (JSON); anchors are taken from the scenario
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output metrics to a JSON file
        #[arg(long)]
        output: Option<PathBuf>,
        /// Also save the full replay log
        #[arg(long)]
        save_replay: Option<PathBuf>,
    },
    /// Re-run a previously saved replay log.
    ReplayLog {
        /// Path to replay JSON file
        input: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            input,
            config,
            scene,
        } => {
            run_telemetry(&input, config.as_deref(), scene)?;
        }
        Commands::RunScenario {
            scenario,
            seed,
            config,
            output,
            save_replay: save_path,
        } => {
            run_scenario(
                scenario,
                seed,
                config.as_deref(),
                output.as_deref(),
                save_path.as_deref(),
            )?;
        }
        Commands::ReplayLog {
            input,
            config,
            output,
        } => {
            let log = sim::replay::load_replay(&input)?;
            evaluate(&log, config.as_deref(), output.as_deref())?;
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    Ok(match path {
        Some(p) => PipelineConfig::from_json_file(p)?,
        None => PipelineConfig::default(),
    })
}

fn print_update(update: &PositionUpdate, scene: Option<&SceneTransform>) {
    match scene {
        Some(t) => {
            let [sx, sy, sz] = t.apply(update.x, update.y);
            println!("{} {} {sx:.2} {sy:.2} {sz:.2}", update.track, update.identifier);
        }
        None => println!(
            "{} {} x={} y={} left={} right={}",
            update.track,
            update.identifier,
            update.x,
            update.y,
            update.left_range,
            update.right_range
        ),
    }
}

fn run_telemetry(input: &Path, config: Option<&Path>, scene: bool) -> Result<()> {
    let mut pipeline = Pipeline::new(load_config(config)?)?;
    let transform = scene.then(SceneTransform::default);

    let reader: Box<dyn BufRead> = if input == Path::new("-") {
        Box::new(BufReader::new(std::io::stdin()))
    } else {
        Box::new(BufReader::new(std::fs::File::open(input)?))
    };

    let mut sink = |u: &PositionUpdate| print_update(u, transform.as_ref());
    for line in reader.lines() {
        pipeline.ingest(&line?, &mut sink);
    }

    let stats = &pipeline.stats;
    info!(
        records = stats.records,
        emitted = stats.emitted,
        malformed = stats.malformed,
        unknown_anchor = stats.unknown_anchor,
        tracks = pipeline.tracks.len(),
        "telemetry done"
    );
    Ok(())
}

fn run_scenario(
    kind: ScenarioKind,
    seed: u64,
    config: Option<&Path>,
    output_path: Option<&Path>,
    replay_path: Option<&Path>,
) -> Result<()> {
    let scenario = Scenario::build(kind, seed);
    println!(
        "Running scenario '{}' (seed={}, duration={:.0}s, {} tags)...",
        scenario.name,
        seed,
        scenario.duration,
        scenario.tags.len()
    );

    let log = ReplayLog::record(scenario);

    if let Some(rpath) = replay_path {
        save_replay(&log, rpath)?;
        println!("Replay saved to {}", rpath.display());
    }

    evaluate(&log, config, output_path)
}

fn evaluate(log: &ReplayLog, config: Option<&Path>, output_path: Option<&Path>) -> Result<()> {
    let config = PipelineConfig {
        anchor_baseline: log.anchors.baseline,
        left_anchor: log.anchors.left_name.clone(),
        right_anchor: log.anchors.right_name.clone(),
        anchor_routing: log.anchors.routing,
        ..load_config(config)?
    };
    let mut pipeline = Pipeline::new(config)?;
    let mut metrics = TrackingMetrics::default();
    let mut last_position: HashMap<String, (f64, f64)> = HashMap::new();

    let start = std::time::Instant::now();
    for timed in &log.lines {
        let truth = timed.truth.map(|[x, y]| (x, y));
        let mut sink = |u: &PositionUpdate| {
            metrics.accumulate(u, truth);
            last_position.insert(u.identifier.clone(), (u.x, u.y));
        };
        pipeline.ingest(&timed.line, &mut sink);
    }
    let elapsed = start.elapsed();

    println!(
        "Done: {} lines, {} positions, {} tracks, elapsed={:.3}s",
        pipeline.stats.records,
        pipeline.stats.emitted,
        pipeline.tracks.len(),
        elapsed.as_secs_f64(),
    );
    println!(
        "RMSE {:.3} m (max {:.3} m), {} malformed lines dropped",
        metrics.rmse_position(),
        metrics.max_pos_err,
        pipeline.stats.malformed,
    );
    for track in &pipeline.tracks {
        let Some(rmse) = metrics.rmse_for(&track.identifier) else {
            continue;
        };
        let end = match (
            last_position.get(&track.identifier),
            log.final_truth(&track.identifier),
        ) {
            (Some((x, y)), Some([tx, ty])) => {
                format!(" final=({x:.2}, {y:.2}) truth=({tx:.2}, {ty:.2})")
            }
            _ => String::new(),
        };
        println!("  {} {:<8} rmse={:.3} m{end}", track.index, track.identifier, rmse);
    }

    if let Some(opath) = output_path {
        let json = serde_json::json!({
            "scenario": log.scenario_name,
            "seed": log.seed,
            "elapsed_s": elapsed.as_secs_f64(),
            "stats": pipeline.stats,
            "rmse_m": metrics.rmse_position(),
            "max_err_m": metrics.max_pos_err,
            "final_tracks": pipeline.tracks.len(),
        });
        std::fs::write(opath, serde_json::to_string_pretty(&json)?)?;
        println!("Metrics saved to {}", opath.display());
    }

    Ok(())
}
