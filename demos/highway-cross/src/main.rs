//! highway-cross — runs the highway-cross scenario against the in-process
//! `LocalWorld` backend.
//!
//! The ego vehicle starts west of the spawn lanes and drives east under
//! autopilot toward the target region while the burst worker fills the
//! five lanes at x = 340 with traffic.  The process exit status reflects
//! the outcome: 0 passed, 1 failed, 2 timed out.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use hx_backend::{LocalWorld, LocalWorldConfig, SimBackend};
use hx_core::{ActorId, Location, Transform, WorldSnapshot};
use hx_scenario::{HighwayCross, ScenarioConfig, ScenarioObserver, ScenarioOutcome, ScenarioReport, ScenarioRunner};
use hx_tree::Status;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// ── Constants ─────────────────────────────────────────────────────────────────

const EGO_BLUEPRINT:   &str = "vehicle.lincoln.mkz_2020";
const EGO_START_X:     f32  = 300.0;
const EGO_START_Y:     f32  = 15.0;
const PROGRESS_EVERY:  u64  = 20; // ticks between progress lines

// ── CLI ───────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "highway-cross")]
#[command(about = "Run the highway-cross traffic scenario on an in-process world")]
struct Cli {
    /// JSON scenario config; omitted fields keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Root seed for spawn decisions (overrides the config)
    #[arg(long)]
    seed: Option<u64>,

    /// Pace ticks in real time
    #[arg(long)]
    realtime: bool,

    /// Attach the per-tick traffic refresh branch
    #[arg(long)]
    traffic_refresh: bool,

    /// Attach the accelerate / wait / restore branch
    #[arg(long)]
    skip_ahead: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "highway_cross=info,hx_scenario=info,hx_traffic=info")]
    log: String,
}

// ── Progress observer ─────────────────────────────────────────────────────────

struct ProgressLogger {
    backend: Arc<dyn SimBackend>,
    ego:     ActorId,
    started: Instant,
}

impl ScenarioObserver for ProgressLogger {
    fn on_start(&mut self, snapshot: &WorldSnapshot) {
        info!(%snapshot, "scenario started");
    }

    fn on_tick_end(&mut self, tick: u64, snapshot: &WorldSnapshot, status: Status) {
        if tick % PROGRESS_EVERY != 0 {
            return;
        }
        match self.backend.actor_transform(self.ego) {
            Some(t) => info!(tick, sim = %snapshot, ego = %t.location, %status, "progress"),
            None    => warn!(tick, "ego vehicle is gone"),
        }
    }

    fn on_end(&mut self, report: &ScenarioReport) {
        info!(
            outcome = %report.outcome,
            ticks = report.ticks,
            sim_seconds = report.sim_seconds,
            wall_ms = self.started.elapsed().as_millis() as u64,
            "run complete"
        );
    }
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match run(cli) {
        Ok(report) => exit_code(&report.outcome),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(3)
        }
    }
}

fn exit_code(outcome: &ScenarioOutcome) -> ExitCode {
    match outcome {
        ScenarioOutcome::Passed        => ExitCode::SUCCESS,
        ScenarioOutcome::Failed { .. } => ExitCode::from(1),
        ScenarioOutcome::TimedOut      => ExitCode::from(2),
    }
}

fn load_config(cli: &Cli) -> Result<ScenarioConfig> {
    let mut config = match &cli.config {
        Some(path) => ScenarioConfig::from_path(path)
            .with_context(|| format!("loading scenario config {}", path.display()))?,
        None => ScenarioConfig::default(),
    };
    if cli.seed.is_some() {
        config.seed = cli.seed;
    }
    config.tree.traffic_refresh |= cli.traffic_refresh;
    config.tree.skip_ahead |= cli.skip_ahead;
    config.validate().context("validating scenario config")?;
    Ok(config)
}

fn run(cli: Cli) -> Result<ScenarioReport> {
    let config = load_config(&cli)?;
    info!(seed = ?config.seed, refresh = config.tree.traffic_refresh, skip = config.tree.skip_ahead, "configuration");

    let world = LocalWorld::new(LocalWorldConfig {
        traffic_manager_ports: vec![config.traffic.tm_port],
        ..LocalWorldConfig::default()
    });
    let ego = world
        .spawn_actor(EGO_BLUEPRINT, Transform::at(Location::new(EGO_START_X, EGO_START_Y, 0.5)))
        .context("spawning ego vehicle")?;
    world
        .set_autopilot(ego, true, config.traffic.tm_port)
        .context("enabling ego autopilot")?;

    let backend: Arc<dyn SimBackend> = Arc::new(world.clone());
    let mut scenario = HighwayCross::new(Arc::clone(&backend), ego, config)
        .context("setting up scenario")?;

    let mut observer = ProgressLogger { backend, ego, started: Instant::now() };
    let report = ScenarioRunner::new()
        .with_realtime(cli.realtime)
        .run(&mut scenario, &mut observer);

    for c in &report.criteria {
        info!(criterion = %c.name, verdict = %c.verdict, expected = c.expected, actual = c.actual, "criterion");
    }
    info!(
        destroyed = report.cleanup.destroyed,
        stale = report.cleanup.stale,
        burst_rounds = report.cleanup.worker.as_ref().map(|w| w.rounds),
        "cleanup"
    );

    drop(scenario);
    info!(remaining_actors = world.actor_count(), "teardown complete");
    Ok(report)
}
