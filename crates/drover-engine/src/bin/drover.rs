//! `drover` -- run a scenario headlessly.
//!
//! Starts the simulation thread, then drives a frame-paced render loop that
//! draws every frame's latest snapshot into a recording canvas. Type `esc`
//! on stdin to shut down, or pass `--seconds` for a fixed-length run.
//!
//! ```text
//! drover                              # built-in demo world
//! drover --scenario world.json --seconds 10
//! RUST_LOG=drover_world=debug drover --crowd 500 --seed 7
//! ```

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use drover_engine::prelude::*;

#[derive(Parser)]
#[command(name = "drover")]
#[command(about = "Units hauling items between buildings", version)]
struct Cli {
    /// Engine config (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scenario file (JSON); the built-in demo world when absent
    #[arg(short, long, conflicts_with = "crowd")]
    scenario: Option<PathBuf>,

    /// Generate a random crowd of this many haulers instead
    #[arg(long)]
    crowd: Option<usize>,

    /// Seed for --crowd
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Stop after this many seconds of wall-clock time
    #[arg(long, value_parser = parse_seconds)]
    seconds: Option<Duration>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log: String,
}

fn parse_seconds(arg: &str) -> Result<Duration, String> {
    let seconds: f64 = arg.parse().map_err(|e| format!("{e}"))?;
    Duration::try_from_secs_f64(seconds)
        .map_err(|_| format!("expected a finite, non-negative number of seconds, got {arg}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log)),
        )
        .init();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => EngineConfig::default(),
    };

    let scenario = match (&cli.scenario, cli.crowd) {
        (Some(path), _) => Scenario::load(path)
            .with_context(|| format!("loading scenario {}", path.display()))?,
        (None, Some(units)) => Scenario::crowd(units, cli.seed),
        (None, None) => Scenario::demo(),
    };
    let ScenarioWorld { world, .. } = scenario.build().context("building scenario")?;

    let tick_loop = TickLoop::new(world, &config);
    let simulation = Simulation::start(tick_loop, config.yield_interval())?;

    let keys = spawn_stdin_keys().context("starting stdin reader")?;
    // A run too long to represent as an Instant has no deadline.
    let deadline = cli.seconds.and_then(|run| Instant::now().checked_add(run));

    render_loop(&simulation, &config, &keys, deadline);

    simulation.request_stop();
    let tick_loop = simulation.join()?;
    let world = tick_loop.world();
    info!(
        ticks = tick_loop.tick_count(),
        sim_time = tick_loop.sim_time(),
        entities = world.len(),
        hash = %world.snapshot().content_hash(),
        "simulation finished"
    );
    Ok(())
}

/// Draw frames at the configured rate until a shutdown key arrives, the
/// deadline passes, or the simulation stops on its own.
fn render_loop(
    simulation: &Simulation,
    config: &EngineConfig,
    keys: &mpsc::Receiver<Key>,
    deadline: Option<Instant>,
) {
    let reader = simulation.reader();
    let flag = simulation.flag();
    let camera = Camera::from_config(config);
    let frame_interval = config.frame_interval();
    let mut canvas = RecordingCanvas::new();
    let mut frames = 0u64;
    let mut last_report = Instant::now();

    while flag.is_running() {
        let frame_start = Instant::now();
        if keys
            .try_iter()
            .any(|key| handle_key_release(&key, &flag) == InputOutcome::Shutdown)
        {
            break;
        }
        if deadline.is_some_and(|d| frame_start >= d) {
            info!("run length reached");
            break;
        }

        let snapshot = reader.latest();
        let stats = draw_frame(&snapshot, &camera, &mut canvas);
        let commands = canvas.take();
        frames += 1;
        debug!(
            tick = stats.tick,
            drawn = stats.drawn,
            culled = stats.culled,
            commands = commands.len(),
            "frame"
        );
        if last_report.elapsed() >= Duration::from_secs(1) {
            info!(frames, tick = stats.tick, drawn = stats.drawn, culled = stats.culled, "render");
            last_report = Instant::now();
        }

        if let Some(rest) = frame_interval.checked_sub(frame_start.elapsed()) {
            thread::sleep(rest);
        }
    }
}

/// Forward each stdin line as a released key.
fn spawn_stdin_keys() -> std::io::Result<mpsc::Receiver<Key>> {
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("stdin-keys".to_owned())
        .spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else {
                    warn!("stdin read failed; key input disabled");
                    break;
                };
                if tx.send(Key::from_name(&line)).is_err() {
                    break;
                }
            }
        })?;
    Ok(rx)
}
