//! harbor: a fleet of trucks working a small container terminal.
//!
//! Run from the workspace root:
//!
//! ```text
//! cargo run --release -p harbor -- --config demos/harbor/harbor.toml --trucks 12
//! cargo run --release -p harbor -- --missions demos/harbor/data/missions.csv \
//!     --resources demos/harbor/data/resources.csv
//! ```
//!
//! | Flag               | Meaning                                           |
//! |--------------------|---------------------------------------------------|
//! | `--config <path>`  | Dispatch TOML; built-in defaults when omitted     |
//! | `--mode <ModeXYZ>` | Override the run mode from the config             |
//! | `--trucks <n>`     | Fleet size for generated missions (default 10)    |
//! | `--seed <n>`       | Mission generator seed (default 42)               |
//! | `--missions <csv>` | Load missions from CSV instead of generating them |
//! | `--resources <csv>`| Load the substitution pool from CSV               |
//! | `--out <dir>`      | Report directory (default `output/harbor`)        |
//! | `--json-logs`      | Emit logs as JSON lines                           |
//!
//! `RUST_LOG=debug` also prints the monitor board while the run progresses.

mod logging;
mod network;

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result, anyhow, bail};
use fleet_core::{RunMode, VehicleId};
use fleet_dispatch::{DispatchConfig, DispatcherBuilder, LogMonitor, spawn_monitor, telemetry_channel};
use fleet_mission::{MissionGenerator, MissionStore, load_missions_csv, load_resources_csv};
use fleet_output::{CsvWriter, ReportObserver};
use tracing::{info, warn};

use network::Harbor;

// ── Defaults ──────────────────────────────────────────────────────────────────

const DEFAULT_TRUCKS: usize = 10;
const DEFAULT_SEED:   u64   = 42;
const DEFAULT_OUT:    &str  = "output/harbor";

/// Monitor board is logged every this many telemetry updates.
const BOARD_EVERY: u64 = 300;

const TEMPLATES: [&str; 7] = ["LP", "UP", "LG", "UG", "PG", "P", "L"];

// ── Arguments ─────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Args {
    config:    Option<PathBuf>,
    mode:      Option<RunMode>,
    trucks:    usize,
    seed:      u64,
    missions:  Option<PathBuf>,
    resources: Option<PathBuf>,
    out:       PathBuf,
    json_logs: bool,
}

fn parse_args(mut argv: impl Iterator<Item = String>) -> Result<Args> {
    let mut args = Args {
        config:    None,
        mode:      None,
        trucks:    DEFAULT_TRUCKS,
        seed:      DEFAULT_SEED,
        missions:  None,
        resources: None,
        out:       PathBuf::from(DEFAULT_OUT),
        json_logs: false,
    };

    while let Some(flag) = argv.next() {
        let mut value = || argv.next().ok_or_else(|| anyhow!("{flag} needs a value"));
        match flag.as_str() {
            "--config" => args.config = Some(PathBuf::from(value()?)),
            "--mode" => args.mode = Some(value()?.parse().map_err(|e| anyhow!("--mode: {e}"))?),
            "--trucks" => args.trucks = value()?.parse().context("--trucks")?,
            "--seed" => args.seed = value()?.parse().context("--seed")?,
            "--missions" => args.missions = Some(PathBuf::from(value()?)),
            "--resources" => args.resources = Some(PathBuf::from(value()?)),
            "--out" => args.out = PathBuf::from(value()?),
            "--json-logs" => args.json_logs = true,
            other => bail!("unknown argument {other:?}"),
        }
    }
    Ok(args)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;
    logging::init(args.json_logs);

    // 1. Dispatch configuration.
    let mut config = match &args.config {
        Some(path) => DispatchConfig::load(path)?,
        None => DispatchConfig::default(),
    };
    if let Some(mode) = args.mode {
        config.mode = mode;
    }

    // 2. Missions and the harbor they run in.
    let harbor = Harbor::default();
    let store = missions(&args, &harbor)?;
    let fleet: Vec<VehicleId> = store.vehicle_ids().cloned().collect();
    let simulator = harbor.simulator(&fleet);
    let pool = match &args.resources {
        Some(path) => load_resources_csv(path).with_context(|| format!("loading {}", path.display()))?,
        None => harbor.pool(),
    };
    info!(mode = %config.mode, trucks = fleet.len(), max_ticks = config.max_ticks, "harbor ready");

    // 3. Output directory, report writer, telemetry monitor.
    std::fs::create_dir_all(&args.out).with_context(|| format!("creating {}", args.out.display()))?;
    let mut reports = ReportObserver::new(CsvWriter::new(&args.out)?);
    let (publisher, rx) = telemetry_channel(config.telemetry_capacity);
    let monitor = spawn_monitor(rx, LogMonitor::new(BOARD_EVERY)).context("spawning monitor thread")?;

    // 4. Dispatch until the fleet is done or the budget runs out.
    let mut dispatcher = DispatcherBuilder::new(simulator, config)
        .missions(store)
        .resources(pool)
        .telemetry(publisher)
        .snapshot_to(args.out.join("missions.json"))
        .build()?;

    let t0 = Instant::now();
    let summary = dispatcher.run(&mut reports)?;
    let elapsed = t0.elapsed();

    if let Some(e) = reports.take_error() {
        warn!(error = %e, "some reports were not written");
    }
    let monitor = monitor.join().map_err(|_| anyhow!("monitor thread panicked"))?;

    // 5. Summary.
    println!();
    println!("=== harbor run ===");
    println!("  reason         : {}", summary.reason);
    println!("  final tick     : {}", summary.final_tick);
    println!("  fleet          : {} ({} seen, {} completed)", summary.fleet_size, summary.seen, summary.completed);
    println!("  reassignments  : {}", summary.reassignments);
    println!("  relocations    : {}", summary.relocations);
    println!("  telemetry drop : {}", summary.telemetry_dropped);
    println!("  intervals      : {}", reports.intervals());
    println!("  wall time      : {:.2?}", elapsed);
    if !summary.incomplete.is_empty() {
        println!("  incomplete     : {}", join_ids(&summary.incomplete));
    }
    if !summary.malformed.is_empty() {
        println!("  malformed      : {}", join_ids(&summary.malformed));
    }
    println!();
    print!("{}", monitor.board.render());
    println!();
    println!("Reports written to {}", args.out.display());
    Ok(())
}

fn missions(args: &Args, harbor: &Harbor) -> Result<MissionStore> {
    if let Some(path) = &args.missions {
        return load_missions(path);
    }
    let store = MissionGenerator::new(TEMPLATES.iter().map(|t| t.to_string()).collect())
        .stops(harbor.stops.clone())
        .parkings(harbor.parkings.clone())
        .exits(harbor.exits.clone())
        .generate(args.trucks, args.seed)?;
    info!(trucks = store.len(), seed = args.seed, "missions generated");
    Ok(store)
}

fn load_missions(path: &Path) -> Result<MissionStore> {
    let store = load_missions_csv(path).with_context(|| format!("loading {}", path.display()))?;
    info!(trucks = store.len(), path = %path.display(), "missions loaded");
    Ok(store)
}

fn join_ids(ids: &[VehicleId]) -> String {
    ids.iter().map(VehicleId::as_str).collect::<Vec<_>>().join(", ")
}
