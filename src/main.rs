use bulletsim::{
    bench_integrator, write_trace_file, Command, FlightSummary, Flow, Scenario, ScenarioConfig, Session, Snapshot,
    WindConfig, KEY_BINDINGS,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "bulletsim")]
#[command(about = "Projectile flight under drag, Coriolis and sampled crosswind")]
#[command(version)]
struct Args {
    /// Scenario file, looked up under `scenarios/` when not found as given
    #[arg(short, long = "file", default_value = "default.yaml")]
    file_name: String,

    /// Ammunition 1-3, overrides the scenario
    #[arg(long)]
    ammo: Option<u8>,

    /// Use this crosswind (m/s) instead of the scenario's wind source
    #[arg(long, allow_hyphen_values = true)]
    wind: Option<f64>,

    /// Seed for the wind draw, overrides the scenario
    #[arg(long)]
    seed: Option<u64>,

    /// Run to ground impact without reading commands
    #[arg(long)]
    batch: bool,

    /// Tick limit for a run
    #[arg(long, default_value_t = 100_000)]
    max_ticks: usize,

    /// Write the trace as CSV when the run ends
    #[arg(long)]
    trace_out: Option<PathBuf>,

    /// Time the integrator over the ammunition catalog and exit
    #[arg(long)]
    bench: bool,

    /// Debug-level logging
    #[arg(short, long)]
    verbose: bool,
}

// load here to keep main clean
fn load_scenario_from_yaml(file_name: &str) -> Result<(ScenarioConfig, PathBuf)> {
    let given = PathBuf::from(file_name);
    let config_path = if given.exists() {
        given
    } else {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file_name)
    };

    let file = File::open(&config_path)
        .with_context(|| format!("failed to open scenario {}", config_path.display()))?;
    let reader = BufReader::new(file);
    let scenario_cfg: ScenarioConfig = serde_yaml::from_reader(reader)
        .with_context(|| format!("failed to parse scenario {}", config_path.display()))?;

    let base_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    Ok((scenario_cfg, base_dir))
}

fn apply_overrides(cfg: &mut ScenarioConfig, args: &Args) {
    if let Some(ammo) = args.ammo {
        cfg.ammo = ammo;
    }
    if let Some(speed) = args.wind {
        cfg.wind = WindConfig::Fixed { speed };
    }
    if let (Some(new_seed), WindConfig::Pool { seed, .. }) = (args.seed, &mut cfg.wind) {
        *seed = Some(new_seed);
    }
}

fn print_usage() {
    println!("--------------------------------");
    println!("Commands (read while paused):");
    for (key, help) in KEY_BINDINGS {
        println!("  {key:<6} {help}");
    }
    println!("--------------------------------");
}

fn print_status(snap: &Snapshot) {
    println!(
        "t = {:.4} s  x = {:.3}  y = {:.3}  z = {:.5}",
        snap.time, snap.position.x, snap.position.y, snap.position.z
    );
}

/// Read one command per line while paused; a resumed run goes to impact
/// or `max_ticks` without reading input
fn run_interactive(session: &mut Session, max_ticks: usize) -> Result<Flow> {
    print_usage();
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while session.ticks() < max_ticks {
        let snap = session.snapshot();
        let command = if snap.paused && !snap.terminated {
            print_status(&snap);
            match lines.next() {
                Some(line) => match line?.parse::<Command>() {
                    Ok(cmd) => Some(cmd),
                    Err(e) => {
                        eprintln!("{e}");
                        continue;
                    }
                },
                None => Some(Command::Quit),
            }
        } else {
            None
        };

        match session.tick(command) {
            Ok(Flow::Continue) => {}
            Ok(flow) => return Ok(flow),
            Err(e) if e.is_integration() => {
                // leave the last valid state up for inspection
                error!("{e}");
                session.sim.pause();
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(Flow::Continue)
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { LevelFilter::DEBUG } else { LevelFilter::INFO };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(level)
        .init();

    if args.bench {
        bench_integrator()?;
        return Ok(());
    }

    let (mut scenario_cfg, base_dir) = load_scenario_from_yaml(&args.file_name)?;
    apply_overrides(&mut scenario_cfg, &args);

    let scenario = Scenario::build_scenario(scenario_cfg, &base_dir)?;
    println!("Simulating {}", scenario.ammo.name());
    let sim = scenario.into_simulation()?;
    let mut session = Session::new(sim);

    let flow = if args.batch {
        session.run_to_impact(args.max_ticks)?
    } else {
        run_interactive(&mut session, args.max_ticks)?
    };
    info!(?flow, ticks = session.ticks(), "run finished");

    let snap = session.snapshot();
    print_status(&snap);
    if let Some(summary) = FlightSummary::new(snap.time, session.sim.trace(), snap.velocity.norm()) {
        println!(
            "time of flight {:.4} s, range {:.2} m, drift {:.5} m, apex {:.3} m, final speed {:.2} m/s",
            summary.time_of_flight, summary.range, summary.drift, summary.apex, summary.final_speed
        );
    }

    if let Some(path) = &args.trace_out {
        write_trace_file(session.sim.trace(), path)
            .with_context(|| format!("failed to write trace to {}", path.display()))?;
        println!("trace written to {}", path.display());
    }

    Ok(())
}
