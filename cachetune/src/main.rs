use std::path::PathBuf;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tunelib::cache_spec::CacheSpec;
use tunelib::checkpoint::CheckpointStore;
use tunelib::config::{ConfigOverrides, SearchConfig};
use tunelib::error::SearchError;
use tunelib::evaluator::SimulatorEvaluator;
use tunelib::generator::CandidateGenerator;
use tunelib::interrupt::Interrupt;
use tunelib::io::Trace;
use tunelib::search::Search;
use tunelib::util::BenchmarkPaths;

#[derive(Parser, Debug)]
#[command(about = String::from("Searches for the two level cache configuration with the lowest AAT on a benchmark trace"))]
struct Args {
    /// Reads traces/<benchmark>.trace and keeps the best result in best/<benchmark>.best
    benchmark: String,

    /// JSON search configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Simulator executable, overrides the config
    #[arg(short, long)]
    simulator: Option<PathBuf>,

    /// Seed for a reproducible search
    #[arg(long)]
    seed: Option<u64>,

    /// Give up on a simulator run after this many seconds
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Directory holding the trace files
    #[arg(long)]
    traces: Option<PathBuf>,

    /// Directory checkpoints are written to
    #[arg(long)]
    best: Option<PathBuf>,
}

#[derive(Serialize)]
struct Report<'a> {
    benchmark: &'a str,
    best: CacheSpec,
    aat: f64,
    iterations: u64,
}

fn main() -> Result<(), String> {
    tracing_subscriber::fmt::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();
    let args = Args::parse();
    let config = load_config(&args)?;

    let paths = BenchmarkPaths::new(&args.benchmark, &config.paths.traces, &config.paths.best).map_err(|e| e.to_string())?;
    let trace = Trace::open(&paths.trace).map_err(|e| e.to_string())?;
    info!(benchmark = %paths.name, trace = %paths.trace.display(), simulator = %config.simulator.program.display(), "Starting search");
    let interrupt = Interrupt::install().map_err(|e| SearchError::Interrupt(e).to_string())?;

    let rng = match config.search.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let generator = CandidateGenerator::new(config.feasibility(), config.bounds, rng);
    let evaluator = SimulatorEvaluator::from_config(&config.simulator, trace).with_interrupt(interrupt.clone());
    let store = CheckpointStore::new(&paths.checkpoint);

    let search = Search::initialise(config.search.clone(), generator, evaluator, store, interrupt);
    let state = search.run().map_err(|e| e.to_string())?;

    println!("Best:");
    println!("{}", state.incumbent);
    println!("AAT: {}", state.score);
    let report = Report {
        benchmark: &paths.name,
        best: state.incumbent,
        aat: state.score,
        iterations: state.iterations,
    };
    println!("{}", serde_json::to_string_pretty(&report).map_err(|e| format!("Couldn't serialise the report {e}"))?);
    Ok(())
}

fn load_config(args: &Args) -> Result<SearchConfig, String> {
    let mut config = match &args.config {
        Some(path) => SearchConfig::load(path).map_err(|e| e.to_string())?,
        None => SearchConfig::default(),
    };
    config.apply_overrides(ConfigOverrides {
        simulator: args.simulator.clone(),
        timeout_secs: args.timeout,
        seed: args.seed,
        traces: args.traces.clone(),
        best: args.best.clone(),
    });
    Ok(config)
}
