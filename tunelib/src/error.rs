use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;
use thiserror::Error;
use crate::feasibility::Level;
use crate::generator::Strategy;

/// Errors which stop the search
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid benchmark name {0:?}, expected letters, digits, '_', '-' or '.'")]
    InvalidBenchmark(String),

    #[error("Couldn't open the trace file at path {}: {source}", .path.display())]
    Trace { path: PathBuf, source: io::Error },

    #[error("Couldn't read the config file at path {}: {reason}", .path.display())]
    Config { path: PathBuf, reason: String },

    #[error("Couldn't write the checkpoint at path {}: {source}", .path.display())]
    Checkpoint { path: PathBuf, source: io::Error },

    #[error("Failed to install the interrupt handler: {0}")]
    Interrupt(io::Error),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Raised when the generators can't find a feasible candidate within their attempt cap
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("No feasible candidate found by {strategy} after {attempts} attempts")]
    NoFeasibleCandidate { strategy: Strategy, attempts: u64 },
}

/// A failed simulator run. The driver treats all of these as a bad candidate.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("Couldn't start the simulator {}: {source}", .program.display())]
    Spawn { program: PathBuf, source: io::Error },

    #[error("Simulator I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("Simulator exited with {status}")]
    Exit { status: ExitStatus },

    #[error("Couldn't parse an AAT from the simulator's last output line {line:?}")]
    Parse { line: String },

    #[error("Simulator didn't finish within {0:?}")]
    Timeout(Duration),

    #[error("Simulator run was interrupted")]
    Interrupted,
}

/// The reason a [`CacheSpec`](crate::cache_spec::CacheSpec) can't be built in hardware
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum Infeasibility {
    #[error("Policy selector {0} is outside 0..=4")]
    PolicyOutOfRange(u32),

    #[error("L2 is smaller than L1 in {0}")]
    NotMonotonic(&'static str),

    #[error("{0} has a zero block size")]
    ZeroBlock(Level),

    #[error("{0} has no lines")]
    NoLines(Level),

    #[error("{0} has no index bits")]
    NoIndex(Level),

    #[error("{0} has no room left for a tag")]
    TagUnderflow(Level),

    #[error("{0} geometry overflows 64 bit arithmetic")]
    Overflow(Level),

    #[error("{level} needs {size} bytes, over its {budget} byte budget")]
    OverBudget { level: Level, size: u64, budget: u64 },
}
