//! # TuneLib
//!
//! TuneLib searches the parameter space of a two level cache hierarchy for the configuration
//! with the lowest average access time on a trace
//!
//! It doesn't simulate caches itself. Candidates are checked against a hardware storage budget,
//! then measured by an external simulator run as a subprocess. The search is a random restart
//! hill climber which runs until interrupted, checkpointing the best configuration as it goes.

/// Contains the cache configuration value type and its fields
pub mod cache_spec;

/// Contains the checkpoint store for the best known configuration
pub mod checkpoint;

/// Contains definitions for the JSON configuration format, all of which have defaults
pub mod config;

/// Contains the error types
pub mod error;

/// Contains the evaluator trait and the subprocess implementation which drives the simulator
pub mod evaluator;

/// Contains the hardware feasibility model
pub mod feasibility;

/// Contains the random restart and permutation candidate generators
pub mod generator;

/// Contains the cooperative interrupt flag and its signal handlers
pub mod interrupt;

/// Contains trace file access
pub mod io;

/// Contains the search loop
pub mod search;
#[cfg(test)]
mod test;

/// Contains benchmark name validation and path derivation
pub mod util;
