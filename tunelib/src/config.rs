use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;
use serde::{Deserialize, Serialize};
use crate::cache_spec::CacheSpec;
use crate::error::SearchError;
use crate::feasibility::Feasibility;

/// Everything tunable about a search run. Every section may be omitted from the JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub simulator: SimulatorConfig,
    pub budgets: Budgets,
    pub bounds: GenerationBounds,
    pub search: DriverConfig,
    pub paths: PathConfig,
}

/// How to launch the external simulator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub program: PathBuf,
    /// Passed before the cache flags, for wrappers or interpreters
    pub args: Vec<String>,
    /// No timeout when absent
    #[serde(alias = "timeout")]
    pub timeout_secs: Option<u64>,
}

/// Per level hardware storage budgets, in bytes
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Budgets {
    #[serde(alias = "l1")]
    pub l1_bytes: u64,
    #[serde(alias = "l2")]
    pub l2_bytes: u64,
}

/// An inclusive range a generator may draw a field from
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRange {
    pub min: u32,
    pub max: u32,
}

/// Ranges used by the random restart and permutation generators
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationBounds {
    pub capacity: FieldRange,
    pub block: FieldRange,
    pub set: FieldRange,
    pub policy: FieldRange,
    /// Every field must stay inside this range after a permutation
    pub permute: FieldRange,
    /// Permutations move a field by 1 up to this much
    pub max_step: u32,
    /// Attempts before a generator gives up
    pub max_attempts: u64,
}

/// Driver loop behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Write a checkpoint every this many iterations
    pub checkpoint_interval: u64,
    /// Score given to candidates the simulator fails on
    pub failure_score: f64,
    /// Starting point when there's no usable checkpoint
    pub default_spec: CacheSpec,
    /// Seed for reproducible runs, otherwise seeded from the OS
    pub seed: Option<u64>,
}

/// Where trace files are read from and checkpoints written to
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub traces: PathBuf,
    pub best: PathBuf,
}

/// Values given on the command line, each replacing its config file counterpart when present
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub simulator: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub seed: Option<u64>,
    pub traces: Option<PathBuf>,
    pub best: Option<PathBuf>,
}

impl SearchConfig {
    /// Reads a JSON config file
    pub fn load(path: &Path) -> Result<Self, SearchError> {
        let file = File::open(path).map_err(|e| SearchError::Config { path: path.to_path_buf(), reason: e.to_string() })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| SearchError::Config { path: path.to_path_buf(), reason: e.to_string() })
    }

    /// Applies the overrides that are set, leaving everything else as loaded
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(program) = overrides.simulator {
            self.simulator.program = program;
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.simulator.timeout_secs = Some(timeout);
        }
        if let Some(seed) = overrides.seed {
            self.search.seed = Some(seed);
        }
        if let Some(traces) = overrides.traces {
            self.paths.traces = traces;
        }
        if let Some(best) = overrides.best {
            self.paths.best = best;
        }
    }

    pub fn feasibility(&self) -> Feasibility {
        Feasibility::new(self.budgets)
    }
}

impl SimulatorConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("./cachesim"),
            args: Vec::new(),
            timeout_secs: None,
        }
    }
}

impl Default for Budgets {
    fn default() -> Self {
        Self {
            l1_bytes: 48 * 1024,
            l2_bytes: 192 * 1024,
        }
    }
}

impl FieldRange {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: u32) -> bool {
        self.min <= value && value <= self.max
    }
}

impl Default for GenerationBounds {
    fn default() -> Self {
        Self {
            capacity: FieldRange::new(2, 33),
            block: FieldRange::new(1, 32),
            set: FieldRange::new(0, 8),
            policy: FieldRange::new(0, 4),
            permute: FieldRange::new(0, 32),
            max_step: 4,
            max_attempts: 1_000_000,
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            checkpoint_interval: 10,
            failure_score: 999.0,
            default_spec: CacheSpec::default(),
            seed: None,
        }
    }
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            traces: PathBuf::from("traces"),
            best: PathBuf::from("best"),
        }
    }
}
