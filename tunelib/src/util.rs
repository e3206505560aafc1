use std::path::{Path, PathBuf};
use lazy_static::lazy_static;
use regex::Regex;
use crate::error::SearchError;

lazy_static! {
    // Plain file name characters only, so a benchmark can't point outside its directory
    static ref BENCHMARK_PATTERN: Regex = Regex::new(r"^[0-9a-zA-Z_][0-9a-zA-Z_.\-]*$").unwrap();
}

/// The files belonging to one benchmark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchmarkPaths {
    pub name: String,
    pub trace: PathBuf,
    pub checkpoint: PathBuf,
}

impl BenchmarkPaths {
    /// Derives `<traces>/<name>.trace` and `<best>/<name>.best`
    pub fn new(name: &str, traces: &Path, best: &Path) -> Result<Self, SearchError> {
        if !BENCHMARK_PATTERN.is_match(name) {
            return Err(SearchError::InvalidBenchmark(name.to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            trace: traces.join(format!("{name}.trace")),
            checkpoint: best.join(format!("{name}.best")),
        })
    }
}
