use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};
use crate::cache_spec::CacheSpec;

lazy_static! {
    static ref RECORD_PATTERN: Regex = Regex::new(
        r"^\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*$"
    ).unwrap();
}

/// A best known configuration read back from disk
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Checkpoint {
    pub spec: CacheSpec,
    /// Advisory only, it may have been measured against a different simulator or trace
    pub score: Option<f64>,
}

/// Keeps the best known configuration for one benchmark in a small text file
///
/// The first line holds `c1,b1,s1,c2,b2,s2,k`, the second the score. Each save replaces the whole
/// file.
#[derive(Debug, Clone)]
pub struct CheckpointStore {
    path: PathBuf,
}

impl CheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrites the checkpoint
    ///
    /// The record is written to a sibling temporary file and renamed into place, so readers never
    /// see a partial record
    pub fn save(&self, spec: &CacheSpec, score: f64) -> io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, format!("{}\n{}\n", spec.to_record(), score))?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), %score, "Checkpoint written");
        Ok(())
    }

    /// Reads the checkpoint back. Missing, empty, or malformed files all count as no checkpoint.
    pub fn load(&self) -> Option<Checkpoint> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Couldn't read the checkpoint, ignoring it");
                return None;
            }
        };
        let checkpoint = parse_record(&contents);
        if checkpoint.is_none() && !contents.trim().is_empty() {
            warn!(path = %self.path.display(), "Malformed checkpoint, ignoring it");
        }
        checkpoint
    }
}

/// Parses a checkpoint record, the score line is optional
pub fn parse_record(contents: &str) -> Option<Checkpoint> {
    let mut lines = contents.lines();
    let captures = RECORD_PATTERN.captures(lines.next()?)?;
    let mut fields = [0u32; 7];
    for (idx, field) in fields.iter_mut().enumerate() {
        // Digits only, so this can only fail on overflow
        *field = captures.get(idx + 1)?.as_str().parse().ok()?;
    }
    let score = lines
        .next()
        .and_then(|line| line.trim().parse::<f64>().ok())
        .filter(|score| score.is_finite());
    Some(Checkpoint { spec: CacheSpec::from_array(fields), score })
}
