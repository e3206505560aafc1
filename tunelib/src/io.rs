use std::fs::File;
use std::path::{Path, PathBuf};
use memmap2::Mmap;
use crate::error::SearchError;

/// A trace file, opened once and replayed to every simulator run
///
/// The contents are opaque, the search only ever splits them into lines
pub struct Trace {
    path: PathBuf,
    data: TraceData,
}

enum TraceData {
    Mapped(Mmap),
    // Zero length files can't be mapped
    Empty,
    Owned(Vec<u8>),
}

impl Trace {
    pub fn open(path: &Path) -> Result<Self, SearchError> {
        let to_error = |source| SearchError::Trace { path: path.to_path_buf(), source };
        let file = File::open(path).map_err(to_error)?;
        let len = file.metadata().map_err(to_error)?.len();
        let data = if len == 0 {
            TraceData::Empty
        } else {
            // The map is read only, it's only invalidated if something truncates the trace while
            // we're running
            let map = unsafe { Mmap::map(&file) }.map_err(to_error)?;
            #[cfg(unix)]
            map.advise(memmap2::Advice::Sequential).map_err(to_error)?;
            TraceData::Mapped(map)
        };
        Ok(Self { path: path.to_path_buf(), data })
    }

    /// A trace held in memory, for tests and benchmarks
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        Self { path: path.into(), data: TraceData::Owned(bytes) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn as_bytes(&self) -> &[u8] {
        match &self.data {
            TraceData::Mapped(map) => &map[..],
            TraceData::Empty => &[],
            TraceData::Owned(bytes) => bytes,
        }
    }

    /// Each line with surrounding ASCII whitespace removed, `\r\n` endings included
    pub fn lines(&self) -> impl Iterator<Item = &[u8]> {
        let bytes = self.as_bytes();
        let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
        let has_lines = !bytes.is_empty();
        body.split(|b| *b == b'\n')
            .filter(move |_| has_lines)
            .map(|line| line.trim_ascii())
    }
}
