//! Newline-delimited path lists (`--file PATH` / `--file -`).

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::error::DiscoveryError;

/// Marker that selects standard input as the list source.
pub const STDIN_MARKER: &str = "-";

/// Where a path list is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListSource {
    Stdin,
    File(PathBuf),
}

impl ListSource {
    /// Interprets a `--file` argument; `-` means standard input.
    pub fn from_arg(arg: &Path) -> Self {
        if arg.as_os_str() == STDIN_MARKER {
            Self::Stdin
        } else {
            Self::File(arg.to_path_buf())
        }
    }

    fn path(&self) -> PathBuf {
        match self {
            Self::Stdin => PathBuf::from(STDIN_MARKER),
            Self::File(path) => path.clone(),
        }
    }

    /// Reads every listed path from this source.
    pub fn read(&self) -> Result<Vec<PathBuf>, DiscoveryError> {
        let result = match self {
            Self::Stdin => read_path_list(io::stdin().lock()),
            Self::File(path) => File::open(path).and_then(|f| read_path_list(BufReader::new(f))),
        };
        result.map_err(|e| DiscoveryError::ListRead {
            list: self.path(),
            reason: e.to_string(),
        })
    }
}

/// Reads one path per line, trimming whitespace and ignoring blank lines.
pub fn read_path_list<R: BufRead>(reader: R) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            paths.push(PathBuf::from(trimmed));
        }
    }
    Ok(paths)
}
