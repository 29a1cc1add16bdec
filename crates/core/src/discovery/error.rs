//! Error types for file discovery.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Problems with explicitly named inputs. These are reported and the path is
/// excluded; the rest of the batch still runs.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Named path does not exist.
    #[error("Input not found: {path}")]
    NotFound { path: PathBuf },

    /// Named file is not a FLAC file.
    #[error("Not a FLAC file: {path}")]
    NotSource { path: PathBuf },

    /// The path list could not be read.
    #[error("Failed to read path list {list}: {reason}")]
    ListRead { list: PathBuf, reason: String },

    /// Any other I/O failure while resolving a named path.
    #[error("Failed to access {path}: {reason}")]
    Access { path: PathBuf, reason: String },
}

impl DiscoveryError {
    /// The path this error refers to; for list errors, the list itself.
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path } | Self::NotSource { path } | Self::Access { path, .. } => path,
            Self::ListRead { list, .. } => list,
        }
    }
}
