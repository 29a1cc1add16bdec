//! Testing utilities and mock implementations.
//!
//! `MockConverter` stands in for the external tool pipeline so dispatcher
//! behaviour (skips, failures, cancellation, concurrency) can be tested
//! without `flac` or `lame` installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use flac2mp3_core::testing::MockConverter;
//!
//! let converter = MockConverter::new();
//! converter.fail_on("broken.flac").await;
//!
//! let summary = Dispatcher::new(Arc::new(converter), 4).run(tasks).await;
//! ```

mod mock_converter;

pub use mock_converter::{MockConverter, RecordedConversion};

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::fs;
    use std::io;
    use std::path::{Path, PathBuf};

    /// Minimal FLAC stream marker; enough for discovery, not for decoding.
    pub const FLAC_MAGIC: &[u8] = b"fLaC";

    /// Creates empty FLAC files (and their directories) below `root`.
    pub fn flac_tree(root: &Path, relative: &[&str]) -> io::Result<Vec<PathBuf>> {
        let mut created = Vec::with_capacity(relative.len());
        for rel in relative {
            let path = root.join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&path, FLAC_MAGIC)?;
            created.push(path);
        }
        Ok(created)
    }
}
