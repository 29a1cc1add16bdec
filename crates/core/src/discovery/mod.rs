//! Input discovery.
//!
//! Turns command-line paths (files, directories, or entries read from a path
//! list) into a de-duplicated, sorted set of FLAC files. Directories are
//! walked recursively; explicitly named files must be FLAC files. Problems
//! with named paths are collected rather than aborting discovery.
//!
//! Symlinked files are converted under their own name; symlinked directories
//! are not descended.

mod error;
mod list;

pub use error::DiscoveryError;
pub use list::{read_path_list, ListSource, STDIN_MARKER};

use regex_lite::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Extension of the files this tool converts.
pub const SOURCE_EXTENSION: &str = "flac";

/// A discovered FLAC file: absolute, with a canonical parent directory, known
/// to exist.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InputFile(PathBuf);

impl InputFile {
    /// Resolves and checks a path as a conversion source.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, DiscoveryError> {
        let path = path.as_ref();
        let canonical = canonicalize(path)?;
        let resolved = resolve_file(path)?;
        if !canonical.is_file() || !is_source_file(&resolved) {
            return Err(DiscoveryError::NotSource {
                path: path.to_path_buf(),
            });
        }
        Ok(Self(resolved))
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl AsRef<Path> for InputFile {
    fn as_ref(&self) -> &Path {
        &self.0
    }
}

/// Whether the path carries the FLAC extension (case-insensitive).
pub fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(SOURCE_EXTENSION))
}

/// Result of discovering inputs.
#[derive(Debug, Default)]
pub struct Discovery {
    /// FLAC files to convert, sorted and unique.
    pub files: Vec<InputFile>,
    /// Non-FLAC files under walked directories that matched the copy pattern.
    pub companions: Vec<PathBuf>,
    /// Directories that anchor the common root: each directory argument
    /// itself and the parent of each file argument.
    pub anchors: Vec<PathBuf>,
    /// Problems with named paths; those paths are excluded.
    pub errors: Vec<DiscoveryError>,
}

impl Discovery {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.companions.is_empty()
    }
}

/// Discovers FLAC files from the given paths.
///
/// When `copy_pattern` is set, non-FLAC files found while walking directories
/// whose path matches it are returned as companions.
pub fn discover<P: AsRef<Path>>(paths: &[P], copy_pattern: Option<&Regex>) -> Discovery {
    let mut files = BTreeSet::new();
    let mut companions = BTreeSet::new();
    let mut anchors = BTreeSet::new();
    let mut errors = Vec::new();

    for path in paths {
        let path = path.as_ref();
        let canonical = match canonicalize(path) {
            Ok(c) => c,
            Err(e) => {
                errors.push(e);
                continue;
            }
        };

        if canonical.is_dir() {
            debug!("Walking directory {:?}", canonical);
            walk_directory(&canonical, copy_pattern, &mut files, &mut companions);
            anchors.insert(canonical);
            continue;
        }

        let resolved = match resolve_file(path) {
            Ok(r) => r,
            Err(e) => {
                errors.push(e);
                continue;
            }
        };
        if is_source_file(&resolved) {
            if let Some(parent) = resolved.parent() {
                anchors.insert(parent.to_path_buf());
            }
            files.insert(InputFile(resolved));
        } else {
            errors.push(DiscoveryError::NotSource {
                path: path.to_path_buf(),
            });
        }
    }

    Discovery {
        files: files.into_iter().collect(),
        companions: companions.into_iter().collect(),
        anchors: anchors.into_iter().collect(),
        errors,
    }
}

fn walk_directory(
    dir: &Path,
    copy_pattern: Option<&Regex>,
    files: &mut BTreeSet<InputFile>,
    companions: &mut BTreeSet<PathBuf>,
) {
    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", dir.display(), e);
                continue;
            }
        };

        let file_type = entry.file_type();
        let path = entry.into_path();
        if file_type.is_symlink() {
            match fs::metadata(&path) {
                Ok(meta) if meta.is_file() => {}
                Ok(_) => {
                    debug!("Not descending into linked directory {}", path.display());
                    continue;
                }
                Err(e) => {
                    warn!("Skipping broken link {}: {}", path.display(), e);
                    continue;
                }
            }
        } else if !file_type.is_file() {
            continue;
        }

        if is_source_file(&path) {
            files.insert(InputFile(path));
        } else if let Some(pattern) = copy_pattern {
            if pattern.is_match(&path.to_string_lossy()) {
                companions.insert(path);
            }
        }
    }
}

fn canonicalize(path: &Path) -> Result<PathBuf, DiscoveryError> {
    fs::canonicalize(path).map_err(|e| resolve_error(path, e))
}

/// Canonicalises the parent directory only, so a symlinked file keeps its
/// own name and two spellings of the same entry compare equal.
fn resolve_file(path: &Path) -> Result<PathBuf, DiscoveryError> {
    let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
        return canonicalize(path);
    };
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };
    let parent = fs::canonicalize(parent).map_err(|e| resolve_error(path, e))?;
    Ok(parent.join(name))
}

fn resolve_error(path: &Path, e: io::Error) -> DiscoveryError {
    match e.kind() {
        io::ErrorKind::NotFound => DiscoveryError::NotFound {
            path: path.to_path_buf(),
        },
        _ => DiscoveryError::Access {
            path: path.to_path_buf(),
            reason: e.to_string(),
        },
    }
}
