//! Output path resolution.
//!
//! Without an output directory every MP3 is written next to its source.
//! With one, each file keeps its path relative to the common root, so tracks
//! with equal names in different folders never collide.

use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Extension given to converted files.
pub const TARGET_EXTENSION: &str = "mp3";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// Input does not live under the root used for mirroring.
    #[error("{path} is outside the root directory {root}")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    /// Input has no file name component.
    #[error("{path} has no file name")]
    NoFileName { path: PathBuf },
}

/// Deepest directory shared by every given directory, compared component-wise.
///
/// Returns `None` for an empty input or when the paths share nothing
/// (e.g. different drive prefixes).
pub fn common_root<I, P>(dirs: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>,
{
    let mut iter = dirs.into_iter();
    let first = iter.next()?.as_ref().to_path_buf();
    let mut shared: Vec<Component<'_>> = first.components().collect();

    for dir in iter {
        let len = shared
            .iter()
            .zip(dir.as_ref().components())
            .take_while(|(a, b)| *a == b)
            .count();
        shared.truncate(len);
    }

    if shared.is_empty() {
        return None;
    }
    Some(shared.iter().map(|c| c.as_os_str()).collect())
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    InPlace,
    Mirrored {
        output_dir: PathBuf,
        root: Option<PathBuf>,
    },
}

/// Maps source paths to destination paths for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    target: Target,
    strip_chars: Vec<char>,
}

impl OutputLayout {
    /// Outputs are written beside their sources.
    pub fn in_place() -> Self {
        Self {
            target: Target::InPlace,
            strip_chars: Vec::new(),
        }
    }

    /// Outputs mirror the tree below `root` inside `output_dir`.
    ///
    /// Without a root, files are placed directly in `output_dir`.
    pub fn mirrored(output_dir: impl Into<PathBuf>, root: Option<PathBuf>) -> Self {
        Self {
            target: Target::Mirrored {
                output_dir: output_dir.into(),
                root,
            },
            strip_chars: Vec::new(),
        }
    }

    /// Builds the layout for a run: an explicit root wins over the root
    /// computed from the discovery anchors.
    pub fn plan(
        output_dir: Option<PathBuf>,
        root_override: Option<PathBuf>,
        anchors: &[PathBuf],
    ) -> Self {
        match output_dir {
            None => Self::in_place(),
            Some(output_dir) => {
                let root = root_override.or_else(|| common_root(anchors));
                Self::mirrored(output_dir, root)
            }
        }
    }

    /// Characters removed from every generated path component.
    pub fn with_strip_chars(mut self, chars: &str) -> Self {
        self.strip_chars = chars.chars().collect();
        self
    }

    pub fn output_dir(&self) -> Option<&Path> {
        match &self.target {
            Target::InPlace => None,
            Target::Mirrored { output_dir, .. } => Some(output_dir),
        }
    }

    pub fn root(&self) -> Option<&Path> {
        match &self.target {
            Target::InPlace => None,
            Target::Mirrored { root, .. } => root.as_deref(),
        }
    }

    /// Destination MP3 for a FLAC input.
    pub fn output_for(&self, input: &Path) -> Result<PathBuf, LayoutError> {
        let placed = self.place(input)?;
        Ok(placed.with_extension(TARGET_EXTENSION))
    }

    /// Destination for a companion file; its extension is kept. Companions
    /// are only copied when an output directory is set.
    pub fn companion_for(&self, path: &Path) -> Result<Option<PathBuf>, LayoutError> {
        match self.target {
            Target::InPlace => Ok(None),
            Target::Mirrored { .. } => self.place(path).map(Some),
        }
    }

    fn place(&self, path: &Path) -> Result<PathBuf, LayoutError> {
        let file_name = path.file_name().ok_or_else(|| LayoutError::NoFileName {
            path: path.to_path_buf(),
        })?;

        match &self.target {
            Target::InPlace => Ok(path.with_file_name(self.strip(file_name.to_os_string()))),
            Target::Mirrored { output_dir, root } => {
                let relative = match root {
                    Some(root) => path.strip_prefix(root).map_err(|_| LayoutError::OutsideRoot {
                        path: path.to_path_buf(),
                        root: root.clone(),
                    })?,
                    None => Path::new(file_name),
                };

                let mut out = output_dir.clone();
                for component in relative.components() {
                    out.push(self.strip(component.as_os_str().to_os_string()));
                }
                Ok(out)
            }
        }
    }

    fn strip(&self, component: OsString) -> OsString {
        if self.strip_chars.is_empty() {
            return component;
        }
        let stripped: String = component
            .to_string_lossy()
            .chars()
            .filter(|c| !self.strip_chars.contains(c))
            .collect();
        if stripped.is_empty() {
            component
        } else {
            OsString::from(stripped)
        }
    }
}
