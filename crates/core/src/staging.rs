//! Temp files beside a destination, moved into place only when complete.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Prefix of every temp file created in an output directory.
pub const TEMP_PREFIX: &str = ".flac2mp3-";

/// Directory a destination file lives in.
pub fn parent_dir(target: &Path) -> PathBuf {
    match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Creates a temp file in `dir`. It is deleted on drop unless persisted.
pub fn temp_file(dir: &Path, suffix: &str) -> io::Result<NamedTempFile> {
    tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .suffix(suffix)
        .tempfile_in(dir)
}

/// Atomically renames `file` to `target`. Without `overwrite` an existing
/// target is left alone and an `AlreadyExists` error is returned.
pub fn persist(file: NamedTempFile, target: &Path, overwrite: bool) -> io::Result<File> {
    let persisted = if overwrite {
        file.persist(target)
    } else {
        file.persist_noclobber(target)
    };
    persisted.map_err(|e| e.error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_parent_dir_of_bare_name() {
        assert_eq!(parent_dir(Path::new("a.mp3")), PathBuf::from("."));
        assert_eq!(parent_dir(Path::new("/out/a.mp3")), PathBuf::from("/out"));
    }

    #[test]
    fn test_dropped_temp_file_is_removed() {
        let tmp = TempDir::new().unwrap();
        let file = temp_file(tmp.path(), ".part").unwrap();
        assert!(entries(tmp.path())[0].starts_with(TEMP_PREFIX));
        drop(file);
        assert!(entries(tmp.path()).is_empty());
    }

    #[test]
    fn test_persist_noclobber_keeps_existing() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("a.mp3");
        std::fs::write(&target, b"old").unwrap();

        let file = temp_file(tmp.path(), ".part").unwrap();
        std::fs::write(file.path(), b"new").unwrap();
        let err = persist(file, &target, false).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert_eq!(std::fs::read(&target).unwrap(), b"old");
        assert_eq!(entries(tmp.path()), vec!["a.mp3"]);
    }

    #[test]
    fn test_persist_overwrite_replaces() {
        let tmp = TempDir::new().unwrap();
        let target = tmp.path().join("a.mp3");
        std::fs::write(&target, b"old").unwrap();

        let file = temp_file(tmp.path(), ".part").unwrap();
        std::fs::write(file.path(), b"new").unwrap();
        persist(file, &target, true).unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"new");
        assert_eq!(entries(tmp.path()), vec!["a.mp3"]);
    }
}
