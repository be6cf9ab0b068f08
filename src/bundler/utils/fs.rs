//! File system utilities for packaging.
//!
//! Idempotent removal helpers used by the metadata reset and `clean`.

use crate::bundler::error::{ErrorExt, Result};
use std::{fs, io, path::Path};

/// Ensures `path` exists as an empty directory.
///
/// Creates the directory if missing, otherwise removes every file and
/// subdirectory inside it. The directory itself is kept.
pub fn clear_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        return fs::create_dir_all(path).fs_context("creating directory", path);
    }

    for entry in fs::read_dir(path).fs_context("listing directory", path)? {
        let entry = entry.fs_context("listing directory", path)?;
        let entry_path = entry.path();
        let file_type = entry
            .file_type()
            .fs_context("reading file type", &entry_path)?;

        if file_type.is_dir() {
            fs::remove_dir_all(&entry_path).fs_context("removing directory", &entry_path)?;
        } else {
            fs::remove_file(&entry_path).fs_context("removing file", &entry_path)?;
        }
    }

    Ok(())
}

/// Removes a file if it exists. Returns whether anything was removed.
pub fn remove_file(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false), // Idempotent
        Err(e) => Err(e).fs_context("removing file", path),
    }
}

/// Removes the directory and its contents if it exists. Returns whether anything was removed.
pub fn remove_dir_all(path: &Path) -> Result<bool> {
    match fs::remove_dir_all(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false), // Idempotent
        Err(e) => Err(e).fs_context("removing directory", path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_clear_dir_creates_missing() {
        let dir = TempDir::new().unwrap();
        let meta = dir.path().join("METADATA");
        clear_dir(&meta).unwrap();
        assert!(meta.is_dir());
    }

    #[test]
    fn test_clear_dir_empties_files_and_subdirs() {
        let dir = TempDir::new().unwrap();
        let meta = dir.path().join("METADATA");
        fs::create_dir_all(meta.join("nested/deeper")).unwrap();
        fs::write(meta.join("MANIFEST.json"), "{}").unwrap();
        fs::write(meta.join("nested/deeper/x"), "x").unwrap();

        clear_dir(&meta).unwrap();
        assert!(meta.is_dir());
        assert_eq!(fs::read_dir(&meta).unwrap().count(), 0);
    }

    #[test]
    fn test_removal_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("app.tar");
        fs::write(&file, "tar").unwrap();

        assert!(remove_file(&file).unwrap());
        assert!(!remove_file(&file).unwrap());
        assert!(!remove_dir_all(&dir.path().join("missing")).unwrap());
    }
}
