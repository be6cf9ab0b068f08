//! Carriage-return stripping for script files.
//!
//! NCOS refuses to run scripts with DOS line endings. Before packing, every
//! file with a scanned extension is checked for `\r` bytes; offending files
//! get a normalized copy in a temporary location and the archive packer
//! substitutes that copy under the original name. Originals are never touched.

use crate::bundler::error::{ErrorExt, Result};
use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::TempPath;
use walkdir::WalkDir;

/// Extensions scanned when no override is configured.
pub const DEFAULT_SCAN_EXTENSIONS: &[&str] = &[".py", ".sh"];

/// Original file → normalized temporary copy.
///
/// Temporary copies are removed by [`Substitutions::cleanup`], or when the
/// set is dropped.
#[derive(Debug, Default)]
pub struct Substitutions {
    entries: BTreeMap<PathBuf, TempPath>,
}

impl Substitutions {
    /// Returns the normalized copy for `original`, if one was made.
    pub fn get(&self, original: &Path) -> Option<&Path> {
        self.entries
            .get(original)
            .map(|temp| AsRef::<Path>::as_ref(temp))
    }

    /// Number of substituted files.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no file needed normalizing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(original, normalized)` pairs in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &Path)> {
        self.entries
            .iter()
            .map(|(orig, temp)| (orig.as_path(), AsRef::<Path>::as_ref(temp)))
    }

    /// Deletes every temporary copy.
    ///
    /// All copies are attempted; the first failure is returned.
    pub fn cleanup(self) -> Result<()> {
        let mut first_err = None;
        for (_, temp) in self.entries {
            let path = temp.to_path_buf();
            if let Err(e) = temp.close().fs_context("removing normalized copy", path) {
                log::warn!("{e}");
                first_err.get_or_insert(e);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

/// Scans `root` for files ending in one of `extensions` that contain `\r`.
///
/// Each hit is rewritten without any carriage returns into a fresh temporary
/// file. Files without `\r` are left out of the result.
pub fn scan(root: &Path, extensions: &[String]) -> Result<Substitutions> {
    let mut subs = Substitutions::default();

    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !extensions.iter().any(|ext| name.ends_with(ext.as_str())) {
            continue;
        }

        let original = entry.path();
        let content = fs::read(original).fs_context("reading script for line endings", original)?;
        if !content.contains(&b'\r') {
            continue;
        }

        log::info!("Removing carriage return(s) from {}", original.display());
        let stripped = strip_carriage_returns(&content);

        let mut temp = tempfile::Builder::new()
            .prefix("ncos-normalized-")
            .tempfile()
            .fs_context("creating normalized copy", original)?;
        temp.write_all(&stripped)
            .fs_context("writing normalized copy", temp.path())?;

        subs.entries
            .insert(original.to_path_buf(), temp.into_temp_path());
    }

    Ok(subs)
}

/// Removes every `\r` byte, including lone ones that are not part of `\r\n`.
pub fn strip_carriage_returns(content: &[u8]) -> Vec<u8> {
    content.iter().copied().filter(|&b| b != b'\r').collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn default_exts() -> Vec<String> {
        DEFAULT_SCAN_EXTENSIONS.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_strip_carriage_returns_removes_lone_cr() {
        assert_eq!(strip_carriage_returns(b"a\r\nb\rc\n"), b"a\nbc\n".to_vec());
        assert_eq!(strip_carriage_returns(b"plain\n"), b"plain\n".to_vec());
    }

    #[test]
    fn test_scan_maps_only_crlf_scripts() {
        let dir = TempDir::new().unwrap();
        let crlf = dir.path().join("app.py");
        let clean = dir.path().join("start.sh");
        let binary = dir.path().join("blob.bin");
        fs::write(&crlf, b"import sys\r\nprint(1)\r\n").unwrap();
        fs::write(&clean, b"#!/bin/sh\nexec python3 app.py\n").unwrap();
        fs::write(&binary, b"\r\r\r").unwrap();

        let subs = scan(dir.path(), &default_exts()).unwrap();
        assert_eq!(subs.len(), 1);
        assert!(subs.get(&clean).is_none());
        assert!(subs.get(&binary).is_none());

        let normalized = subs.get(&crlf).unwrap();
        assert_eq!(fs::read(normalized).unwrap(), b"import sys\nprint(1)\n");
        // Original stays untouched
        assert_eq!(fs::read(&crlf).unwrap(), b"import sys\r\nprint(1)\r\n");
    }

    #[test]
    fn test_cleanup_removes_temporary_copies() {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("run.sh");
        fs::write(&script, b"echo hi\r\n").unwrap();

        let subs = scan(dir.path(), &default_exts()).unwrap();
        let temp: PathBuf = subs.get(&script).unwrap().to_path_buf();
        assert!(temp.exists());

        subs.cleanup().unwrap();
        assert!(!temp.exists());
        assert!(script.exists());
    }

    #[test]
    fn test_scan_honors_custom_extensions() {
        let dir = TempDir::new().unwrap();
        let conf = dir.path().join("settings.conf");
        fs::write(&conf, b"a=1\r\n").unwrap();

        assert!(scan(dir.path(), &default_exts()).unwrap().is_empty());
        let subs = scan(dir.path(), &[".conf".to_string()]).unwrap();
        assert_eq!(subs.iter().count(), 1);
    }
}
