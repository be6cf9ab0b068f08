//! File and directory checksums.
//!
//! This module provides SHA-256 checksums for single files and the
//! relative-path → digest table recorded in the app manifest.

use crate::bundler::error::{Error, ErrorExt, Result};
use sha2::{Digest, Sha256};
use std::{collections::BTreeMap, fs::File, io::Read, path::Path};
use walkdir::{DirEntry, WalkDir};

/// SHA-256 internal block size in bytes.
const SHA256_BLOCK_SIZE: usize = 64;

/// Read size for streamed hashing, in hash blocks.
const BUFFER_BLOCKS: usize = 64;

/// Calculates the hex-encoded SHA-256 checksum of a single file.
///
/// The file is streamed in chunks of 64 × the SHA-256 block size so large
/// payloads never sit in memory at once.
///
/// # Arguments
///
/// * `path` - Path to file to hash
///
/// # Returns
///
/// * `Ok(String)` - Lowercase hex SHA-256 (64 characters)
/// * `Err` - [`Error::Fs`](crate::bundler::Error::Fs) naming the unreadable path
pub fn file_checksum(path: &Path) -> Result<String> {
    let mut file = File::open(path).fs_context("opening file for hashing", path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; SHA256_BLOCK_SIZE * BUFFER_BLOCKS];

    loop {
        let n = file
            .read(&mut buffer)
            .fs_context("reading file for hash calculation", path)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(hex::encode(hasher.finalize()))
}

/// Hashes every visible file under `root`.
///
/// Keys are paths relative to `root`, always joined with `/` so that the
/// resulting manifest (and therefore its signature) is identical no matter
/// which host built it. Files or directories whose name starts with `.` are
/// skipped along with everything beneath them; each skip is logged.
///
/// # Arguments
///
/// * `root` - App root directory
///
/// # Returns
///
/// Sorted mapping of relative path to hex digest.
pub fn hash_directory(root: &Path) -> Result<BTreeMap<String, String>> {
    let mut hashed = BTreeMap::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.depth() > 0 && is_hidden(entry) {
                log::info!(
                    "Did not include {} in the App package.",
                    entry.file_name().to_string_lossy()
                );
                return false;
            }
            true
        });

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let rel_path = entry.path().strip_prefix(root)?;
        hashed.insert(archive_path(rel_path)?, file_checksum(entry.path())?);
    }

    Ok(hashed)
}

/// Joins the components of a relative path with `/`.
///
/// Shared by the manifest and the archive so both name files identically.
/// Names that are not valid UTF-8 fail with [`Error::NonUtf8Path`].
pub fn archive_path(rel_path: &Path) -> Result<String> {
    let parts = rel_path
        .components()
        .map(|c| {
            c.as_os_str().to_str().ok_or_else(|| Error::NonUtf8Path {
                path: rel_path.to_path_buf(),
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join("/"))
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}
