//! Archive assembly.
//!
//! Packs an app root into `<app>.tar`, gzips it into `<app>.tar.gz` and
//! removes the intermediate. Entries use deterministic GNU headers, so
//! identical trees produce identical tarballs.

use super::{checksum::archive_path, line_endings::Substitutions};
use crate::bundler::{
    error::{ErrorExt, Result},
    utils::fs as fs_utils,
};
use flate2::{Compression, write::GzEncoder};
use std::{
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};
use tar::HeaderMode;
use walkdir::WalkDir;

/// File name of the final archive for `app_name`.
pub fn archive_name(app_name: &str) -> String {
    format!("{app_name}.tar.gz")
}

/// File name of the intermediate tarball for `app_name`.
pub fn tarball_name(app_name: &str) -> String {
    format!("{app_name}.tar")
}

/// Packs `app_root` into `<output_dir>/<app_name>.tar.gz`.
///
/// Every regular file under the root is added in sorted order, hidden files
/// included. Files with an entry in `subs` contribute their normalized bytes
/// under the original name. The temporary copies are removed once the archive
/// is written.
///
/// # Returns
///
/// Path to the created `.tar.gz`.
pub fn pack(
    app_root: &Path,
    app_name: &str,
    output_dir: &Path,
    subs: Substitutions,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir).fs_context("creating output directory", output_dir)?;

    let tar_path = output_dir.join(tarball_name(app_name));
    let gz_path = output_dir.join(archive_name(app_name));

    write_tarball(app_root, &tar_path, &gz_path, &subs)?;
    compress(&tar_path, &gz_path)?;
    fs_utils::remove_file(&tar_path)?;

    subs.cleanup()?;

    Ok(gz_path)
}

fn write_tarball(
    app_root: &Path,
    tar_path: &Path,
    gz_path: &Path,
    subs: &Substitutions,
) -> Result<()> {
    let file = File::create(tar_path).fs_context("creating tarball", tar_path)?;

    // The output directory may sit inside the app root; never archive ourselves.
    let excluded: Vec<PathBuf> = [tar_path, gz_path]
        .iter()
        .filter_map(|p| p.canonicalize().ok())
        .collect();

    let mut tar = tar::Builder::new(file);

    for entry in WalkDir::new(app_root).follow_links(false).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if let Ok(canonical) = path.canonicalize()
            && excluded.contains(&canonical)
        {
            log::debug!("Skipping output file {}", path.display());
            continue;
        }

        let rel_path = archive_path(path.strip_prefix(app_root)?)?;
        let metadata = entry.metadata()?;

        let mut header = tar::Header::new_gnu();
        header.set_metadata_in_mode(&metadata, HeaderMode::Deterministic);

        match subs.get(path) {
            Some(normalized) => {
                let content =
                    fs::read(normalized).fs_context("reading normalized copy", normalized)?;
                header.set_size(content.len() as u64);
                tar.append_data(&mut header, &rel_path, content.as_slice())
                    .fs_context("adding to tarball", path)?;
            }
            None => {
                let mut src = File::open(path).fs_context("opening file for tarball", path)?;
                tar.append_data(&mut header, &rel_path, &mut src)
                    .fs_context("adding to tarball", path)?;
            }
        }
    }

    let mut file = tar.into_inner().fs_context("finishing tarball", tar_path)?;
    file.flush().fs_context("flushing tarball", tar_path)?;
    Ok(())
}

fn compress(tar_path: &Path, gz_path: &Path) -> Result<()> {
    let mut src = File::open(tar_path).fs_context("opening tarball", tar_path)?;
    let dest = File::create(gz_path).fs_context("creating archive", gz_path)?;

    let mut encoder = GzEncoder::new(dest, Compression::default());
    io::copy(&mut src, &mut encoder).fs_context("compressing tarball", gz_path)?;
    let mut finished = encoder.finish().fs_context("finishing archive", gz_path)?;
    finished.flush().fs_context("flushing archive", gz_path)?;
    Ok(())
}
