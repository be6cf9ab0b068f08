//! Packaging orchestration.
//!
//! This module provides the [`Packager`] that drives one app root through
//! the packaging stages for every app section in its `package.ini`.

use super::{archive, checksum::file_checksum, line_endings, manifest::ManifestBuilder, signing};
use crate::{
    bundler::{
        MANIFEST_FILE, METADATA_FOLDER, PackagedArtifact, Result, Settings, SettingsBuilder,
        error::{Context, ErrorExt},
        utils::fs as fs_utils,
    },
    metadata::{self, AppDescriptor},
};
use openssl::pkey::{PKey, Private};
use regex::Regex;
use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};
use walkdir::WalkDir;

static BYTE_CODE_FILES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^.*\.(pyc|pyo|pyd)$").expect("valid bytecode file pattern"));

static BYTE_CODE_FOLDERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^__pycache__$").expect("valid bytecode folder pattern"));

/// Stages of a single packaging run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackagingStage {
    /// Empty (or create) `METADATA/`.
    CleanMetadata,
    /// Remove Python bytecode files and `__pycache__` folders.
    CleanBytecode,
    /// Hash the tree and write `MANIFEST.json`.
    BuildManifest,
    /// Write `SIGNATURE.DS`.
    Sign,
    /// Normalize scripts and write the archive.
    Pack,
    /// Archive written.
    Done,
}

impl fmt::Display for PackagingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CleanMetadata => "clean metadata",
            Self::CleanBytecode => "clean bytecode",
            Self::BuildManifest => "build manifest",
            Self::Sign => "sign",
            Self::Pack => "pack",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Packages NCOS app roots.
///
/// Holds the immutable [`Settings`] for every run it performs. Runs are
/// synchronous and must not overlap on the same app root.
///
/// # Examples
///
/// ```no_run
/// use ncos_app_bundler::bundler::{Packager, Settings};
///
/// # fn example(settings: Settings) -> ncos_app_bundler::bundler::Result<()> {
/// let packager = Packager::new(settings);
/// let artifacts = packager.package_application("hello_world")?;
/// println!("Created {} packages", artifacts.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Packager {
    settings: Settings,
}

impl Packager {
    /// Creates a packager with the given settings.
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// Returns a reference to the packager settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Packages every app section declared in `<app_root>/package.ini`.
    ///
    /// All sections are parsed before the first run starts. Each section is
    /// then an independent full run over the same directory, so later runs
    /// see the files produced by earlier ones.
    ///
    /// # Returns
    ///
    /// One [`PackagedArtifact`] per section, in file order.
    pub fn package_application(&self, app_root: impl AsRef<Path>) -> Result<Vec<PackagedArtifact>> {
        let app_root = app_root.as_ref();
        let app_root = app_root
            .canonicalize()
            .fs_context("resolving app root", app_root)?;

        let descriptors = metadata::load_descriptors(&app_root)?;

        let mut artifacts = Vec::with_capacity(descriptors.len());
        for descriptor in &descriptors {
            artifacts.push(self.package_descriptor(&app_root, descriptor)?);
        }

        Ok(artifacts)
    }

    /// Runs every packaging stage for one descriptor.
    ///
    /// `app_root` must be the directory the descriptor was loaded from.
    pub fn package_descriptor(
        &self,
        app_root: &Path,
        descriptor: &AppDescriptor,
    ) -> Result<PackagedArtifact> {
        descriptor.validate_root(app_root)?;

        let metadata_dir = app_root.join(METADATA_FOLDER);
        let manifest_path = metadata_dir.join(MANIFEST_FILE);

        let mut stage = PackagingStage::CleanMetadata;
        log::debug!("[{}] {}", descriptor.name, stage);
        fs_utils::clear_dir(&metadata_dir).with_context(|| stage_context(stage, descriptor))?;

        stage = PackagingStage::CleanBytecode;
        log::debug!("[{}] {}", descriptor.name, stage);
        clean_bytecode(app_root).with_context(|| stage_context(stage, descriptor))?;

        stage = PackagingStage::BuildManifest;
        log::debug!("[{}] {}", descriptor.name, stage);
        ManifestBuilder::new(&self.settings)
            .build(descriptor, app_root)
            .and_then(|manifest| manifest.write(&manifest_path))
            .with_context(|| stage_context(stage, descriptor))?;

        stage = PackagingStage::Sign;
        log::debug!("[{}] {}", descriptor.name, stage);
        signing::sign(&manifest_path, self.settings.signing_key())
            .and_then(|token| signing::write_signature(&metadata_dir, &token))
            .with_context(|| stage_context(stage, descriptor))?;

        stage = PackagingStage::Pack;
        log::debug!("[{}] {}", descriptor.name, stage);
        let path = line_endings::scan(app_root, self.settings.scan_extensions())
            .and_then(|subs| {
                archive::pack(
                    app_root,
                    &descriptor.name,
                    self.settings.output_directory(),
                    subs,
                )
            })
            .with_context(|| stage_context(stage, descriptor))?;

        let size = fs::metadata(&path)
            .fs_context("reading artifact metadata", &path)?
            .len();
        let checksum = file_checksum(&path)?;

        log::debug!("[{}] {}", descriptor.name, PackagingStage::Done);
        log::info!("Package {} created", archive::archive_name(&descriptor.name));

        Ok(PackagedArtifact {
            name: descriptor.name.clone(),
            path,
            size,
            checksum,
        })
    }
}

/// Packages `app_root` with default settings and an optional signing key.
///
/// Archives are written to the current working directory.
pub fn package_application(
    app_root: impl AsRef<Path>,
    key: Option<PKey<Private>>,
) -> Result<Vec<PackagedArtifact>> {
    let settings = SettingsBuilder::new().signing_key(key).build()?;
    Packager::new(settings).package_application(app_root)
}

/// Removes compiled Python artifacts anywhere under `app_root`.
///
/// Returns the removed paths.
pub fn clean_bytecode(app_root: &Path) -> Result<Vec<PathBuf>> {
    let mut doomed = Vec::new();

    let mut walker = WalkDir::new(app_root).follow_links(false).into_iter();
    while let Some(entry) = walker.next() {
        let entry = entry?;
        if entry.depth() == 0 {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if entry.file_type().is_dir() {
            if BYTE_CODE_FOLDERS.is_match(&name) {
                doomed.push(entry.path().to_path_buf());
                walker.skip_current_dir();
            }
        } else if BYTE_CODE_FILES.is_match(&name) {
            doomed.push(entry.path().to_path_buf());
        }
    }

    for path in &doomed {
        if path.is_dir() {
            fs_utils::remove_dir_all(path)?;
        } else {
            fs_utils::remove_file(path)?;
        }
        log::debug!("Removed {}", path.display());
    }

    Ok(doomed)
}

fn stage_context(stage: PackagingStage, descriptor: &AppDescriptor) -> String {
    format!("{} failed for {}", stage, descriptor.name)
}
