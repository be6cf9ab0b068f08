//! App manifest generation.
//!
//! The manifest is what the device verifies before installing: app identity,
//! version, firmware floor, and a SHA-256 for every file in the package. It is
//! serialized with sorted keys and a fixed indent so the same inputs always
//! produce the same bytes (and therefore the same signature).

use super::checksum;
use crate::{
    bundler::{
        Settings,
        error::{ErrorExt, Result},
    },
    metadata::AppDescriptor,
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fs, path::Path};

/// Manifest format understood by NCOS.
pub const FORMAT_VERSION: FormatVersion = FormatVersion {
    version_major: 1,
    version_minor: 0,
};

/// Manifest schema version (`pmf` in the JSON).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormatVersion {
    /// Major schema version.
    pub version_major: u32,
    /// Minor schema version.
    pub version_minor: u32,
}

/// `MANIFEST.json` contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Manifest schema version.
    #[serde(rename = "pmf")]
    pub format_version: FormatVersion,

    /// App identity, versioning and file table.
    pub app: ManifestApp,
}

/// The `app` object of the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestApp {
    /// Descriptor fields, with `uuid` always resolved.
    #[serde(flatten)]
    pub descriptor: AppDescriptor,

    /// When the manifest was built (ISO-8601, local time).
    #[serde(rename = "date")]
    pub build_timestamp: String,

    /// Relative path → hex SHA-256.
    pub files: BTreeMap<String, String>,
}

impl Manifest {
    /// Renders pretty JSON with sorted keys and a four-space indent.
    pub fn to_json_pretty(&self) -> Result<String> {
        // Round-tripping through Value sorts every object's keys.
        let value = serde_json::to_value(self)?;

        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
        value.serialize(&mut ser)?;

        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Writes the manifest to `path`.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = self.to_json_pretty()?;
        fs::write(path, json).fs_context("writing manifest", path)
    }

    /// Reads a manifest previously written by [`Manifest::write`].
    pub fn read(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).fs_context("reading manifest", path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Builds manifests for one packaging configuration.
#[derive(Debug)]
pub struct ManifestBuilder<'a> {
    settings: &'a Settings,
}

impl<'a> ManifestBuilder<'a> {
    /// Creates a builder bound to `settings`.
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Builds the manifest for `descriptor` over the files in `app_root`.
    ///
    /// Every visible file under the root is hashed, including whatever is in
    /// `METADATA/` at the time, so callers must clear stale metadata first.
    ///
    /// # Errors
    ///
    /// [`Error::MissingUuid`](crate::bundler::Error::MissingUuid) when signing
    /// without a configured uuid, or any error raised while hashing.
    pub fn build(&self, descriptor: &AppDescriptor, app_root: &Path) -> Result<Manifest> {
        let uuid = descriptor.resolve_uuid(self.settings.is_signing())?;
        let files = checksum::hash_directory(app_root)?;
        log::debug!("Hashed {} files for {}", files.len(), descriptor.name);

        Ok(Manifest {
            format_version: FORMAT_VERSION,
            app: ManifestApp {
                descriptor: AppDescriptor {
                    uuid: Some(uuid),
                    ..descriptor.clone()
                },
                build_timestamp: self.settings.build_timestamp(),
                files,
            },
        })
    }
}
