//! Core Settings struct and implementations.

use openssl::pkey::{PKey, Private};
use std::path::{Path, PathBuf};

/// Immutable configuration for a packaging run.
///
/// Constructed via [`SettingsBuilder`](super::SettingsBuilder) and threaded
/// through every packaging stage; nothing in the packaging core reads global
/// state, environment variables or CLI arguments.
///
/// # Examples
///
/// ```no_run
/// use ncos_app_bundler::bundler::SettingsBuilder;
///
/// # fn example() -> ncos_app_bundler::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .output_directory("dist")
///     .scan_extensions(vec![".py".into(), ".sh".into(), ".conf".into()])
///     .build()?;
/// assert!(!settings.is_signing());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Settings {
    /// Directory receiving `<app>.tar.gz`.
    output_directory: PathBuf,

    /// Key used to sign the manifest. `None` writes a bare digest instead.
    signing_key: Option<PKey<Private>>,

    /// File name suffixes checked for carriage returns.
    scan_extensions: Vec<String>,

    /// Fixed manifest timestamp; `None` uses the local clock.
    build_timestamp: Option<String>,
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("output_directory", &self.output_directory)
            .field("signing_key", &self.signing_key.as_ref().map(|_| "<PrivateKey>"))
            .field("scan_extensions", &self.scan_extensions)
            .field("build_timestamp", &self.build_timestamp)
            .finish()
    }
}

impl Settings {
    pub(super) fn new(
        output_directory: PathBuf,
        signing_key: Option<PKey<Private>>,
        scan_extensions: Vec<String>,
        build_timestamp: Option<String>,
    ) -> Self {
        Self {
            output_directory,
            signing_key,
            scan_extensions,
            build_timestamp,
        }
    }

    /// Returns the directory that receives packaged archives.
    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Returns the manifest signing key, if any.
    pub fn signing_key(&self) -> Option<&PKey<Private>> {
        self.signing_key.as_ref()
    }

    /// True when manifests will be cryptographically signed.
    pub fn is_signing(&self) -> bool {
        self.signing_key.is_some()
    }

    /// Returns the suffixes scanned for carriage returns.
    pub fn scan_extensions(&self) -> &[String] {
        &self.scan_extensions
    }

    /// Returns the manifest `date` value for this run.
    ///
    /// Uses the fixed timestamp when one was configured, otherwise the
    /// current local time in ISO-8601 form with microseconds.
    pub fn build_timestamp(&self) -> String {
        match &self.build_timestamp {
            Some(ts) => ts.clone(),
            None => chrono::Local::now()
                .naive_local()
                .format("%Y-%m-%dT%H:%M:%S%.6f")
                .to_string(),
        }
    }
}
