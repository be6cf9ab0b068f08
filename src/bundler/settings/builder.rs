//! Builder for constructing Settings.

use super::Settings;
use crate::bundler::builder::line_endings::DEFAULT_SCAN_EXTENSIONS;
use openssl::pkey::{PKey, Private};
use std::path::{Path, PathBuf};

/// Builder for constructing [`Settings`].
///
/// # Examples
///
/// ```no_run
/// use ncos_app_bundler::bundler::{SettingsBuilder, builder::signing};
///
/// # fn example() -> ncos_app_bundler::bundler::Result<()> {
/// let key = signing::load_private_key("keys/dev.pem".as_ref(), signing::DEFAULT_KEY_PASSPHRASE)?;
/// let settings = SettingsBuilder::new()
///     .output_directory("dist")
///     .signing_key(key)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
    output_directory: Option<PathBuf>,
    signing_key: Option<PKey<Private>>,
    scan_extensions: Option<Vec<String>>,
    build_timestamp: Option<String>,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets where `<app>.tar.gz` is written.
    ///
    /// Default: the current working directory
    pub fn output_directory<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.output_directory = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the key used to sign manifests.
    ///
    /// Accepts either a key or `None`. Key loading is the caller's job; see
    /// [`load_private_key`](crate::bundler::builder::signing::load_private_key).
    ///
    /// Default: None (unsigned, digest-only signature file)
    pub fn signing_key(mut self, key: impl Into<Option<PKey<Private>>>) -> Self {
        self.signing_key = key.into();
        self
    }

    /// Sets the file suffixes scanned for carriage returns.
    ///
    /// Default: `.py`, `.sh`
    pub fn scan_extensions(mut self, extensions: Vec<String>) -> Self {
        self.scan_extensions = Some(extensions);
        self
    }

    /// Pins the manifest build timestamp.
    ///
    /// Default: None (local clock at manifest build time)
    pub fn build_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.build_timestamp = Some(timestamp.into());
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if a scan extension is empty or does not start with `.`.
    pub fn build(self) -> crate::bundler::Result<Settings> {
        let scan_extensions = self.scan_extensions.unwrap_or_else(|| {
            DEFAULT_SCAN_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect()
        });

        if let Some(bad) = scan_extensions
            .iter()
            .find(|ext| ext.len() < 2 || !ext.starts_with('.'))
        {
            crate::bail!("invalid scan extension '{}': expected a suffix like '.py'", bad);
        }

        Ok(Settings::new(
            self.output_directory.unwrap_or_else(|| PathBuf::from(".")),
            self.signing_key,
            scan_extensions,
            self.build_timestamp,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = SettingsBuilder::new().build().unwrap();
        assert_eq!(settings.output_directory(), Path::new("."));
        assert_eq!(settings.scan_extensions(), &[".py".to_string(), ".sh".to_string()]);
        assert!(!settings.is_signing());
    }

    #[test]
    fn test_fixed_timestamp_is_reused() {
        let settings = SettingsBuilder::new()
            .build_timestamp("2024-05-01T10:00:00.000000")
            .build()
            .unwrap();
        assert_eq!(settings.build_timestamp(), "2024-05-01T10:00:00.000000");
        assert_eq!(settings.build_timestamp(), settings.build_timestamp());
    }

    #[test]
    fn test_clock_timestamp_shape() {
        let ts = SettingsBuilder::new().build().unwrap().build_timestamp();
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, "%Y-%m-%dT%H:%M:%S%.6f").is_ok());
    }

    #[test]
    fn test_rejects_bare_extension() {
        let err = SettingsBuilder::new()
            .scan_extensions(vec!["py".into()])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("'py'"));
    }
}
