//! `sdk_settings.ini` support.
//!
//! Only `[sdk] app_name` is read; device address and credentials in the same
//! file belong to the device tooling.

use crate::{bundler, metadata::ini_file};
use std::path::Path;

/// Settings file looked up in the SDK workdir.
pub const SDK_SETTINGS_FILE: &str = "sdk_settings.ini";

const SDK_SECTION: &str = "sdk";

/// Values consumed from `sdk_settings.ini`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SdkSettings {
    /// Default app for commands run without an APP argument.
    pub app_name: Option<String>,
}

impl SdkSettings {
    /// Reads `<workdir>/sdk_settings.ini`. A missing file yields defaults.
    pub fn load(workdir: &Path) -> bundler::Result<Self> {
        let path = workdir.join(SDK_SETTINGS_FILE);
        if !path.is_file() {
            log::debug!("No {} in {}", SDK_SETTINGS_FILE, workdir.display());
            return Ok(Self::default());
        }

        let ini = ini_file::load(&path)?;
        let app_name = ini_file::sections(&ini)
            .into_iter()
            .find(|s| s.name == SDK_SECTION)
            .and_then(|s| s.get("app_name").map(str::to_string))
            .filter(|name| !name.is_empty());

        Ok(Self { app_name })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_reads_app_name_and_ignores_credentials() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(SDK_SETTINGS_FILE),
            "[sdk]\napp_name = hello_world\ndev_client_ip = 192.168.0.1\ndev_client_password = secret\n",
        )
        .unwrap();

        let settings = SdkSettings::load(dir.path()).unwrap();
        assert_eq!(settings.app_name.as_deref(), Some("hello_world"));
    }

    #[test]
    fn test_missing_file_or_value() {
        let dir = TempDir::new().unwrap();
        assert_eq!(SdkSettings::load(dir.path()).unwrap(), SdkSettings::default());

        fs::write(dir.path().join(SDK_SETTINGS_FILE), "[sdk]\napp_name =\n").unwrap();
        assert!(SdkSettings::load(dir.path()).unwrap().app_name.is_none());
    }
}
