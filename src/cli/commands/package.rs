//! Package command implementation.

use crate::bundler::{self, CONFIG_FILE, Error, Packager, SettingsBuilder, builder::signing};
use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::{CliError, Result};
use crate::metadata::{self, UuidStatus};

/// Execute package command
pub(super) fn execute_package(args: &Args, config: &RuntimeConfig) -> Result<()> {
    let Command::Package {
        app,
        key,
        passphrase,
        output,
    } = &args.command
    else {
        unreachable!("execute_package called with non-Package command");
    };

    let apps = super::resolve_apps(app.as_deref(), config)?;

    let signing_key = match key {
        Some(path) => {
            config.verbose_println(&format!("Loading signing key {}", path.display()));
            Some(signing::load_private_key(path, passphrase)?)
        }
        None => None,
    };

    let settings = SettingsBuilder::new()
        .output_directory(output.as_deref().unwrap_or(config.workdir()))
        .signing_key(signing_key)
        .build()?;
    let packager = Packager::new(settings);

    // Keep going on failure so one broken app does not hide the others
    let mut failed = Vec::new();
    for app_name in &apps {
        config.progress(&format!("Packaging {app_name}"));

        let packaged = persist_uuid(app_name, config)
            .and_then(|()| packager.package_application(config.workdir().join(app_name)));
        match packaged {
            Ok(artifacts) => {
                for artifact in artifacts {
                    config.success_println(&format!("Package {}.tar.gz created", artifact.name));
                    config.indent(&format!("{}", artifact.path.display()));
                    config.verbose_println(&format!(
                        "{} bytes, sha256 {}",
                        artifact.size, artifact.checksum
                    ));
                }
            }
            Err(e) if apps.len() == 1 => return Err(e.into()),
            Err(e) => {
                config.error_println(&format!("Error packaging {app_name}: {e}"));
                failed.push(app_name.clone());
            }
        }
    }

    if failed.is_empty() {
        Ok(())
    } else {
        Err(CliError::ExecutionFailed {
            command: args.command.name().to_string(),
            apps: failed,
        }
        .into())
    }
}

/// Fills an empty `uuid =` in the app's `package.ini` before packaging, so
/// repeated builds keep the same identity.
///
/// A missing `uuid` key only warns. A section mismatch is left for the
/// packager to report.
fn persist_uuid(app_name: &str, config: &RuntimeConfig) -> bundler::Result<()> {
    let app_root = config.workdir().join(app_name);
    match metadata::ensure_uuid(&app_root, app_name) {
        Ok(UuidStatus::Created(uuid)) => {
            config.success_println(&format!("Saved new uuid {uuid} for {app_name}"));
            Ok(())
        }
        Ok(UuidStatus::Existing(uuid)) => {
            config.verbose_println(&format!("{app_name} uuid: {uuid}"));
            Ok(())
        }
        Err(Error::MissingField { field: "uuid", .. }) => {
            config.warning_println(&format!("{app_name}/{CONFIG_FILE} has no uuid key"));
            Ok(())
        }
        Err(e @ Error::ConfigMismatch { .. }) => {
            log::debug!("Skipping uuid update for {app_name}: {e}");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
