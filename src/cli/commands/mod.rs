//! Command execution.
//!
//! Each subcommand resolves the apps it operates on, runs the packaging core
//! and reports through the [`RuntimeConfig`] output helpers.

mod clean;
mod package;
mod uuid;

use crate::cli::{ALL_APPS, Args, Command, RuntimeConfig, SdkSettings};
use crate::error::{CliError, Result};
use crate::metadata;

use clean::execute_clean;
use package::execute_package;
use self::uuid::execute_uuid;

/// Execute the command described by `args`, returning the process exit code
pub fn execute_command(args: Args) -> Result<i32> {
    if let Err(validation_error) = args.validate() {
        // Validation errors are never quiet
        let output = super::OutputManager::new(false, false);
        output.error(
            &CliError::InvalidArguments {
                reason: validation_error,
            }
            .to_string(),
        );
        return Ok(1);
    }

    let config = RuntimeConfig::from(&args);

    let result = match &args.command {
        Command::Package { .. } => execute_package(&args, &config),
        Command::Clean { .. } => execute_clean(&args, &config),
        Command::Uuid { .. } => execute_uuid(&args, &config),
    };

    match result {
        Ok(()) => Ok(0),
        Err(e) => {
            config.error_println(&format!("Command '{}' failed: {}", args.command.name(), e));
            for suggestion in e.recovery_suggestions() {
                config.indent(&format!("• {suggestion}"));
            }
            Ok(1)
        }
    }
}

/// Apps selected by the APP argument.
///
/// `all` expands to every app directory in the workdir; no argument falls
/// back to `sdk_settings.ini`.
fn resolve_apps(app: Option<&str>, config: &RuntimeConfig) -> Result<Vec<String>> {
    match app {
        Some(ALL_APPS) => {
            config.verbose_println(&format!(
                "Scanning {} for app directories",
                config.workdir().display()
            ));
            Ok(metadata::discover_apps(config.workdir())?)
        }
        Some(name) => Ok(vec![name.to_string()]),
        None => {
            let sdk = SdkSettings::load(config.workdir())?;
            match sdk.app_name {
                Some(name) => {
                    config.verbose_println(&format!("Using app_name {name} from sdk_settings.ini"));
                    Ok(vec![name])
                }
                None => Err(CliError::MissingArgument {
                    argument: "APP".to_string(),
                }
                .into()),
            }
        }
    }
}
