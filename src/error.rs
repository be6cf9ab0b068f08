//! Error types for the command line tool.
//!
//! Core packaging failures are [`crate::bundler::Error`]; this module wraps
//! them together with CLI argument problems.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for the binary
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// Packaging errors
    #[error("{0}")]
    Bundler(#[from] crate::bundler::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// No APP argument and no `[sdk] app_name` fallback
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },

    /// Some apps in a multi-app run failed
    #[error("{command} failed for: {}", apps.join(", "))]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Apps that failed
        apps: Vec<String>,
    },
}

impl BundlerError {
    /// Actionable hints for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            Self::Bundler(e) if e.is_config_validation() => {
                let mut hints = vec!["Check the app's package.ini".to_string()];
                if matches!(e.root_cause(), crate::bundler::Error::MissingUuid { .. }) {
                    hints.push("Run `ncos_app_bundler uuid <APP>` to assign one".to_string());
                }
                hints
            }
            Self::Bundler(crate::bundler::Error::Crypto(_)) => {
                vec!["Check the key file and --passphrase".to_string()]
            }
            Self::Cli(CliError::MissingArgument { .. }) => {
                vec!["Pass an APP argument or set app_name in sdk_settings.ini [sdk]".to_string()]
            }
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::Error;

    #[test]
    fn test_missing_uuid_suggests_uuid_command() {
        let err = BundlerError::from(Error::Context(
            "build manifest failed for myapp".into(),
            Box::new(Error::MissingUuid {
                section: "myapp".into(),
            }),
        ));
        let hints = err.recovery_suggestions();
        assert_eq!(hints.len(), 2);
        assert!(hints[1].contains("uuid"));
    }

    #[test]
    fn test_execution_failed_lists_apps() {
        let err = CliError::ExecutionFailed {
            command: "package".into(),
            apps: vec!["a".into(), "b".into()],
        };
        assert_eq!(err.to_string(), "package failed for: a, b");
    }
}
