//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap, with validation of
//! app names and the runtime configuration derived from the arguments.

use crate::bundler::builder::signing::DEFAULT_KEY_PASSPHRASE;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// App name that selects every app directory in the workdir.
pub const ALL_APPS: &str = "all";

/// NCOS SDK app packager
#[derive(Parser, Debug)]
#[command(
    name = "ncos_app_bundler",
    version,
    about = "Packages NCOS SDK apps into signed tar.gz bundles",
    long_about = "Builds METADATA/MANIFEST.json and METADATA/SIGNATURE.DS for an NCOS app \
and packs the app directory into <app>.tar.gz.

Usage:
  ncos_app_bundler package hello_world
  ncos_app_bundler package hello_world --key dev_key.pem
  ncos_app_bundler package all --output dist
  ncos_app_bundler clean all
  ncos_app_bundler uuid hello_world

Without an APP argument the app_name from sdk_settings.ini [sdk] is used."
)]
pub struct Args {
    /// Command to execute
    #[command(subcommand)]
    pub command: Command,

    /// SDK directory holding the app directories and sdk_settings.ini
    #[arg(short = 'C', long, global = true, value_name = "DIR", default_value = ".")]
    pub workdir: PathBuf,

    /// Show debug output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create <app>.tar.gz with manifest and signature
    #[command(visible_alias = "build")]
    Package {
        /// App directory name, or "all"
        #[arg(value_name = "APP")]
        app: Option<String>,

        /// PEM private key used to sign the manifest
        #[arg(short, long, value_name = "PATH")]
        key: Option<PathBuf>,

        /// Passphrase for an encrypted private key
        #[arg(
            long,
            value_name = "PASSPHRASE",
            env = "NCOS_KEY_PASSPHRASE",
            default_value = DEFAULT_KEY_PASSPHRASE,
            hide_env_values = true
        )]
        passphrase: String,

        /// Directory that receives the archives (defaults to the workdir)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Remove archives and METADATA produced by packaging
    Clean {
        /// App directory name, or "all"
        #[arg(value_name = "APP")]
        app: Option<String>,

        /// Directory the archives were written to (defaults to the workdir)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },

    /// Assign a uuid to an app whose package.ini has an empty uuid key
    Uuid {
        /// App directory name
        #[arg(value_name = "APP")]
        app: Option<String>,
    },
}

impl Command {
    /// Command name for messages
    pub fn name(&self) -> &'static str {
        match self {
            Self::Package { .. } => "package",
            Self::Clean { .. } => "clean",
            Self::Uuid { .. } => "uuid",
        }
    }

    /// The APP argument, if given
    pub fn app(&self) -> Option<&str> {
        match self {
            Self::Package { app, .. } | Self::Clean { app, .. } | Self::Uuid { app } => {
                app.as_deref()
            }
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if let Some(app) = self.command.app() {
            if app.is_empty() {
                return Err("App name cannot be empty".to_string());
            }
            if app.contains(['/', '\\']) || app == "." || app == ".." {
                return Err(format!(
                    "Invalid app name: {app}. Pass the app directory name, not a path"
                ));
            }
        }

        if let Command::Uuid { app: Some(app) } = &self.command
            && app == ALL_APPS
        {
            return Err("uuid operates on a single app".to_string());
        }

        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
    workdir: PathBuf,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self {
            output: super::OutputManager::new(args.verbose, args.quiet),
            workdir: args.workdir.clone(),
        }
    }
}

impl RuntimeConfig {
    /// SDK working directory
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Print verbose message if in verbose mode
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message if not in quiet mode
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message if not in quiet mode
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print progress message
    pub fn progress(&self, message: &str) {
        let _ = self.output.progress(message);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_build_alias_and_defaults() {
        let args = parse(&["ncos_app_bundler", "build", "hello_world"]);
        match &args.command {
            Command::Package {
                app,
                key,
                passphrase,
                output,
            } => {
                assert_eq!(app.as_deref(), Some("hello_world"));
                assert!(key.is_none());
                assert!(output.is_none());
                // Env may override in CI shells
                if std::env::var_os("NCOS_KEY_PASSPHRASE").is_none() {
                    assert_eq!(passphrase, DEFAULT_KEY_PASSPHRASE);
                }
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert_eq!(args.workdir, PathBuf::from("."));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = parse(&["ncos_app_bundler", "clean", "all", "-C", "/sdk", "-v"]);
        assert_eq!(args.command.name(), "clean");
        assert_eq!(args.command.app(), Some(ALL_APPS));
        assert_eq!(args.workdir, PathBuf::from("/sdk"));
        assert!(args.verbose);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Args::try_parse_from(["ncos_app_bundler", "-v", "-q", "uuid"]).is_err());
    }

    #[test]
    fn test_validate_rejects_paths_and_uuid_all() {
        assert!(parse(&["ncos_app_bundler", "package", "apps/hello"]).validate().is_err());
        assert!(parse(&["ncos_app_bundler", "package", ".."]).validate().is_err());
        assert!(parse(&["ncos_app_bundler", "uuid", "all"]).validate().is_err());
        assert!(parse(&["ncos_app_bundler", "package", "all"]).validate().is_ok());
        assert!(parse(&["ncos_app_bundler", "uuid"]).validate().is_ok());
    }
}
