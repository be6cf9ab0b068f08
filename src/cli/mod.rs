//! Command line interface for the NCOS app packager.
//!
//! This module provides argument parsing, command execution and colored user
//! feedback on top of the [`crate::bundler`] core.

mod args;
pub mod commands;
mod output;
mod sdk_settings;

pub use args::{ALL_APPS, Args, Command, RuntimeConfig};
pub use commands::execute_command;
pub use output::OutputManager;
pub use sdk_settings::{SDK_SETTINGS_FILE, SdkSettings};

use crate::error::Result;

/// Main CLI entry point
pub fn run() -> Result<i32> {
    let args = Args::parse_args();
    init_logging(&args);
    execute_command(args)
}

/// Starts `env_logger`; `RUST_LOG` wins over the verbosity flags.
fn init_logging(args: &Args) {
    let default_filter = if args.verbose {
        "debug"
    } else if args.quiet {
        "error"
    } else {
        "info"
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}
