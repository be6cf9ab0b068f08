//! NCOS app packager - builds signed `<app>.tar.gz` bundles for NCOS devices.
//!
//! This binary packages SDK app directories into device-installable archives
//! with a hashed manifest and signature.

use ncos_app_bundler::cli;
use std::process;

fn main() {
    // Run CLI and get exit code
    let exit_code = match cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    process::exit(exit_code);
}
