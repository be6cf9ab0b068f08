//! Clean command implementation.
//!
//! Removes the archives, the app's METADATA folder and the SDK `.build`
//! marker. Removal failures are reported as warnings only.

use crate::bundler::{
    METADATA_FOLDER,
    builder::archive::{archive_name, tarball_name},
    utils::fs as fs_utils,
};
use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;

const BUILD_MARKER: &str = ".build";

/// Execute clean command
pub(super) fn execute_clean(args: &Args, config: &RuntimeConfig) -> Result<()> {
    let Command::Clean { app, output } = &args.command else {
        unreachable!("execute_clean called with non-Clean command");
    };

    let apps = super::resolve_apps(app.as_deref(), config)?;
    let output_dir = output.as_deref().unwrap_or(config.workdir());

    for app_name in &apps {
        config.progress(&format!("Cleaning {app_name}"));

        for file_name in [archive_name(app_name), tarball_name(app_name)] {
            let path = output_dir.join(file_name);
            match fs_utils::remove_file(&path) {
                Ok(true) => config.verbose_println(&format!("Deleted file: {}", path.display())),
                Ok(false) => {}
                Err(e) => config.warning_println(&format!("Clean error: {e}")),
            }
        }

        let metadata_dir = config.workdir().join(app_name).join(METADATA_FOLDER);
        match fs_utils::remove_dir_all(&metadata_dir) {
            Ok(true) => config.verbose_println(&format!("Deleted {}", metadata_dir.display())),
            Ok(false) => {}
            Err(e) => config.warning_println(&format!("Clean error: {e}")),
        }

        let build_marker = config.workdir().join(BUILD_MARKER);
        if let Err(e) = fs_utils::remove_file(&build_marker) {
            config.warning_println(&format!("Clean error: {e}"));
        }
    }

    config.success_println("Clean complete");
    Ok(())
}
