//! Uuid command implementation.

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;
use crate::metadata::{self, UuidStatus};

/// Execute uuid command
pub(super) fn execute_uuid(args: &Args, config: &RuntimeConfig) -> Result<()> {
    let Command::Uuid { app } = &args.command else {
        unreachable!("execute_uuid called with non-Uuid command");
    };

    for app_name in super::resolve_apps(app.as_deref(), config)? {
        let app_root = config.workdir().join(&app_name);
        match metadata::ensure_uuid(&app_root, &app_name)? {
            UuidStatus::Existing(uuid) => {
                config.println(&format!("{app_name} uuid: {uuid}"));
            }
            UuidStatus::Created(uuid) => {
                config.success_println(&format!("Saved new uuid {uuid} for {app_name}"));
            }
        }
    }

    Ok(())
}
