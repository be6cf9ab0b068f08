//! Configuration for packaging runs.
//!
//! [`Settings`] is the single, immutable configuration value handed to the
//! packager; [`SettingsBuilder`] constructs it.

mod builder;
mod core;

pub use self::builder::SettingsBuilder;
pub use self::core::Settings;
