//! NCOS application packager.
//!
//! Turns an app directory into a device-installable `<app>.tar.gz`:
//!
//! 1. Clears stale `METADATA/` contents and Python bytecode artifacts
//! 2. Builds `METADATA/MANIFEST.json` from `package.ini` plus per-file SHA-256 hashes
//! 3. Writes `METADATA/SIGNATURE.DS` (an OpenSSL signature, or the bare digest when unsigned)
//! 4. Strips carriage returns from scripts and packs the tree into a gzip'd tar
//!
//! # Example
//!
//! ```no_run
//! use ncos_app_bundler::bundler::{Packager, SettingsBuilder};
//!
//! # fn example() -> ncos_app_bundler::bundler::Result<()> {
//! let settings = SettingsBuilder::new().output_directory("dist").build()?;
//! let artifacts = Packager::new(settings).package_application("apps/hello_world")?;
//!
//! for artifact in artifacts {
//!     println!("Created {} ({} bytes)", artifact.path.display(), artifact.size);
//!     println!("SHA256: {}", artifact.checksum);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod builder;
pub mod error;
mod settings;
pub(crate) mod utils;

pub use builder::{
    Manifest, ManifestBuilder, PackagingStage, Packager, SignatureToken, Substitutions,
    package_application,
};
pub use error::{Error, Result};
pub use settings::{Settings, SettingsBuilder};

/// Descriptor file expected in every app root.
pub const CONFIG_FILE: &str = "package.ini";

/// Folder inside the app root that receives the manifest and signature.
pub const METADATA_FOLDER: &str = "METADATA";

/// Manifest file name inside [`METADATA_FOLDER`].
pub const MANIFEST_FILE: &str = "MANIFEST.json";

/// Signature file name inside [`METADATA_FOLDER`].
pub const SIGNATURE_FILE: &str = "SIGNATURE.DS";

/// A packaged application archive.
///
/// Returned once per descriptor section after a successful packaging run.
#[derive(Debug, Clone)]
pub struct PackagedArtifact {
    /// App name (the `package.ini` section).
    pub name: String,

    /// Location of the `<name>.tar.gz` archive.
    pub path: std::path::PathBuf,

    /// Size of the archive in bytes.
    pub size: u64,

    /// SHA-256 checksum of the archive.
    pub checksum: String,
}
