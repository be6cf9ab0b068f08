//! NCOS application packaging library
//!
//! This library turns an NCOS SDK app directory into the `<app>.tar.gz`
//! bundle a device installs:
//! - `METADATA/MANIFEST.json` with app identity and per-file SHA-256 hashes
//! - `METADATA/SIGNATURE.DS` signed with an OpenSSL key, or the bare digest
//! - a deterministic gzip'd tarball with script line endings normalized
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;
pub mod metadata;

// Re-export commonly used types
pub use bundler::{PackagedArtifact, Packager, package_application};
pub use error::{BundlerError, CliError, Result};
