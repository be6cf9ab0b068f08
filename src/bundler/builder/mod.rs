//! Packaging pipeline.
//!
//! The [`Packager`] sequences the stages of a packaging run; each stage lives
//! in its own module:
//!
//! - [`checksum`] - SHA-256 of files and of whole app trees
//! - [`manifest`] - `MANIFEST.json` generation
//! - [`signing`] - `SIGNATURE.DS` creation and PEM key loading
//! - [`line_endings`] - carriage-return stripping for scripts
//! - [`archive`] - deterministic `.tar.gz` assembly
//! - [`orchestrator`] - the [`Packager`] itself

pub mod archive;
pub mod checksum;
pub mod line_endings;
pub mod manifest;
pub mod orchestrator;
pub mod signing;

pub use line_endings::Substitutions;
pub use manifest::{Manifest, ManifestBuilder};
pub use orchestrator::{PackagingStage, Packager, package_application};
pub use signing::SignatureToken;
