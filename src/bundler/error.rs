//! Error types for packaging operations.
//!
//! Provides contextual error chaining, filesystem errors that always carry the
//! offending path, and the descriptor validation errors raised while reading
//! `package.ini`.
//!
//! # Features
//!
//! - **Context trait**: Add context to errors similar to anyhow
//! - **ErrorExt trait**: Filesystem operations with automatic path context
//! - **bail! macro**: Early return with formatted error messages
//!
//! # Example
//!
//! ```no_run
//! use ncos_app_bundler::bundler::error::{ErrorExt, Result};
//! use std::path::Path;
//!
//! fn read_descriptor(path: &Path) -> Result<String> {
//!     std::fs::read_to_string(path).fs_context("reading app descriptor", path)
//! }
//! ```

use std::{
    fmt::Display,
    io,
    path::{self, PathBuf},
};
use thiserror::Error as DeriveError;

/// Errors returned by the packaging core.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// Error with context. Created by the [`Context`] trait.
    #[error("{0}: {1}")]
    Context(String, Box<Self>),

    /// File system error with path context.
    ///
    /// Created by the [`ErrorExt`] trait's `fs_context` method.
    #[error("{context} {path}: {error}")]
    Fs {
        /// Context describing the operation (e.g., "hashing file")
        context: &'static str,
        /// Path that was being accessed
        path: PathBuf,
        /// The underlying I/O error
        error: io::Error,
    },

    /// Generic I/O error.
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// Error walking the app tree.
    #[error("{0}")]
    WalkdirError(#[from] walkdir::Error),

    /// Path prefix stripping error.
    #[error("{0}")]
    StripError(#[from] path::StripPrefixError),

    /// File name that cannot be stored in the manifest or archive.
    #[error("file name is not valid UTF-8: {}", path.display())]
    NonUtf8Path {
        /// Path relative to the app root
        path: PathBuf,
    },

    /// JSON serialization/deserialization error (manifest).
    #[error("{0}")]
    JsonError(#[from] serde_json::error::Error),

    /// Malformed `package.ini` or `sdk_settings.ini`.
    #[error("failed to parse {path}: {message}")]
    IniParse {
        /// File being parsed
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// Key loading or signing failure.
    #[error("crypto error: {0}")]
    Crypto(#[from] openssl::error::ErrorStack),

    /// `package.ini` is missing from the app root.
    #[error("no package.ini found at {path}")]
    MissingDescriptor {
        /// Expected descriptor location
        path: PathBuf,
    },

    /// `package.ini` holds no app section.
    #[error("{path} does not contain any app section")]
    NoSections {
        /// Descriptor location
        path: PathBuf,
    },

    /// Section name differs from the app root directory name.
    #[error("app section [{section}] does not match app directory '{directory}'")]
    ConfigMismatch {
        /// Section name from `package.ini`
        section: String,
        /// Base name of the app root
        directory: String,
    },

    /// Required descriptor key is absent.
    #[error("[{section}] is missing required key '{field}'")]
    MissingField {
        /// Section name
        section: String,
        /// Missing key
        field: &'static str,
    },

    /// Descriptor key has a value of the wrong shape.
    #[error("[{section}] key '{field}' has invalid value '{value}'")]
    InvalidValue {
        /// Section name
        section: String,
        /// Offending key
        field: &'static str,
        /// Raw value from the descriptor
        value: String,
    },

    /// A signed package needs a pre-assigned uuid.
    #[error("[{section}] has no uuid; signed packages require a uuid in package.ini")]
    MissingUuid {
        /// Section name
        section: String,
    },

    /// Generic error with custom message.
    #[error("{0}")]
    GenericError(String),
}

impl Error {
    /// Returns true for descriptor validation failures.
    ///
    /// Looks through [`Error::Context`] wrappers added by the orchestrator.
    pub fn is_config_validation(&self) -> bool {
        match self {
            Self::Context(_, inner) => inner.is_config_validation(),
            Self::ConfigMismatch { .. }
            | Self::MissingField { .. }
            | Self::InvalidValue { .. }
            | Self::MissingUuid { .. }
            | Self::MissingDescriptor { .. }
            | Self::NoSections { .. }
            | Self::IniParse { .. } => true,
            _ => false,
        }
    }

    /// Returns the innermost error, skipping [`Error::Context`] wrappers.
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Context(_, inner) => inner.root_cause(),
            other => other,
        }
    }
}

/// Convenient type alias for Result.
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for adding context to errors.
///
/// Similar to `anyhow::Context` but integrated with the bundler's Error type.
pub trait Context<T> {
    /// Add context to an error.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Add context to an error using a closure (lazy evaluation).
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::Context(context.to_string(), Box::new(e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::Context(f().to_string(), Box::new(e)))
    }
}

/// Extension trait for filesystem operations with automatic path context.
///
/// Wraps I/O errors with the path that caused them.
pub trait ErrorExt<T> {
    /// Add filesystem context to an I/O error.
    ///
    /// The `context` should be a present-tense verb phrase describing the operation,
    /// e.g., "reading file", "creating directory", "hashing file".
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, std::io::Error> {
    fn fs_context(self, context: &'static str, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.into(),
            error,
        })
    }
}

/// Macro for early return with error.
///
/// Converts the message into a [`Error::GenericError`] and returns immediately.
///
/// # Examples
///
/// ```ignore
/// bail!("operation failed");
/// bail!("invalid value: {}", value);
/// ```
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::error::Error::GenericError($msg.into()))
    };
    ($err:expr $(,)?) => {
        return Err($crate::bundler::error::Error::GenericError($err.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::bundler::error::Error::GenericError(format!($fmt, $($arg)*)))
    };
}
