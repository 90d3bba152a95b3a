//! # Studio Error Types
//!
//! Generation itself is total: noise and random inputs never fail and
//! spatial lookups degrade to "no neighbor". The only fallible boundary is
//! loading a configuration file.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while configuring the studio generator.
#[derive(Error, Debug)]
pub enum StudioError {
    /// Reading the configuration file failed.
    #[error("failed to read config {path}: {source}")]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for `StudioConfig`.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A configuration value cannot be interpreted even after clamping.
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Name of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Result type for studio configuration operations.
pub type StudioResult<T> = Result<T, StudioError>;
