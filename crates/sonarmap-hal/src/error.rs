//! This module defines the error types used by the `sonarmap-hal` crate.

#![warn(missing_docs)]

use std::path::PathBuf;

/// Error type for sensor and actuator operations.
#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    /// A sysfs attribute could not be read or written.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Attribute that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
    /// The device produced something that is not a number.
    #[error("Malformed reading from {path}: {value:?}")]
    MalformedReading {
        /// Attribute that was read.
        path: PathBuf,
        /// Raw contents.
        value: String,
    },
    /// A hardware configuration value is unusable.
    #[error("Invalid hardware configuration: {0}")]
    InvalidConfig(&'static str),
}

impl SensorError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SensorError::Io {
            path: path.into(),
            source,
        }
    }
}
