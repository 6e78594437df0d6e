//! This module defines the error types used by the `sonarmap-mapping` crate.

#![warn(missing_docs)]

use sonarmap_hal::SensorError;
use sonarmap_kinematics::KinematicsError;

/// Error type for mapping operations.
///
/// Per-sample problems (invalid readings, cells off the grid) are not errors;
/// they are skipped and counted. What remains are configuration mistakes,
/// persistence failures and faults reported by the hardware.
#[derive(Debug, thiserror::Error)]
pub enum MappingError {
    /// A configuration value is unusable.
    #[error("Invalid mapper configuration: {0}")]
    InvalidConfig(&'static str),
    /// Grid dimensions are zero or too large.
    #[error("Invalid grid dimensions: {0}")]
    InvalidDimensions(&'static str),
    /// Reading or writing a map file failed.
    #[error("Map I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// A map byte stream is not a valid grid.
    #[error("Corrupt map data: {0}")]
    Corrupt(&'static str),
    /// A loaded map does not match the configured grid.
    #[error("Map is {found}x{found} cells but the mapper is configured for {expected}x{expected}")]
    DimensionMismatch {
        /// Configured side length.
        expected: usize,
        /// Side length found in the data.
        found: usize,
    },
    /// The pose could not be set up or updated.
    #[error(transparent)]
    Kinematics(#[from] KinematicsError),
    /// The ranging sensor or pan servo failed.
    #[error(transparent)]
    Sensor(#[from] SensorError),
}
