#![warn(missing_docs)]

//! Error types for the kinematics library.
//!
//! This module defines error types that can occur while setting up or
//! updating the dead-reckoning state.

use core::fmt;

/// Errors that can occur in kinematic calculations.
#[derive(Debug, Clone, PartialEq)]
pub enum KinematicsError {
    /// Error for an invalid grid size.
    /// This variant is returned when the grid the pose lives on has no cells.
    InvalidGridSize(&'static str),
    /// Error for a pose outside the grid.
    /// This variant is returned when a starting pose does not fit the grid.
    PoseOutOfBounds(&'static str),
    /// Error for a non-finite motion command.
    /// This variant is returned when a distance or heading change is NaN or infinite.
    NonFiniteMotion(&'static str),
}

impl fmt::Display for KinematicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KinematicsError::InvalidGridSize(msg) => write!(f, "Invalid grid size: {}", msg),
            KinematicsError::PoseOutOfBounds(msg) => write!(f, "Pose out of bounds: {}", msg),
            KinematicsError::NonFiniteMotion(msg) => write!(f, "Non-finite motion: {}", msg),
        }
    }
}

impl core::error::Error for KinematicsError {}
