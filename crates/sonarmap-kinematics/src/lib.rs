#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]
#![doc = "A `no_std` library for grid-cell dead reckoning."]
#![doc = ""]
#![doc = "This crate provides the robot pose expressed in occupancy-grid cells and a"]
#![doc = "localizer that integrates commanded rotations and forward moves into it."]

use core::fmt;
use libm::{cos, fmod, rint, sin};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod error;
pub use error::KinematicsError;

/// A grid pose `(x, y, heading)` in cells and degrees (heading measured
/// counter‑clockwise from the grid's +x axis).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pose {
    /// Column of the cell the robot occupies.
    pub x: usize,
    /// Row of the cell the robot occupies.
    pub y: usize,
    /// Heading (deg), normalized to `[0, 360)`.
    pub heading_deg: f64,
}

impl Pose {
    /// Construct a new pose.
    ///
    /// # Arguments
    ///
    /// * `x`: Grid column.
    /// * `y`: Grid row.
    /// * `heading_deg`: Heading in degrees. Normalized to `[0, 360)`.
    pub fn new(x: usize, y: usize, heading_deg: f64) -> Self {
        Pose {
            x,
            y,
            heading_deg: Pose::normalize_heading(heading_deg),
        }
    }

    /// Normalize a heading to be within `[0, 360)` degrees.
    ///
    /// # Arguments
    ///
    /// * `heading_deg`: The heading in degrees to normalize.
    ///
    /// # Returns
    ///
    /// The normalized heading in degrees.
    pub fn normalize_heading(heading_deg: f64) -> f64 {
        let h = fmod(heading_deg, 360.0);
        let h = if h < 0.0 { h + 360.0 } else { h };
        // -0.0, and tiny negatives that round up to exactly 360
        if h == 0.0 || h >= 360.0 { 0.0 } else { h }
    }

    /// Heading in radians.
    pub fn heading_rad(&self) -> f64 {
        self.heading_deg.to_radians()
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(x: {}, y: {}, θ: {:.1}°)", self.x, self.y, self.heading_deg)
    }
}

/// Open-loop dead reckoning on a square grid.
///
/// The localizer owns the robot pose. Every motion command is applied as a
/// rotation followed by a straight move along the new heading; the resulting
/// cell is clamped to the grid. There is no correction from sensor feedback,
/// so drift accumulates.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Localizer {
    /// Side length of the grid in cells.
    grid_size: usize,
    /// Current pose estimate.
    pose: Pose,
}

impl Localizer {
    /// Construct a localizer with the robot at the grid centre, heading 0°.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidGridSize)` if `grid_size` is zero.
    pub fn new(grid_size: usize) -> Result<Self, KinematicsError> {
        if grid_size == 0 {
            return Err(KinematicsError::InvalidGridSize("must be non-zero"));
        }
        Ok(Localizer {
            grid_size,
            pose: Pose::new(grid_size / 2, grid_size / 2, 0.0),
        })
    }

    /// Construct a localizer starting from an explicit pose.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::InvalidGridSize)` if `grid_size` is zero.
    /// Returns `Err(KinematicsError::PoseOutOfBounds)` if the pose cell is not on the grid.
    pub fn with_pose(grid_size: usize, pose: Pose) -> Result<Self, KinematicsError> {
        let mut localizer = Localizer::new(grid_size)?;
        if pose.x >= grid_size || pose.y >= grid_size {
            return Err(KinematicsError::PoseOutOfBounds("starting cell must lie on the grid"));
        }
        localizer.pose = Pose::new(pose.x, pose.y, pose.heading_deg);
        Ok(localizer)
    }

    /// Returns the current pose.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Returns the grid side length the pose is clamped to.
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Integrates one motion command into the pose.
    ///
    /// The heading is updated first (`(heading + delta) mod 360`); then, only
    /// if `distance_cm` is positive, the robot moves along the new heading by
    /// the rounded cartesian offset. Each axis is clamped to `[0, N-1]`.
    ///
    /// # Arguments
    ///
    /// * `distance_cm`: Forward distance in centimeters (one cell per cm).
    /// * `delta_heading_deg`: Heading change in degrees.
    ///
    /// # Errors
    ///
    /// Returns `Err(KinematicsError::NonFiniteMotion)` if either argument is NaN or infinite.
    /// The pose is left unchanged in that case.
    ///
    /// # Returns
    ///
    /// The updated pose.
    pub fn advance(&mut self, distance_cm: f64, delta_heading_deg: f64) -> Result<Pose, KinematicsError> {
        if !distance_cm.is_finite() || !delta_heading_deg.is_finite() {
            return Err(KinematicsError::NonFiniteMotion("distance and heading change must be finite"));
        }

        self.pose.heading_deg = Pose::normalize_heading(self.pose.heading_deg + delta_heading_deg);

        if distance_cm > 0.0 {
            let heading_rad = self.pose.heading_rad();
            // rint rounds ties to even
            let dx = rint(distance_cm * cos(heading_rad)) as i64;
            let dy = rint(distance_cm * sin(heading_rad)) as i64;
            // the `as` casts saturate for huge distances; keep the sum from overflowing too
            self.pose.x = self.clamp_axis((self.pose.x as i64).saturating_add(dx));
            self.pose.y = self.clamp_axis((self.pose.y as i64).saturating_add(dy));
        }

        Ok(self.pose)
    }

    fn clamp_axis(&self, value: i64) -> usize {
        value.clamp(0, self.grid_size as i64 - 1) as usize
    }
}

impl fmt::Display for Localizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Localizer ({}x{} grid, pose: {})", self.grid_size, self.grid_size, self.pose)
    }
}
