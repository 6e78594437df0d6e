//! Tunables of the mapper.

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::MappingError;

/// What to do with a valid reading that lies beyond the obstacle threshold.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropZonePolicy {
    /// Ignore the reading entirely; the grid is not touched.
    #[default]
    Drop,
    /// Mark the cells along the ray free, but no obstacle at its end.
    FreeSpace,
}

/// Bearing range swept by the pan servo, inclusive at both ends.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepConfig {
    /// First bearing (deg).
    pub min_deg: i32,
    /// Last bearing (deg). Reached only if `max_deg - min_deg` is a multiple of the step.
    pub max_deg: i32,
    /// Spacing between readings (deg).
    pub step_deg: i32,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            min_deg: -90,
            max_deg: 90,
            step_deg: 15,
        }
    }
}

impl SweepConfig {
    /// Bearings visited by one sweep, in order.
    pub fn bearings(&self) -> impl Iterator<Item = i32> + use<> {
        // validate() guarantees a positive step
        let step = self.step_deg.max(1) as usize;
        (self.min_deg..=self.max_deg).step_by(step)
    }
}

/// Mapper configuration.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq)]
pub struct MapperConfig {
    /// Side length of the square grid, in cells of 1 cm.
    pub grid_size: usize,
    /// Readings at or beyond this distance are invalid (cm).
    pub max_range_cm: f64,
    /// Only readings at or below this distance mark an obstacle (cm).
    pub obstacle_threshold_cm: f64,
    /// Sweep geometry.
    pub sweep: SweepConfig,
    /// Wait after each pan command before reading (ms).
    pub settle_delay_ms: u64,
    /// Densify sweeps before mapping them.
    pub interpolate: bool,
    /// Handling of readings between the threshold and the maximum range.
    pub drop_zone: DropZonePolicy,
}

impl Default for MapperConfig {
    fn default() -> Self {
        MapperConfig {
            grid_size: 100,
            max_range_cm: 100.0,
            obstacle_threshold_cm: 80.0,
            sweep: SweepConfig::default(),
            settle_delay_ms: 100,
            interpolate: true,
            drop_zone: DropZonePolicy::Drop,
        }
    }
}

impl MapperConfig {
    /// Checks that the configuration describes a usable mapper.
    ///
    /// # Errors
    /// * `MappingError::InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<(), MappingError> {
        if self.grid_size == 0 {
            return Err(MappingError::InvalidConfig("grid_size must be non-zero"));
        }
        if !(self.max_range_cm.is_finite() && self.max_range_cm > 0.0) {
            return Err(MappingError::InvalidConfig("max_range_cm must be a positive number"));
        }
        if !(self.obstacle_threshold_cm.is_finite() && self.obstacle_threshold_cm > 0.0) {
            return Err(MappingError::InvalidConfig("obstacle_threshold_cm must be a positive number"));
        }
        if self.sweep.step_deg <= 0 {
            return Err(MappingError::InvalidConfig("sweep.step_deg must be positive"));
        }
        if self.sweep.min_deg > self.sweep.max_deg {
            return Err(MappingError::InvalidConfig("sweep.min_deg must not exceed sweep.max_deg"));
        }
        Ok(())
    }

    /// Settle delay as a [`Duration`].
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}
