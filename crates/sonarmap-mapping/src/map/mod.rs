//! Map-related functionality for mapping.
//!
//! This module provides the occupancy grid and the point types used to
//! address it.

pub mod occupancy;
pub mod point_types;

pub use occupancy::{CellCounts, CellState, OccupancyGrid};
pub use point_types::{GridPoint, WorldPoint};
