//! Polar range readings to grid cells.
//!
//! Bearings are measured from the robot's forward direction with positive
//! values to the right (clockwise). Headings follow the usual
//! counter-clockwise convention, so the absolute direction of a reading is
//! `heading - bearing`.

use sonarmap_kinematics::Pose;

use crate::map::{GridPoint, WorldPoint};

/// Projects a reading onto the grid plane without snapping to a cell.
pub fn project(bearing_deg: f64, distance_cm: f64, pose: &Pose) -> WorldPoint {
    let absolute_rad = (pose.heading_deg - bearing_deg).to_radians();
    WorldPoint::new(
        pose.x as f64 + distance_cm * absolute_rad.cos(),
        pose.y as f64 + distance_cm * absolute_rad.sin(),
    )
}

/// Cell hit by a reading taken from `pose`, or `None` if it falls off a
/// `grid_size` x `grid_size` grid.
///
/// Coordinates are rounded to the nearest cell, ties to even.
pub fn to_cell(bearing_deg: f64, distance_cm: f64, pose: &Pose, grid_size: usize) -> Option<GridPoint> {
    world_to_cell(project(bearing_deg, distance_cm, pose), grid_size)
}

/// Snaps a point to its nearest cell, or `None` if that cell is off the grid.
pub fn world_to_cell(p: WorldPoint, grid_size: usize) -> Option<GridPoint> {
    let x = p.x.round_ties_even();
    let y = p.y.round_ties_even();
    let limit = grid_size as f64;
    // NaN fails every comparison and is rejected here too
    if x >= 0.0 && x < limit && y >= 0.0 && y < limit {
        Some(GridPoint::new(x as usize, y as usize))
    } else {
        None
    }
}
