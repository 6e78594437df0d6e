//! Bresenham ray casting for occupancy grid updates.
//!
//! A reading tells us two things: the cell where the echo came from is
//! blocked, and every cell the pulse crossed on the way there is clear.
//!
//! ```text
//! From (0,0) to (7,3):
//!
//!     3 │             ○ ●     ● hit, marked Occupied
//!     2 │         ○ ○         ○ traversed, marked Free
//!     1 │     ○ ○
//!     0 │ ○ ○
//!       └────────────────
//!         0 1 2 3 4 5 6 7
//! ```

use tracing::trace;

use crate::map::{CellState, GridPoint, OccupancyGrid};

/// Cells crossed by the integer line from `start` towards `end`.
///
/// Yields `start` first and stops before `end`; a line whose endpoints
/// coincide yields nothing.
#[derive(Debug, Clone)]
pub struct BresenhamLine {
    x: i64,
    y: i64,
    end_x: i64,
    end_y: i64,
    dx: i64,
    dy: i64,
    sx: i64,
    sy: i64,
    err: i64,
}

impl BresenhamLine {
    /// Creates a new line iterator from `start` to `end`.
    pub fn new(start: GridPoint, end: GridPoint) -> Self {
        let (x, y) = (start.x as i64, start.y as i64);
        let (end_x, end_y) = (end.x as i64, end.y as i64);
        let dx = (end_x - x).abs();
        let dy = (end_y - y).abs();
        Self {
            x,
            y,
            end_x,
            end_y,
            dx,
            dy,
            sx: if x < end_x { 1 } else { -1 },
            sy: if y < end_y { 1 } else { -1 },
            err: dx - dy,
        }
    }
}

impl Iterator for BresenhamLine {
    type Item = GridPoint;

    fn next(&mut self) -> Option<GridPoint> {
        if self.x == self.end_x && self.y == self.end_y {
            return None;
        }
        // both endpoints are non-negative and the walk never leaves their bounding box
        let current = GridPoint::new(self.x as usize, self.y as usize);

        let e2 = 2 * self.err;
        if e2 > -self.dy {
            self.err -= self.dy;
            self.x += self.sx;
        }
        if e2 < self.dx {
            self.err += self.dx;
            self.y += self.sy;
        }

        Some(current)
    }
}

/// Marks every cell from `origin` up to (not including) `hit` as free.
///
/// Cells already occupied stay occupied. Returns how many cells changed.
pub fn mark_free(grid: &mut OccupancyGrid, origin: GridPoint, hit: GridPoint) -> usize {
    BresenhamLine::new(origin, hit)
        .filter(|cell| grid.set(*cell, CellState::Free))
        .count()
}

/// Applies one echo: clears the ray from `origin` to `hit` and marks `hit`
/// occupied.
///
/// Returns `true` only when `hit` was not occupied before, so re-observing a
/// known obstacle does not count as a new one.
///
/// # Panics
/// If either cell is off the grid.
pub fn update_from_hit(grid: &mut OccupancyGrid, origin: GridPoint, hit: GridPoint) -> bool {
    let freed = mark_free(grid, origin, hit);
    let new_obstacle = grid.set(hit, CellState::Occupied);
    trace!(%origin, %hit, freed, new_obstacle, "ray cast");
    new_obstacle
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(a: (usize, usize), b: (usize, usize)) -> Vec<(usize, usize)> {
        BresenhamLine::new(GridPoint::new(a.0, a.1), GridPoint::new(b.0, b.1))
            .map(|p| (p.x, p.y))
            .collect()
    }

    #[test]
    fn test_line_shallow() {
        assert_eq!(
            line((0, 0), (7, 3)),
            vec![(0, 0), (1, 0), (2, 1), (3, 1), (4, 2), (5, 2), (6, 3)]
        );
    }

    #[test]
    fn test_line_vertical_and_reverse() {
        assert_eq!(line((5, 5), (5, 8)), vec![(5, 5), (5, 6), (5, 7)]);
        assert_eq!(line((5, 8), (5, 5)), vec![(5, 8), (5, 7), (5, 6)]);
        assert_eq!(line((3, 2), (0, 2)), vec![(3, 2), (2, 2), (1, 2)]);
    }

    #[test]
    fn test_line_diagonal() {
        assert_eq!(line((0, 3), (3, 0)), vec![(0, 3), (1, 2), (2, 1)]);
    }

    #[test]
    fn test_line_degenerate() {
        assert!(line((4, 4), (4, 4)).is_empty());
    }

    #[test]
    fn test_update_from_hit_straight_up() {
        let mut grid = OccupancyGrid::new(100).unwrap();
        let origin = GridPoint::new(50, 50);
        let hit = GridPoint::new(50, 60);

        assert!(update_from_hit(&mut grid, origin, hit));
        for y in 50..60 {
            assert_eq!(grid.get(GridPoint::new(50, y)), CellState::Free, "y = {}", y);
        }
        assert_eq!(grid.get(hit), CellState::Occupied);
        assert_eq!(grid.counts().free, 10);
        assert_eq!(grid.counts().occupied, 1);

        let before = grid.snapshot();
        assert!(!update_from_hit(&mut grid, origin, hit));
        assert_eq!(grid, before);
    }

    #[test]
    fn test_rays_do_not_clear_obstacles() {
        let mut grid = OccupancyGrid::new(20).unwrap();
        let obstacle = GridPoint::new(5, 10);
        grid.set(obstacle, CellState::Occupied);

        update_from_hit(&mut grid, GridPoint::new(0, 10), GridPoint::new(9, 10));
        assert_eq!(grid.get(obstacle), CellState::Occupied);
        assert_eq!(grid.get(GridPoint::new(4, 10)), CellState::Free);
        assert_eq!(grid.get(GridPoint::new(6, 10)), CellState::Free);
    }

    #[test]
    fn test_hit_on_robot_cell() {
        let mut grid = OccupancyGrid::new(10).unwrap();
        let p = GridPoint::new(5, 5);
        assert!(update_from_hit(&mut grid, p, p));
        assert_eq!(grid.counts().free, 0);
        assert_eq!(grid.get(p), CellState::Occupied);
    }

    #[test]
    fn test_mark_free_only() {
        let mut grid = OccupancyGrid::new(10).unwrap();
        let changed = mark_free(&mut grid, GridPoint::new(0, 0), GridPoint::new(4, 0));
        assert_eq!(changed, 4);
        assert_eq!(grid.get(GridPoint::new(4, 0)), CellState::Unknown);
        assert_eq!(mark_free(&mut grid, GridPoint::new(0, 0), GridPoint::new(4, 0)), 0);
    }
}
