//! Tri-state occupancy grid.
//!
//! The grid is square, one cell per centimeter, and stores for every cell
//! whether it has never been observed, has been seen clear, or has been seen
//! blocked. Updates are monotone in certainty: once a cell is `Occupied`
//! nothing but an explicit [`OccupancyGrid::reset`] takes it back.

#![warn(missing_docs)]

use std::fmt;
use std::fs;
use std::path::Path;

use tracing::{debug, info};

use super::GridPoint;
use crate::error::MappingError;

/// Leading bytes of a serialized grid.
pub const MAP_MAGIC: [u8; 4] = *b"SMAP";
/// Magic plus `u32` width plus `u32` height.
pub const MAP_HEADER_LEN: usize = 12;

/// Observed state of one grid cell.
#[repr(i8)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellState {
    /// Never observed.
    #[default]
    Unknown = -1,
    /// Observed clear.
    Free = 0,
    /// Observed obstacle.
    Occupied = 1,
}

impl CellState {
    /// Converts the CellState to its persisted byte value.
    pub fn as_i8(self) -> i8 {
        self as i8
    }

    /// Creates a CellState from a persisted byte value.
    pub fn from_i8(value: i8) -> Option<Self> {
        match value {
            -1 => Some(CellState::Unknown),
            0 => Some(CellState::Free),
            1 => Some(CellState::Occupied),
            _ => None,
        }
    }

    /// Position in the certainty order `Unknown < Free < Occupied`.
    fn certainty(self) -> u8 {
        match self {
            CellState::Unknown => 0,
            CellState::Free => 1,
            CellState::Occupied => 2,
        }
    }

    /// Character used when rendering the grid as text.
    pub fn symbol(self) -> char {
        match self {
            CellState::Unknown => '?',
            CellState::Free => '.',
            CellState::Occupied => '1',
        }
    }
}

impl fmt::Display for CellState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellState::Unknown => write!(f, "Unknown"),
            CellState::Free => write!(f, "Free"),
            CellState::Occupied => write!(f, "Occupied"),
        }
    }
}

/// Number of cells in each state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellCounts {
    /// Cells never observed.
    pub unknown: usize,
    /// Cells observed clear.
    pub free: usize,
    /// Cells observed blocked.
    pub occupied: usize,
}

/// A square grid of [`CellState`]s, indexed `(x, y)` with `y` as the row.
#[derive(Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OccupancyGrid {
    /// Side length in cells
    size: usize,
    /// Row-major cell states
    data: Vec<CellState>,
}

impl OccupancyGrid {
    /// Creates a new all-`Unknown` grid of `size` x `size` cells.
    ///
    /// # Errors
    /// * `MappingError::InvalidDimensions` if `size` is zero or the grid would
    ///   not fit the persisted header.
    pub fn new(size: usize) -> Result<Self, MappingError> {
        if size == 0 {
            return Err(MappingError::InvalidDimensions("Grid size must be non-zero"));
        }
        if u32::try_from(size).is_err() {
            return Err(MappingError::InvalidDimensions("Grid size does not fit in 32 bits"));
        }
        let cells = size
            .checked_mul(size)
            .ok_or(MappingError::InvalidDimensions("Grid dimensions too large, would cause overflow"))?;

        Ok(OccupancyGrid {
            size,
            data: vec![CellState::Unknown; cells],
        })
    }

    /// Side length of the grid in cells.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether `p` lies on the grid.
    pub fn contains(&self, p: GridPoint) -> bool {
        p.x < self.size && p.y < self.size
    }

    fn get_index(&self, p: GridPoint) -> usize {
        p.y * self.size + p.x
    }

    /// State of the cell at `p`.
    ///
    /// # Panics
    /// If `p` is off the grid. Callers bounds-check first (see
    /// [`crate::transform::to_cell`]).
    pub fn get(&self, p: GridPoint) -> CellState {
        assert!(self.contains(p), "grid read at {} outside {}x{} grid", p, self.size, self.size);
        self.data[self.get_index(p)]
    }

    /// State of the cell at `p`, or `None` if `p` is off the grid.
    pub fn try_get(&self, p: GridPoint) -> Option<CellState> {
        self.contains(p).then(|| self.data[self.get_index(p)])
    }

    /// Moves the cell at `p` towards `state` if that raises its certainty.
    ///
    /// Downgrades (`Occupied -> Free`, anything `-> Unknown`) are ignored.
    /// Returns whether the cell changed.
    ///
    /// # Panics
    /// If `p` is off the grid.
    pub fn set(&mut self, p: GridPoint, state: CellState) -> bool {
        assert!(self.contains(p), "grid write at {} outside {}x{} grid", p, self.size, self.size);
        let index = self.get_index(p);
        let current = self.data[index];
        if state.certainty() > current.certainty() {
            self.data[index] = state;
            true
        } else {
            false
        }
    }

    /// Returns every cell to `Unknown`.
    pub fn reset(&mut self) {
        self.data.fill(CellState::Unknown);
    }

    /// Immutable copy of the current grid.
    pub fn snapshot(&self) -> OccupancyGrid {
        self.clone()
    }

    /// Row-major view of all cells.
    pub fn cells(&self) -> &[CellState] {
        &self.data
    }

    /// Tally of cells per state.
    pub fn counts(&self) -> CellCounts {
        self.data.iter().fold(CellCounts::default(), |mut acc, cell| {
            match cell {
                CellState::Unknown => acc.unknown += 1,
                CellState::Free => acc.free += 1,
                CellState::Occupied => acc.occupied += 1,
            }
            acc
        })
    }

    /// Serializes the grid: magic, `u32` LE width, `u32` LE height, then one
    /// signed byte per cell (`-1` unknown, `0` free, `1` occupied), row-major.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(MAP_HEADER_LEN + self.data.len());
        bytes.extend_from_slice(&MAP_MAGIC);
        // size was checked against u32 at construction
        let side = (self.size as u32).to_le_bytes();
        bytes.extend_from_slice(&side);
        bytes.extend_from_slice(&side);
        bytes.extend(self.data.iter().map(|cell| cell.as_i8() as u8));
        bytes
    }

    /// Parses bytes produced by [`OccupancyGrid::to_bytes`].
    ///
    /// # Errors
    /// * `MappingError::Corrupt` on a bad header, a non-square grid, a length
    ///   mismatch or an unknown cell value.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MappingError> {
        if bytes.len() < MAP_HEADER_LEN {
            return Err(MappingError::Corrupt("Truncated header"));
        }
        if bytes[0..4] != MAP_MAGIC {
            return Err(MappingError::Corrupt("Missing map magic"));
        }
        let width = read_u32_le(&bytes[4..8]) as usize;
        let height = read_u32_le(&bytes[8..12]) as usize;
        if width != height {
            return Err(MappingError::Corrupt("Grid is not square"));
        }

        // the header is untrusted; check it against the payload before allocating
        let payload = &bytes[MAP_HEADER_LEN..];
        let cells = width
            .checked_mul(height)
            .ok_or(MappingError::Corrupt("Grid dimensions in header overflow"))?;
        if payload.len() != cells {
            return Err(MappingError::Corrupt("Cell data length does not match header"));
        }

        let mut grid = OccupancyGrid::new(width).map_err(|_| MappingError::Corrupt("Invalid grid size in header"))?;
        for (cell, byte) in grid.data.iter_mut().zip(payload) {
            *cell = CellState::from_i8(*byte as i8).ok_or(MappingError::Corrupt("Unknown cell value"))?;
        }
        Ok(grid)
    }

    /// Writes the serialized grid to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), MappingError> {
        let path = path.as_ref();
        fs::write(path, self.to_bytes())?;
        info!(path = %path.display(), size = self.size, "map saved");
        Ok(())
    }

    /// Reads a grid previously written by [`OccupancyGrid::save`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, MappingError> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let grid = OccupancyGrid::from_bytes(&bytes)?;
        debug!(path = %path.display(), size = grid.size, "map read");
        Ok(grid)
    }
}

fn read_u32_le(bytes: &[u8]) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(bytes);
    u32::from_le_bytes(raw)
}

impl fmt::Debug for OccupancyGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OccupancyGrid")
            .field("size", &self.size)
            .field("counts", &self.counts())
            .finish()
    }
}

impl fmt::Display for OccupancyGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "OccupancyGrid ({}x{}, 1 cm/cell)", self.size, self.size)?;
        for row in self.data.chunks(self.size) {
            for cell in row {
                write!(f, "{}", cell.symbol())?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
