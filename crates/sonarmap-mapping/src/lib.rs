//! Occupancy mapping from swept ultrasonic range readings.
//!
//! A scan aims the sensor across a fan of bearings, keeps the readings that
//! came back in range, optionally fills the gaps between them, and ray-casts
//! each one from the robot's cell: cells along the ray become `Free`, the cell
//! at its end `Occupied`. Between scans the robot's pose is carried forward by
//! dead reckoning.
//!
//! [`MappingContext`] ties the pieces together; the individual stages are
//! usable on their own.

pub mod config;
pub mod context;
pub mod error;
pub mod interpolate;
pub mod map;
pub mod raycast;
pub mod sample;
pub mod session;
pub mod transform;

pub use config::{DropZonePolicy, MapperConfig, SweepConfig};
pub use context::{IntegrationStats, MappingContext, ScanSummary};
pub use error::MappingError;
pub use map::{CellCounts, CellState, GridPoint, OccupancyGrid, WorldPoint};
pub use sample::ScanSample;
pub use session::{ScanSession, SweepReadings};

pub use sonarmap_kinematics::{Localizer, Pose};
