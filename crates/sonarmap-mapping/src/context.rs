//! The mapper: grid, pose and the pipeline that joins them.

use std::fmt::{self, Write as _};
use std::path::Path;

use sonarmap_hal::{PanServo, RangeSensor};
use sonarmap_kinematics::{Localizer, Pose};
use tracing::{debug, info, warn};

use crate::config::{DropZonePolicy, MapperConfig};
use crate::error::MappingError;
use crate::interpolate::interpolate;
use crate::map::{CellCounts, GridPoint, OccupancyGrid};
use crate::raycast::{mark_free, update_from_hit};
use crate::sample::ScanSample;
use crate::session::{ScanSession, SweepReadings};
use crate::transform::to_cell;

/// Outcome of feeding a batch of samples into the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntegrationStats {
    /// Samples rejected as no-echo or beyond the maximum range.
    pub invalid: usize,
    /// Valid samples beyond the obstacle threshold.
    pub beyond_threshold: usize,
    /// Samples whose cell fell off the grid.
    pub out_of_bounds: usize,
    /// Samples ray-cast into the grid.
    pub rasterized: usize,
    /// Cells that became `Occupied`.
    pub new_obstacles: usize,
}

/// Outcome of one full scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanSummary {
    /// Readings accepted by the sweep.
    pub raw_samples: usize,
    /// Readings discarded by the sweep.
    pub rejected: usize,
    /// Samples fed to the grid after interpolation.
    pub mapped_samples: usize,
    /// What the grid made of them.
    pub stats: IntegrationStats,
}

impl ScanSummary {
    /// Cells newly marked as obstacles by this scan.
    pub fn new_obstacles(&self) -> usize {
        self.stats.new_obstacles
    }
}

impl fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} readings ({} rejected), {} mapped, {} off grid, {} beyond threshold, {} new obstacles",
            self.raw_samples,
            self.rejected,
            self.mapped_samples,
            self.stats.out_of_bounds,
            self.stats.beyond_threshold,
            self.stats.new_obstacles
        )
    }
}

/// Owns everything the mapper knows: the grid, the pose, and the last sweep.
///
/// All mutation goes through `&mut self`; share it across threads behind a
/// single lock so grid and pose are always seen together.
#[derive(Debug, Clone)]
pub struct MappingContext {
    config: MapperConfig,
    grid: OccupancyGrid,
    localizer: Localizer,
    last_scan: Vec<ScanSample>,
}

impl MappingContext {
    /// Creates an empty map with the robot at its centre, heading 0°.
    ///
    /// # Errors
    /// * `MappingError::InvalidConfig` if `config` does not validate.
    pub fn new(config: MapperConfig) -> Result<Self, MappingError> {
        config.validate()?;
        let grid = OccupancyGrid::new(config.grid_size)?;
        let localizer = Localizer::new(config.grid_size)?;
        info!(
            grid_size = config.grid_size,
            max_range_cm = config.max_range_cm,
            obstacle_threshold_cm = config.obstacle_threshold_cm,
            "mapping context created"
        );
        Ok(MappingContext {
            config,
            grid,
            localizer,
            last_scan: Vec::new(),
        })
    }

    /// Creates a context with the robot starting at `pose`.
    pub fn with_pose(config: MapperConfig, pose: Pose) -> Result<Self, MappingError> {
        let mut context = MappingContext::new(config)?;
        context.localizer = Localizer::with_pose(context.config.grid_size, pose)?;
        Ok(context)
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    pub fn pose(&self) -> Pose {
        self.localizer.pose()
    }

    /// Raw readings accepted by the most recent sweep, before interpolation.
    pub fn last_scan(&self) -> &[ScanSample] {
        &self.last_scan
    }

    /// Applies a motion command to the pose estimate.
    pub fn advance(&mut self, distance_cm: f64, delta_heading_deg: f64) -> Result<Pose, MappingError> {
        let pose = self.localizer.advance(distance_cm, delta_heading_deg)?;
        debug!(distance_cm, delta_heading_deg, %pose, "pose advanced");
        Ok(pose)
    }

    /// Sweeps the sensor from the current pose and maps the readings.
    ///
    /// # Errors
    /// * `MappingError::Sensor` on a hardware fault. The grid is left as it
    ///   was before the scan.
    pub fn scan<R, P>(&mut self, ranging: &mut R, pan: &mut P) -> Result<ScanSummary, MappingError>
    where
        R: RangeSensor + ?Sized,
        P: PanServo + ?Sized,
    {
        let readings = ScanSession::new(&self.config, ranging, pan).run()?;
        Ok(self.map_sweep(readings))
    }

    /// Maps readings from a sweep taken at the current pose.
    ///
    /// Lets a host run the [`ScanSession`] itself, without holding whatever
    /// lock guards this context while the servo moves.
    pub fn map_sweep(&mut self, readings: SweepReadings) -> ScanSummary {
        self.last_scan = readings.samples;

        let mapped = if self.config.interpolate {
            interpolate(&self.last_scan, self.config.sweep.step_deg)
        } else {
            self.last_scan.clone()
        };
        let stats = self.integrate(&mapped);

        let summary = ScanSummary {
            raw_samples: self.last_scan.len(),
            rejected: readings.rejected,
            mapped_samples: mapped.len(),
            stats,
        };
        info!(pose = %self.pose(), %summary, "scan mapped");
        summary
    }

    /// Feeds samples taken at the current pose into the grid.
    ///
    /// Each sample is gated on `0 < d < max_range_cm`, then either ray-cast
    /// with an obstacle at its end (`d <= obstacle_threshold_cm`) or handled
    /// per the configured [`DropZonePolicy`].
    pub fn integrate(&mut self, samples: &[ScanSample]) -> IntegrationStats {
        let pose = self.localizer.pose();
        let origin = GridPoint::from(pose);
        let mut stats = IntegrationStats::default();

        for sample in samples {
            if !sample.is_valid(self.config.max_range_cm) {
                stats.invalid += 1;
                continue;
            }

            let beyond_threshold = sample.distance_cm > self.config.obstacle_threshold_cm;
            if beyond_threshold {
                stats.beyond_threshold += 1;
                if self.config.drop_zone == DropZonePolicy::Drop {
                    continue;
                }
            }

            let Some(hit) = to_cell(
                sample.bearing_deg as f64,
                sample.distance_cm,
                &pose,
                self.config.grid_size,
            ) else {
                stats.out_of_bounds += 1;
                continue;
            };

            stats.rasterized += 1;
            if beyond_threshold {
                mark_free(&mut self.grid, origin, hit);
            } else if update_from_hit(&mut self.grid, origin, hit) {
                stats.new_obstacles += 1;
            }
        }

        debug!(?stats, "samples integrated");
        stats
    }

    /// Forgets every observation. The pose is kept.
    pub fn reset_map(&mut self) {
        self.grid.reset();
        self.last_scan.clear();
        info!("map cleared");
    }

    /// Writes the grid to `path`.
    pub fn save_map(&self, path: impl AsRef<Path>) -> Result<(), MappingError> {
        self.grid.save(path)
    }

    /// Replaces the grid with one read from `path`.
    ///
    /// # Errors
    /// * `MappingError::DimensionMismatch` if the stored grid is not the
    ///   configured size.
    /// * `MappingError::Io` / `MappingError::Corrupt` from reading the file.
    ///
    /// The current grid is kept on any error.
    pub fn load_map(&mut self, path: impl AsRef<Path>) -> Result<CellCounts, MappingError> {
        let path = path.as_ref();
        let grid = OccupancyGrid::load(path)?;
        if grid.size() != self.config.grid_size {
            warn!(
                path = %path.display(),
                expected = self.config.grid_size,
                found = grid.size(),
                "refusing map of the wrong size"
            );
            return Err(MappingError::DimensionMismatch {
                expected: self.config.grid_size,
                found: grid.size(),
            });
        }
        self.grid = grid;
        let counts = self.grid.counts();
        info!(path = %path.display(), ?counts, "map loaded");
        Ok(counts)
    }

    /// Text view of the map with the robot drawn as `C`, followed by the pose
    /// and cell counts.
    ///
    /// Rows are printed top to bottom in increasing `y`.
    pub fn render(&self) -> String {
        let size = self.grid.size();
        let robot = GridPoint::from(self.pose());
        let mut out = String::with_capacity((size + 1) * size + 128);

        for y in 0..size {
            for x in 0..size {
                let p = GridPoint::new(x, y);
                let symbol = match self.grid.try_get(p) {
                    Some(_) if p == robot => 'C',
                    Some(cell) => cell.symbol(),
                    None => ' ',
                };
                out.push(symbol);
            }
            out.push('\n');
        }

        let counts = self.grid.counts();
        // writing to a String cannot fail
        let _ = writeln!(out, "Robot: {}", self.pose());
        let _ = writeln!(
            out,
            "Cells: {} occupied, {} free, {} unknown",
            counts.occupied, counts.free, counts.unknown
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::CellState;

    fn context() -> MappingContext {
        MappingContext::new(MapperConfig {
            settle_delay_ms: 0,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_new_context() {
        let ctx = context();
        assert_eq!(ctx.pose(), Pose::new(50, 50, 0.0));
        assert_eq!(ctx.grid().counts().unknown, 10_000);
        assert!(ctx.last_scan().is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = MapperConfig {
            grid_size: 0,
            ..Default::default()
        };
        assert!(matches!(MappingContext::new(config), Err(MappingError::InvalidConfig(_))));
    }

    #[test]
    fn test_integrate_forward_hit() {
        let mut ctx = context();
        let stats = ctx.integrate(&[ScanSample::new(0, 10.0)]);
        assert_eq!(stats.new_obstacles, 1);
        assert_eq!(stats.rasterized, 1);
        assert_eq!(ctx.grid().get(GridPoint::new(60, 50)), CellState::Occupied);
        assert_eq!(ctx.grid().get(GridPoint::new(55, 50)), CellState::Free);
    }

    #[test]
    fn test_drop_zone_default_ignores_sample() {
        let mut ctx = context();
        let stats = ctx.integrate(&[ScanSample::new(0, 85.0)]);
        assert_eq!(stats.beyond_threshold, 1);
        assert_eq!(stats.rasterized, 0);
        assert_eq!(ctx.grid().counts().unknown, 10_000);
    }

    #[test]
    fn test_drop_zone_free_space_policy() {
        // from the left edge so an 85 cm ray stays on the grid
        let config = MapperConfig {
            drop_zone: DropZonePolicy::FreeSpace,
            ..Default::default()
        };
        let mut ctx = MappingContext::with_pose(config, Pose::new(5, 50, 0.0)).unwrap();
        let stats = ctx.integrate(&[ScanSample::new(0, 85.0)]);
        assert_eq!(stats.beyond_threshold, 1);
        assert_eq!(stats.rasterized, 1);
        assert_eq!(stats.new_obstacles, 0);
        assert_eq!(ctx.grid().counts().free, 85);
        assert_eq!(ctx.grid().counts().occupied, 0);
        assert_eq!(ctx.grid().get(GridPoint::new(90, 50)), CellState::Unknown);
    }

    #[test]
    fn test_integrate_counts_rejections() {
        let mut ctx = context();
        let stats = ctx.integrate(&[
            ScanSample::new(0, 0.0),
            ScanSample::new(0, 100.0),
            ScanSample::new(0, 60.0),
            ScanSample::new(90, 20.0),
        ]);
        assert_eq!(stats.invalid, 2);
        assert_eq!(stats.out_of_bounds, 1);
        assert_eq!(stats.rasterized, 1);
        assert_eq!(stats.new_obstacles, 1);
        assert_eq!(ctx.grid().get(GridPoint::new(50, 30)), CellState::Occupied);
    }

    #[test]
    fn test_repeated_obstacle_not_recounted() {
        let mut ctx = context();
        assert_eq!(ctx.integrate(&[ScanSample::new(0, 10.0)]).new_obstacles, 1);
        assert_eq!(ctx.integrate(&[ScanSample::new(0, 10.0)]).new_obstacles, 0);
    }

    #[test]
    fn test_advance_moves_origin() {
        let mut ctx = context();
        ctx.advance(10.0, 90.0).unwrap();
        assert_eq!(ctx.pose(), Pose::new(50, 60, 90.0));
        ctx.integrate(&[ScanSample::new(0, 5.0)]);
        assert_eq!(ctx.grid().get(GridPoint::new(50, 65)), CellState::Occupied);

        assert!(matches!(
            ctx.advance(f64::NAN, 0.0),
            Err(MappingError::Kinematics(_))
        ));
    }

    #[test]
    fn test_reset_map_keeps_pose() {
        let mut ctx = context();
        ctx.advance(5.0, 0.0).unwrap();
        ctx.integrate(&[ScanSample::new(0, 10.0)]);
        ctx.reset_map();
        assert_eq!(ctx.grid().counts().unknown, 10_000);
        assert_eq!(ctx.pose(), Pose::new(55, 50, 0.0));
    }

    #[test]
    fn test_map_sweep_matches_gated_samples() {
        let mut ctx = context();
        let readings = SweepReadings {
            samples: vec![ScanSample::new(0, 10.0), ScanSample::new(15, 10.0)],
            rejected: 2,
        };
        let summary = ctx.map_sweep(readings);
        assert_eq!(summary.raw_samples, 2);
        assert_eq!(summary.rejected, 2);
        assert_eq!(summary.mapped_samples, 4);
        assert_eq!(ctx.last_scan().len(), 2);
        assert_eq!(ctx.grid().get(GridPoint::new(60, 50)), CellState::Occupied);
    }

    #[test]
    fn test_render() {
        let config = MapperConfig {
            grid_size: 5,
            ..Default::default()
        };
        let mut ctx = MappingContext::new(config).unwrap();
        ctx.integrate(&[ScanSample::new(0, 2.0)]);

        let text = ctx.render();
        let rows: Vec<&str> = text.lines().take(5).collect();
        assert_eq!(rows, vec!["?????", "?????", "??C.1", "?????", "?????"]);
        assert!(text.contains("Robot: (x: 2, y: 2"));
        assert!(text.contains("Cells: 1 occupied, 2 free, 22 unknown"));
    }
}
