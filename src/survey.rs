use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use anyhow::Context;
use sonarmap_hal::{PanServo, RangeSensor};
use sonarmap_mapping::{MapperConfig, MappingContext, ScanSession, ScanSummary};
use spin_sleep::SpinSleeper;
use tracing::{info, warn};

use crate::blackboard::{self, Blackboard};
use crate::config::{AppConfig, SurveyConfig};

#[derive(Debug, Clone, Copy, Default)]
pub struct SurveyTotals {
    pub scans: usize,
    pub new_obstacles: usize,
}

/// Scans, then for every configured move advances the pose and scans again.
pub fn run(config: &AppConfig) -> anyhow::Result<SurveyTotals> {
    let (mut ranging, mut pan) = config
        .hardware
        .build()
        .context("Failed to initialise ranging hardware")?;
    let context = MappingContext::new(config.mapper.clone()).context("Invalid mapper configuration")?;
    let bb = blackboard::new(context);

    if let Some(path) = &config.survey.load_map {
        bb.write()
            .load_map(path)
            .with_context(|| format!("Failed to load map from {}", path.display()))?;
    }

    let stop = Arc::new(AtomicBool::new(false));
    let reporter = spawn_status_reporter(
        Arc::clone(&bb),
        Arc::clone(&stop),
        Duration::from_millis(config.survey.status_interval_ms),
    )?;

    let result = run_moves(&bb, &config.survey, &mut ranging, &mut pan);

    stop.store(true, Ordering::Relaxed);
    if reporter.join().is_err() {
        warn!("Status reporter thread panicked");
    }
    let totals = result?;

    let map = blackboard::snapshot(&bb);
    if config.survey.print_map {
        println!("{}", map.render());
    }
    if let Some(path) = &config.survey.save_map {
        map.save_map(path)
            .with_context(|| format!("Failed to save map to {}", path.display()))?;
    }

    info!(scans = totals.scans, new_obstacles = totals.new_obstacles, "Survey complete");
    Ok(totals)
}

fn run_moves<R, P>(bb: &Blackboard, survey: &SurveyConfig, ranging: &mut R, pan: &mut P) -> anyhow::Result<SurveyTotals>
where
    R: RangeSensor + ?Sized,
    P: PanServo + ?Sized,
{
    let mut totals = SurveyTotals::default();
    let mapper = bb.read().config().clone();

    let summary = scan(bb, &mapper, ranging, pan).context("Initial scan failed")?;
    totals.scans += 1;
    totals.new_obstacles += summary.new_obstacles();

    for (index, step) in survey.moves.iter().enumerate() {
        let pose = bb
            .write()
            .advance(step.distance_cm, step.turn_deg)
            .with_context(|| format!("Move {} ({:?}) rejected", index + 1, step))?;
        info!(move_index = index + 1, %pose, "Moved");

        let summary = scan(bb, &mapper, ranging, pan).with_context(|| format!("Scan after move {} failed", index + 1))?;
        totals.scans += 1;
        totals.new_obstacles += summary.new_obstacles();
    }

    Ok(totals)
}

/// Sweeps without holding the blackboard, then maps the readings under the
/// write lock. Only this thread moves the pose, so it cannot change in between.
fn scan<R, P>(bb: &Blackboard, mapper: &MapperConfig, ranging: &mut R, pan: &mut P) -> anyhow::Result<ScanSummary>
where
    R: RangeSensor + ?Sized,
    P: PanServo + ?Sized,
{
    let readings = ScanSession::new(mapper, ranging, pan).run()?;
    Ok(bb.write().map_sweep(readings))
}

fn spawn_status_reporter(bb: Blackboard, stop: Arc<AtomicBool>, interval: Duration) -> anyhow::Result<JoinHandle<()>> {
    let handle = std::thread::Builder::new()
        .name("status".into())
        .spawn(move || {
            info!("Status reporter started.");
            let sleeper = SpinSleeper::new(1_000);
            while !stop.load(Ordering::Relaxed) {
                sleeper.sleep(interval);
                let status = blackboard::status(&bb);
                info!(
                    pose = %status.pose,
                    occupied = status.counts.occupied,
                    free = status.counts.free,
                    unknown = status.counts.unknown,
                    last_scan = status.last_scan_len,
                    "Map status"
                );
            }
        })?;
    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sonarmap_hal::{HardwareConfig, RangeSensorConfig};

    fn test_config() -> AppConfig {
        AppConfig {
            mapper: MapperConfig {
                settle_delay_ms: 0,
                ..Default::default()
            },
            hardware: HardwareConfig {
                ranging: RangeSensorConfig::Mock {
                    base_distance_cm: 30.0,
                    noise_cm: 2,
                    seed: Some(1),
                },
                ..Default::default()
            },
            survey: SurveyConfig {
                status_interval_ms: 5,
                print_map: false,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_single_scan_survey() {
        let totals = run(&test_config()).unwrap();
        assert_eq!(totals.scans, 1);
        assert!(totals.new_obstacles > 0);
    }

    #[test]
    fn test_survey_with_moves_saves_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("survey.smap");

        let mut config = test_config();
        config.survey.save_map = Some(path.clone());
        config.survey.moves = vec![
            crate::config::Move {
                distance_cm: 10.0,
                turn_deg: 0.0,
            },
            crate::config::Move {
                distance_cm: 5.0,
                turn_deg: 90.0,
            },
        ];

        let totals = run(&config).unwrap();
        assert_eq!(totals.scans, 3);

        let mut reloaded = MappingContext::new(config.mapper.clone()).unwrap();
        let counts = reloaded.load_map(&path).unwrap();
        assert_eq!(counts.occupied, totals.new_obstacles);
    }

    struct LockCheckingSensor {
        bb: Blackboard,
        reads: usize,
    }

    impl RangeSensor for LockCheckingSensor {
        fn read_distance(&mut self) -> Result<f64, sonarmap_hal::SensorError> {
            assert!(self.bb.try_read().is_some(), "blackboard locked during sweep");
            self.reads += 1;
            Ok(40.0)
        }
    }

    #[test]
    fn test_blackboard_readable_while_sweeping() {
        let config = test_config();
        let bb = blackboard::new(MappingContext::new(config.mapper.clone()).unwrap());
        let mut ranging = LockCheckingSensor {
            bb: Arc::clone(&bb),
            reads: 0,
        };
        let mut pan = sonarmap_hal::MockPanServo::new();

        let totals = run_moves(&bb, &config.survey, &mut ranging, &mut pan).unwrap();
        assert_eq!(totals.scans, 1);
        assert_eq!(ranging.reads, 13);
        assert!(blackboard::status(&bb).counts.occupied > 0);
    }

    #[test]
    fn test_bad_move_aborts() {
        let mut config = test_config();
        config.survey.moves = vec![crate::config::Move {
            distance_cm: f64::INFINITY,
            turn_deg: 0.0,
        }];
        assert!(run(&config).is_err());
    }
}
