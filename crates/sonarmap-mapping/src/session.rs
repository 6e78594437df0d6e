//! One pan sweep of the ranging sensor.

use std::time::Duration;

use sonarmap_hal::{PanServo, RangeSensor};
use spin_sleep::SpinSleeper;
use tracing::{debug, trace};

use crate::config::{MapperConfig, SweepConfig};
use crate::error::MappingError;
use crate::sample::ScanSample;

/// Native sleep accuracy assumed for the settle delay (ns).
const SLEEP_ACCURACY_NS: u32 = 1_000_000;

/// Readings gathered by one sweep.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SweepReadings {
    /// Accepted readings in sweep order.
    pub samples: Vec<ScanSample>,
    /// Readings discarded as out of range or no-echo.
    pub rejected: usize,
}

/// Drives the pan servo across a sweep and collects range readings.
///
/// Borrows the hardware for the duration of the sweep. Only readings with
/// `0 < d < max_range_cm` are kept. The servo is returned to 0° once the
/// sweep ends, also when it ends with an error after the first command.
pub struct ScanSession<'a, R: RangeSensor + ?Sized, P: PanServo + ?Sized> {
    ranging: &'a mut R,
    pan: &'a mut P,
    sweep: SweepConfig,
    max_range_cm: f64,
    settle_delay: Duration,
    sleeper: SpinSleeper,
}

impl<'a, R: RangeSensor + ?Sized, P: PanServo + ?Sized> ScanSession<'a, R, P> {
    /// Creates a new session for `config` over the given hardware.
    pub fn new(config: &MapperConfig, ranging: &'a mut R, pan: &'a mut P) -> Self {
        ScanSession {
            ranging,
            pan,
            sweep: config.sweep,
            max_range_cm: config.max_range_cm,
            settle_delay: config.settle_delay(),
            sleeper: SpinSleeper::new(SLEEP_ACCURACY_NS),
        }
    }

    fn settle(&self) {
        if !self.settle_delay.is_zero() {
            self.sleeper.sleep(self.settle_delay);
        }
    }

    /// Runs the sweep.
    ///
    /// # Errors
    /// * `MappingError::Sensor` if the servo or the sensor reports a fault.
    ///   No reading is retried.
    pub fn run(mut self) -> Result<SweepReadings, MappingError> {
        let collected = self.collect();
        let recentred = self.recentre();
        let readings = collected?;
        recentred?;

        debug!(
            accepted = readings.samples.len(),
            rejected = readings.rejected,
            "sweep complete"
        );
        Ok(readings)
    }

    fn collect(&mut self) -> Result<SweepReadings, MappingError> {
        let mut readings = SweepReadings::default();

        for bearing in self.sweep.bearings() {
            self.pan.set_bearing(bearing)?;
            self.settle();

            let distance = self.ranging.read_distance()?;
            let sample = ScanSample::new(bearing, distance);
            if sample.is_valid(self.max_range_cm) {
                trace!(bearing, distance, "reading accepted");
                readings.samples.push(sample);
            } else {
                debug!(bearing, distance, max_range_cm = self.max_range_cm, "invalid reading discarded");
                readings.rejected += 1;
            }
        }

        Ok(readings)
    }

    fn recentre(&mut self) -> Result<(), MappingError> {
        self.pan.set_bearing(0)?;
        self.settle();
        Ok(())
    }
}
