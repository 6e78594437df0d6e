//! Simulated hardware for running the mapper without a robot attached.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::error::SensorError;
use crate::traits::{NO_ECHO, PanServo, RangeSensor};

/// Shortest distance the mock ultrasonic sensor will ever report (cm).
pub const MOCK_MIN_DISTANCE_CM: f64 = 5.0;

/// Mock ultrasonic sensor returning a base distance with uniform integer noise.
///
/// Every reading is `max(5, base + noise)` with `noise` drawn from
/// `[-noise_cm, noise_cm]`.
#[derive(Debug, Clone)]
pub struct MockRangeSensor {
    base_distance_cm: f64,
    noise_cm: u32,
    rng: StdRng,
}

impl MockRangeSensor {
    /// Creates a mock sensor seeded from the OS.
    pub fn new(base_distance_cm: f64, noise_cm: u32) -> Self {
        Self {
            base_distance_cm,
            noise_cm,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Creates a mock sensor whose readings are reproducible.
    pub fn with_seed(base_distance_cm: f64, noise_cm: u32, seed: u64) -> Self {
        Self {
            base_distance_cm,
            noise_cm,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Changes the simulated distance, e.g. to emulate a closer wall.
    pub fn set_base_distance(&mut self, base_distance_cm: f64) {
        self.base_distance_cm = base_distance_cm;
    }
}

impl Default for MockRangeSensor {
    fn default() -> Self {
        Self::new(50.0, 3)
    }
}

impl RangeSensor for MockRangeSensor {
    fn read_distance(&mut self) -> Result<f64, SensorError> {
        let noise = if self.noise_cm == 0 {
            0
        } else {
            let n = self.noise_cm as i64;
            self.rng.random_range(-n..=n)
        };
        let distance = (self.base_distance_cm + noise as f64).max(MOCK_MIN_DISTANCE_CM);
        debug!(distance, "mock ultrasonic reading");
        Ok(distance)
    }
}

/// Sensor that replays a fixed list of readings, then reports no echo.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRangeSensor {
    readings: VecDeque<f64>,
}

impl ScriptedRangeSensor {
    /// Creates a sensor that will return `readings` in order.
    pub fn new(readings: impl IntoIterator<Item = f64>) -> Self {
        Self {
            readings: readings.into_iter().collect(),
        }
    }

    /// Number of readings not yet consumed.
    pub fn remaining(&self) -> usize {
        self.readings.len()
    }
}

impl RangeSensor for ScriptedRangeSensor {
    fn read_distance(&mut self) -> Result<f64, SensorError> {
        Ok(self.readings.pop_front().unwrap_or(NO_ECHO))
    }
}

/// Pan servo that only remembers what it was told.
#[derive(Debug, Clone, Default)]
pub struct MockPanServo {
    angle_deg: i32,
    history: Vec<i32>,
}

impl MockPanServo {
    /// Creates a servo centred at 0°.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last commanded bearing.
    pub fn angle(&self) -> i32 {
        self.angle_deg
    }

    /// Every bearing commanded so far, oldest first.
    pub fn history(&self) -> &[i32] {
        &self.history
    }
}

impl PanServo for MockPanServo {
    fn set_bearing(&mut self, angle_deg: i32) -> Result<(), SensorError> {
        debug!(angle_deg, "mock servo angle set");
        self.angle_deg = angle_deg;
        self.history.push(angle_deg);
        Ok(())
    }
}
