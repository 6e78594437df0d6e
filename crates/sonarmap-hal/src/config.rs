//! Startup selection of the ranging and pan hardware.

use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::SensorError;
use crate::linux::{IioRangeSensor, SysfsPwmServo};
use crate::mock::{MockPanServo, MockRangeSensor};
use crate::traits::{PanServo, RangeSensor};

/// Which ranging sensor to use.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
#[derive(Debug, Clone, PartialEq)]
pub enum RangeSensorConfig {
    /// Simulated ultrasonic sensor.
    Mock {
        /// Distance every reading is centred on (cm).
        base_distance_cm: f64,
        /// Half-width of the uniform integer noise (cm).
        noise_cm: u32,
        /// Fixed seed for reproducible runs.
        seed: Option<u64>,
    },
    /// Linux IIO ranger such as an HC-SR04 on the `srf04` driver.
    Iio {
        /// Path to the `in_distance_raw` attribute.
        path: PathBuf,
        /// Raw units to centimeters.
        scale_to_cm: f64,
    },
}

impl Default for RangeSensorConfig {
    fn default() -> Self {
        RangeSensorConfig::Mock {
            base_distance_cm: 50.0,
            noise_cm: 3,
            seed: None,
        }
    }
}

/// Which pan actuator to use.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PanServoConfig {
    /// Servo that only records commands.
    #[default]
    Mock,
    /// Hobby servo on a sysfs PWM channel.
    SysfsPwm {
        /// PWM chip directory, e.g. `/sys/class/pwm/pwmchip0`.
        chip: PathBuf,
        /// Channel number on the chip.
        channel: u32,
        /// PWM period (ns).
        period_ns: u64,
        /// Pulse width at -90° (ns).
        min_pulse_ns: u64,
        /// Pulse width at +90° (ns).
        max_pulse_ns: u64,
    },
}

/// Hardware selection, resolved once at startup.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HardwareConfig {
    /// Ranging sensor.
    pub ranging: RangeSensorConfig,
    /// Pan actuator.
    pub pan: PanServoConfig,
}

/// Boxed ranging sensor usable from any thread.
pub type DynRangeSensor = Box<dyn RangeSensor + Send>;
/// Boxed pan actuator usable from any thread.
pub type DynPanServo = Box<dyn PanServo + Send>;

impl HardwareConfig {
    /// Instantiates the configured sensor and servo.
    pub fn build(&self) -> Result<(DynRangeSensor, DynPanServo), SensorError> {
        let ranging: DynRangeSensor = match &self.ranging {
            RangeSensorConfig::Mock {
                base_distance_cm,
                noise_cm,
                seed,
            } => {
                info!(base_distance_cm, noise_cm, ?seed, "using mock ranging sensor");
                match seed {
                    Some(seed) => Box::new(MockRangeSensor::with_seed(*base_distance_cm, *noise_cm, *seed)),
                    None => Box::new(MockRangeSensor::new(*base_distance_cm, *noise_cm)),
                }
            }
            RangeSensorConfig::Iio { path, scale_to_cm } => {
                Box::new(IioRangeSensor::new(path.clone(), *scale_to_cm)?)
            }
        };

        let pan: DynPanServo = match &self.pan {
            PanServoConfig::Mock => {
                info!("using mock pan servo");
                Box::new(MockPanServo::new())
            }
            PanServoConfig::SysfsPwm {
                chip,
                channel,
                period_ns,
                min_pulse_ns,
                max_pulse_ns,
            } => Box::new(SysfsPwmServo::new(
                chip,
                *channel,
                *period_ns,
                *min_pulse_ns,
                *max_pulse_ns,
            )?),
        };

        Ok((ranging, pan))
    }
}
