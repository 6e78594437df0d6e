//! Real hardware through Linux sysfs.
//!
//! The ultrasonic ranger is expected to be bound to the kernel's IIO
//! `srf04` driver (HC-SR04 and compatibles), which exposes the last
//! measurement as `in_distance_raw` in millimeters. The pan servo is driven
//! through the generic PWM class at `/sys/class/pwm/pwmchipN`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::SensorError;
use crate::traits::{NO_ECHO, PanServo, RangeSensor};

// errno values the srf04 driver uses for a missing echo
const EIO: i32 = 5;
const ETIMEDOUT: i32 = 110;

/// Widest bearing the pan servo can reach on either side (deg).
pub const PAN_LIMIT_DEG: i32 = 90;

/// Ultrasonic ranger read through an IIO `in_distance_raw` attribute.
#[derive(Debug, Clone)]
pub struct IioRangeSensor {
    path: PathBuf,
    scale_to_cm: f64,
}

impl IioRangeSensor {
    /// Opens the sensor attribute at `path`.
    ///
    /// `scale_to_cm` converts raw units to centimeters (0.1 for the
    /// millimeter output of `srf04`).
    pub fn new(path: impl Into<PathBuf>, scale_to_cm: f64) -> Result<Self, SensorError> {
        if scale_to_cm <= 0.0 {
            return Err(SensorError::InvalidConfig("scale_to_cm must be positive"));
        }
        let path = path.into();
        if !path.exists() {
            return Err(SensorError::io(
                path,
                std::io::Error::new(ErrorKind::NotFound, "IIO distance attribute not found"),
            ));
        }
        info!(path = %path.display(), "IIO ranger opened");
        Ok(Self { path, scale_to_cm })
    }

    /// Path of the attribute being read.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RangeSensor for IioRangeSensor {
    fn read_distance(&mut self) -> Result<f64, SensorError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if is_no_echo(&e) => {
                debug!(path = %self.path.display(), error = %e, "no echo");
                return Ok(NO_ECHO);
            }
            Err(e) => return Err(SensorError::io(&self.path, e)),
        };
        let value: f64 = raw.trim().parse().map_err(|_| SensorError::MalformedReading {
            path: self.path.clone(),
            value: raw.trim().to_string(),
        })?;
        Ok(value * self.scale_to_cm)
    }
}

fn is_no_echo(e: &std::io::Error) -> bool {
    e.kind() == ErrorKind::TimedOut || matches!(e.raw_os_error(), Some(EIO) | Some(ETIMEDOUT))
}

/// Hobby servo on a sysfs PWM channel.
///
/// The bearing range `[-90, 90]` maps linearly onto
/// `[min_pulse_ns, max_pulse_ns]`.
#[derive(Debug, Clone)]
pub struct SysfsPwmServo {
    channel_dir: PathBuf,
    min_pulse_ns: u64,
    max_pulse_ns: u64,
}

impl SysfsPwmServo {
    /// Exports and enables `channel` on `chip` with the given period.
    pub fn new(
        chip: impl AsRef<Path>,
        channel: u32,
        period_ns: u64,
        min_pulse_ns: u64,
        max_pulse_ns: u64,
    ) -> Result<Self, SensorError> {
        if min_pulse_ns >= max_pulse_ns {
            return Err(SensorError::InvalidConfig("min_pulse_ns must be below max_pulse_ns"));
        }
        if max_pulse_ns > period_ns {
            return Err(SensorError::InvalidConfig("max_pulse_ns must fit in period_ns"));
        }

        let chip = chip.as_ref();
        let channel_dir = chip.join(format!("pwm{}", channel));
        if !channel_dir.exists() {
            write_attr(&chip.join("export"), &channel.to_string())?;
        }
        write_attr(&channel_dir.join("period"), &period_ns.to_string())?;
        write_attr(&channel_dir.join("enable"), "1")?;
        info!(channel = %channel_dir.display(), period_ns, "PWM pan servo enabled");

        Ok(Self {
            channel_dir,
            min_pulse_ns,
            max_pulse_ns,
        })
    }

    /// Pulse width that corresponds to a bearing, clamped to the servo range.
    pub fn pulse_for(&self, angle_deg: i32) -> u64 {
        let angle = angle_deg.clamp(-PAN_LIMIT_DEG, PAN_LIMIT_DEG);
        let span = (self.max_pulse_ns - self.min_pulse_ns) as f64;
        let t = (angle + PAN_LIMIT_DEG) as f64 / (2 * PAN_LIMIT_DEG) as f64;
        self.min_pulse_ns + (span * t).round() as u64
    }
}

impl PanServo for SysfsPwmServo {
    fn set_bearing(&mut self, angle_deg: i32) -> Result<(), SensorError> {
        let pulse = self.pulse_for(angle_deg);
        debug!(angle_deg, pulse_ns = pulse, "servo bearing set");
        write_attr(&self.channel_dir.join("duty_cycle"), &pulse.to_string())
    }
}

fn write_attr(path: &Path, value: &str) -> Result<(), SensorError> {
    fs::write(path, value).map_err(|e| SensorError::io(path, e))
}
