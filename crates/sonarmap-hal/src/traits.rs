use crate::error::SensorError;

/// Distance returned by a [`RangeSensor`] when no echo came back.
///
/// Any reading `<= 0.0` is treated as invalid by consumers, as is any
/// reading at or beyond their configured maximum range.
pub const NO_ECHO: f64 = 0.0;

/// Core trait defining the interface for a ranging sensor.
///
/// Implementations return a distance in centimeters. A missing echo is a
/// normal condition and is reported as [`NO_ECHO`], not as an error; errors
/// are reserved for faults of the underlying device.
pub trait RangeSensor {
    /// Take one distance reading in centimeters.
    fn read_distance(&mut self) -> Result<f64, SensorError>;
}

/// Core trait defining the interface for the pan actuator carrying the sensor.
///
/// Bearings are in degrees relative to the robot's forward direction,
/// positive to the right. Implementations may block until the command has
/// been handed to the hardware but are not required to wait for the
/// mechanism to settle; callers own the settle delay.
pub trait PanServo {
    /// Command the pan mechanism to a bearing.
    fn set_bearing(&mut self, angle_deg: i32) -> Result<(), SensorError>;
}

impl<T: RangeSensor + ?Sized> RangeSensor for Box<T> {
    fn read_distance(&mut self) -> Result<f64, SensorError> {
        (**self).read_distance()
    }
}

impl<T: PanServo + ?Sized> PanServo for Box<T> {
    fn set_bearing(&mut self, angle_deg: i32) -> Result<(), SensorError> {
        (**self).set_bearing(angle_deg)
    }
}
