//! Hardware boundary of the mapper: a ranging sensor aimed by a pan servo.
//!
//! The mapping core only ever talks to the [`RangeSensor`] and [`PanServo`]
//! traits. Implementations are chosen once at startup from a
//! [`HardwareConfig`]: simulated devices for development, or Linux sysfs
//! devices on the robot.

pub mod config;
pub mod error;
pub mod linux;
pub mod mock;
pub mod traits;

pub use config::{DynPanServo, DynRangeSensor, HardwareConfig, PanServoConfig, RangeSensorConfig};
pub use error::SensorError;
pub use linux::{IioRangeSensor, SysfsPwmServo};
pub use mock::{MockPanServo, MockRangeSensor, ScriptedRangeSensor};
pub use traits::{NO_ECHO, PanServo, RangeSensor};
