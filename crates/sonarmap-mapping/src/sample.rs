use std::fmt;

/// One range reading taken at a bearing.
///
/// The bearing is relative to the robot heading at capture time: 0 is
/// forward, positive is to the robot's right, negative to its left.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanSample {
    /// Bearing (deg).
    pub bearing_deg: i32,
    /// Measured distance (cm). Zero or negative means no echo.
    pub distance_cm: f64,
}

impl ScanSample {
    /// Creates a new `ScanSample`.
    pub const fn new(bearing_deg: i32, distance_cm: f64) -> Self {
        Self {
            bearing_deg,
            distance_cm,
        }
    }

    /// Whether the distance lies in the open interval `(0, max_range_cm)`.
    pub fn is_valid(&self, max_range_cm: f64) -> bool {
        self.distance_cm > 0.0 && self.distance_cm < max_range_cm
    }
}

impl fmt::Display for ScanSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>4}°: {:5.1} cm", self.bearing_deg, self.distance_cm)
    }
}
