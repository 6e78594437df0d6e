//! Densifying a sparse sweep by linear interpolation between bearings.
//!
//! Rays cast from neighbouring readings diverge with distance and leave
//! wedges of unobserved cells between them. Inserting synthetic readings
//! every few degrees narrows those wedges.

use crate::sample::ScanSample;

/// Upper bound on the spacing of inserted readings (deg).
pub const MAX_SUB_STEP_DEG: i32 = 5;

/// Spacing of inserted readings for a sweep taken every `step_deg` degrees.
///
/// A result of 0 means the sweep is already too fine to densify.
pub fn sub_step(step_deg: i32) -> i32 {
    MAX_SUB_STEP_DEG.min(step_deg / 2)
}

/// Inserts linearly interpolated readings between each adjacent pair.
///
/// Original readings are kept verbatim and in order. Between readings at
/// bearings `b1` and `b2`, `|b2 - b1| / sub_step - 1` readings are inserted
/// at `sub_step` spacing walking from `b1` towards `b2`. No validity
/// filtering happens here.
pub fn interpolate(samples: &[ScanSample], step_deg: i32) -> Vec<ScanSample> {
    if samples.len() < 2 {
        return samples.to_vec();
    }

    let sub = sub_step(step_deg);
    let mut out = Vec::with_capacity(samples.len() * 3);

    for pair in samples.windows(2) {
        let (first, second) = (pair[0], pair[1]);
        out.push(first);

        if sub <= 0 {
            continue;
        }

        let steps = (second.bearing_deg - first.bearing_deg).abs() / sub;
        if steps > 1 {
            let direction = if second.bearing_deg > first.bearing_deg { 1 } else { -1 };
            for j in 1..steps {
                let t = j as f64 / steps as f64;
                out.push(ScanSample::new(
                    first.bearing_deg + j * sub * direction,
                    first.distance_cm + (second.distance_cm - first.distance_cm) * t,
                ));
            }
        }
    }

    if let Some(last) = samples.last() {
        out.push(*last);
    }
    out
}
