//! Pump affinity-law normalization.
//!
//! At fixed impeller geometry, with `r = rated_speed / measured_speed`:
//!
//! - `Q_rated = Q * r`
//! - `H_rated = H * r^2`
//!
//! Rows without a positive measured speed, or without flow/head, are excluded
//! rather than scaled to infinity/NaN.

use tracing::debug;

use crate::domain::{NormalizedPoint, TestPoint};
use crate::error::CurveError;

/// Check that a rated speed is usable.
pub fn validate_rated_speed(rated_speed: f64) -> Result<f64, CurveError> {
    if rated_speed.is_finite() && rated_speed > 0.0 {
        Ok(rated_speed)
    } else {
        Err(CurveError::InvalidRatedSpeed(rated_speed))
    }
}

/// Default rated speed: the mean of valid measured speeds, truncated to whole RPM.
pub fn default_rated_speed<'a>(
    points: impl IntoIterator<Item = &'a TestPoint>,
) -> Result<f64, CurveError> {
    let (sum, count) = points
        .into_iter()
        .filter_map(TestPoint::valid_speed)
        .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        return Err(CurveError::NoValidSpeed);
    }
    let mean = (sum / count as f64).trunc();
    // A mean below 1 RPM truncates to zero; keep the exact mean instead.
    if mean > 0.0 {
        Ok(mean)
    } else {
        Ok(sum / count as f64)
    }
}

/// Normalize a single row, or `None` if it cannot be normalized.
pub fn normalize_point(point: &TestPoint, rated_speed: f64) -> Option<NormalizedPoint<'_>> {
    let speed = point.valid_speed()?;
    let flow = point.flow.filter(|v| v.is_finite())?;
    let head = point.head.filter(|v| v.is_finite())?;
    let ratio = rated_speed / speed;
    Some(NormalizedPoint {
        source: point,
        flow: flow * ratio,
        head: head * ratio * ratio,
    })
}

/// Normalize every usable row to `rated_speed`, preserving input order.
pub fn normalize<'a>(
    points: impl IntoIterator<Item = &'a TestPoint>,
    rated_speed: f64,
) -> Result<Vec<NormalizedPoint<'a>>, CurveError> {
    let rated_speed = validate_rated_speed(rated_speed)?;

    let mut out = Vec::new();
    let mut excluded = 0usize;
    for p in points {
        match normalize_point(p, rated_speed) {
            Some(np) => out.push(np),
            None => excluded += 1,
        }
    }

    if excluded > 0 {
        debug!(
            excluded,
            kept = out.len(),
            "excluded rows without positive speed or flow/head"
        );
    }
    Ok(out)
}
