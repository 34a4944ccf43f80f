//! Curve smoothing for rendering.
//!
//! Policy:
//!
//! 1. Check the knots: all values finite, x non-decreasing. Runs of equal x are
//!    merged into one knot (mean y) so the spline sees strictly increasing x.
//! 2. With at least [`MIN_SPLINE_POINTS`] distinct knots, fit a not-a-knot
//!    cubic spline (interpolating, not least squares) and resample it on an
//!    evenly spaced x grid spanning the observed range.
//! 3. Otherwise, or if the spline system can't be solved, return the input
//!    points unchanged (`SmoothKind::Passthrough`), meant to be drawn as
//!    straight segments.
//!
//! Smoothing never fails: passthrough is a valid output, and the reason is
//! recorded on the curve.

use tracing::{debug, warn};

use crate::domain::{DEFAULT_SMOOTH_SAMPLES, Fallback, MIN_SPLINE_POINTS, SmoothCurve, SmoothKind};
use crate::math::{CubicSpline, linspace};

/// Relative tolerance under which two x-values are the same knot.
const DUPLICATE_X_REL: f64 = 1e-12;

/// Smooth ordered `(x, y)` pairs into a [`DEFAULT_SMOOTH_SAMPLES`]-point curve.
pub fn smooth(pairs: &[(f64, f64)]) -> SmoothCurve {
    smooth_with(pairs, DEFAULT_SMOOTH_SAMPLES)
}

/// Smooth ordered `(x, y)` pairs into a `samples`-point curve (at least 2).
pub fn smooth_with(pairs: &[(f64, f64)], samples: usize) -> SmoothCurve {
    let (xs, ys) = match spline_knots(pairs) {
        Ok(knots) => knots,
        Err(fallback) => {
            debug!(points = pairs.len(), ?fallback, "spline skipped; passing points through");
            return passthrough(pairs, fallback);
        }
    };

    let Some(spline) = CubicSpline::fit(&xs, &ys) else {
        warn!(knots = xs.len(), "spline solve failed; passing points through");
        return passthrough(pairs, Fallback::SolveFailed);
    };

    let x_min = xs[0];
    let x_max = xs[xs.len() - 1];
    let points = linspace(x_min, x_max, samples.max(2))
        .into_iter()
        .map(|x| (x, spline.eval(x)))
        .collect();

    SmoothCurve {
        kind: SmoothKind::Spline,
        points,
    }
}

/// Validate and de-duplicate knots for spline construction.
///
/// Returns strictly increasing `xs` with matching `ys`, or the reason the
/// spline must not be attempted.
pub fn spline_knots(pairs: &[(f64, f64)]) -> Result<(Vec<f64>, Vec<f64>), Fallback> {
    if pairs.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
        return Err(Fallback::NonFinite);
    }
    if pairs.windows(2).any(|w| w[1].0 < w[0].0) {
        return Err(Fallback::NotIncreasing);
    }

    let scale = pairs.iter().map(|(x, _)| x.abs()).fold(1.0, f64::max);
    let tol = DUPLICATE_X_REL * scale;

    let mut xs: Vec<f64> = Vec::with_capacity(pairs.len());
    let mut ys: Vec<f64> = Vec::with_capacity(pairs.len());
    let mut run_len = 0usize;
    for &(x, y) in pairs {
        let duplicate = xs.last().is_some_and(|&last| x - last <= tol);
        match ys.last_mut() {
            Some(mean) if duplicate => {
                // Running mean over the duplicate run.
                run_len += 1;
                *mean += (y - *mean) / run_len as f64;
            }
            _ => {
                xs.push(x);
                ys.push(y);
                run_len = 1;
            }
        }
    }

    if xs.len() < MIN_SPLINE_POINTS {
        return Err(Fallback::TooFewPoints { distinct: xs.len() });
    }
    Ok((xs, ys))
}

fn passthrough(pairs: &[(f64, f64)], fallback: Fallback) -> SmoothCurve {
    SmoothCurve {
        kind: SmoothKind::Passthrough { fallback },
        points: pairs.to_vec(),
    }
}
