//! Interpolating cubic spline with not-a-knot end conditions.
//!
//! The spline passes through every knot. Unknowns are the second derivatives
//! `M_i` at each knot, found from:
//!
//! - interior continuity of the first derivative:
//!   `h_{i-1} M_{i-1} + 2 (h_{i-1} + h_i) M_i + h_i M_{i+1} = 6 (d_i - d_{i-1})`
//!   where `d_i = (y_{i+1} - y_i) / h_i`
//! - not-a-knot at both ends: the third derivative is continuous across the
//!   second and the second-to-last knot.
//!
//! With exactly four knots this reduces to the single cubic through them.
//! Systems are tiny (one row per test point), so a dense LU solve is used.

use nalgebra::{DMatrix, DVector};

/// A fitted spline. Construct with [`CubicSpline::fit`].
#[derive(Debug, Clone)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivatives at the knots.
    m: Vec<f64>,
}

impl CubicSpline {
    /// Fit a not-a-knot spline.
    ///
    /// Returns `None` if there are fewer than 4 knots, the lengths differ, any
    /// value is non-finite, `xs` is not strictly increasing, or the linear
    /// system is singular.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Option<Self> {
        let n = xs.len();
        if n < 4 || ys.len() != n {
            return None;
        }
        if xs.iter().chain(ys).any(|v| !v.is_finite()) {
            return None;
        }
        if xs.windows(2).any(|w| w[1] <= w[0]) {
            return None;
        }

        let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
        let d: Vec<f64> = (0..n - 1).map(|i| (ys[i + 1] - ys[i]) / h[i]).collect();

        let mut a = DMatrix::<f64>::zeros(n, n);
        let mut rhs = DVector::<f64>::zeros(n);

        // Left not-a-knot: (M1 - M0)/h0 = (M2 - M1)/h1
        a[(0, 0)] = h[1];
        a[(0, 1)] = -(h[0] + h[1]);
        a[(0, 2)] = h[0];

        for i in 1..n - 1 {
            a[(i, i - 1)] = h[i - 1];
            a[(i, i)] = 2.0 * (h[i - 1] + h[i]);
            a[(i, i + 1)] = h[i];
            rhs[i] = 6.0 * (d[i] - d[i - 1]);
        }

        // Right not-a-knot, mirrored.
        a[(n - 1, n - 3)] = h[n - 2];
        a[(n - 1, n - 2)] = -(h[n - 3] + h[n - 2]);
        a[(n - 1, n - 1)] = h[n - 3];

        let m = a.lu().solve(&rhs)?;
        if m.iter().any(|v| !v.is_finite()) {
            return None;
        }

        Some(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            m: m.iter().copied().collect(),
        })
    }

    /// Evaluate the spline. Outside the knot range the end polynomials are extended.
    pub fn eval(&self, x: f64) -> f64 {
        let n = self.xs.len();
        // Segment i covers [x_i, x_{i+1}].
        let i = self
            .xs
            .partition_point(|&k| k <= x)
            .saturating_sub(1)
            .min(n - 2);

        let (x0, x1) = (self.xs[i], self.xs[i + 1]);
        let (y0, y1) = (self.ys[i], self.ys[i + 1]);
        let (m0, m1) = (self.m[i], self.m[i + 1]);
        let h = x1 - x0;
        let a = x1 - x;
        let b = x - x0;

        m0 * a.powi(3) / (6.0 * h)
            + m1 * b.powi(3) / (6.0 * h)
            + (y0 / h - m0 * h / 6.0) * a
            + (y1 / h - m1 * h / 6.0) * b
    }

    pub fn knots(&self) -> &[f64] {
        &self.xs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_through_every_knot() {
        let xs = [0.0, 1.0, 2.5, 4.0, 7.0];
        let ys = [50.0, 49.0, 46.0, 40.0, 22.0];
        let s = CubicSpline::fit(&xs, &ys).unwrap();
        for (x, y) in xs.iter().zip(ys) {
            assert!((s.eval(*x) - y).abs() < 1e-9, "spline({x}) != {y}");
        }
    }

    #[test]
    fn reproduces_a_cubic_exactly() {
        let f = |x: f64| 2.0 - 0.5 * x + 0.25 * x * x - 0.1 * x * x * x;
        let xs = [0.0, 0.7, 1.9, 3.0, 4.4, 6.0];
        let ys: Vec<f64> = xs.iter().map(|&x| f(x)).collect();
        let s = CubicSpline::fit(&xs, &ys).unwrap();
        for i in 0..=60 {
            let x = i as f64 * 0.1;
            assert!((s.eval(x) - f(x)).abs() < 1e-8, "mismatch at x={x}");
        }
    }

    #[test]
    fn four_knots_is_the_interpolating_cubic() {
        let f = |x: f64| x * x * x - x;
        let xs = [-1.0, 0.0, 1.5, 2.0];
        let ys: Vec<f64> = xs.iter().map(|&x| f(x)).collect();
        let s = CubicSpline::fit(&xs, &ys).unwrap();
        assert!((s.eval(0.75) - f(0.75)).abs() < 1e-9);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(CubicSpline::fit(&[0.0, 1.0, 2.0], &[1.0, 2.0, 3.0]).is_none());
        assert!(CubicSpline::fit(&[0.0, 1.0, 1.0, 2.0], &[1.0, 2.0, 3.0, 4.0]).is_none());
        assert!(CubicSpline::fit(&[0.0, 2.0, 1.0, 3.0], &[1.0, 2.0, 3.0, 4.0]).is_none());
        assert!(CubicSpline::fit(&[0.0, 1.0, 2.0, f64::NAN], &[1.0, 2.0, 3.0, 4.0]).is_none());
    }
}
