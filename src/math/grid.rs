//! Evenly spaced sample helpers.

/// `n` evenly spaced values from `start` to `end`, both inclusive.
///
/// `n == 1` yields `[start]`; `n == 0` yields an empty vector.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// `(min, max)` of the finite values, or `None` if there are none.
pub fn finite_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linspace_hits_both_ends() {
        let v = linspace(100.0, 200.0, 200);
        assert_eq!(v.len(), 200);
        assert_eq!(v[0], 100.0);
        assert_eq!(v[199], 200.0);
        assert!(v.windows(2).all(|w| w[1] > w[0]));
    }

    #[test]
    fn finite_range_skips_nan() {
        assert_eq!(finite_range([3.0, f64::NAN, -1.0, 7.0]), Some((-1.0, 7.0)));
        assert_eq!(finite_range([f64::NAN]), None);
    }
}
