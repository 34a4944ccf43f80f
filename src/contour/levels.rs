//! Efficiency iso-levels.
//!
//! Levels are spaced evenly between the minimum and maximum *observed*
//! efficiency (not the interpolated grid), so they exist even when the field
//! itself is empty.

use crate::domain::{IsoLevel, LEVEL_COUNT_RANGE};
use crate::math::{finite_range, linspace};

/// Evenly spaced levels over the observed range, inclusive of both ends.
///
/// `count` is clamped to [`LEVEL_COUNT_RANGE`]. A constant observation yields
/// `count` identical levels; no finite observations yield none.
pub fn iso_levels(observed: impl IntoIterator<Item = f64>, count: usize) -> Vec<IsoLevel> {
    let Some((lo, hi)) = finite_range(observed) else {
        return Vec::new();
    };
    let count = count.clamp(*LEVEL_COUNT_RANGE.start(), *LEVEL_COUNT_RANGE.end());
    linspace(lo, hi, count)
        .into_iter()
        .map(|v| level(v.clamp(lo, hi)))
        .collect()
}

fn level(value: f64) -> IsoLevel {
    IsoLevel {
        value,
        label: format!("{value:.1}%"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_span_observed_range() {
        let obs = [70.0, 80.0, 65.0, 72.5];
        let levels = iso_levels(obs, 8);
        assert_eq!(levels.len(), 8);
        assert_eq!(levels[0].value, 65.0);
        assert_eq!(levels[7].value, 80.0);
        assert!(levels.iter().all(|l| (65.0..=80.0).contains(&l.value)));
        assert_eq!(levels[0].label, "65.0%");
        assert_eq!(levels[7].label, "80.0%");
    }

    #[test]
    fn count_is_clamped_to_six_through_eight() {
        assert_eq!(iso_levels([1.0, 2.0], 3).len(), 6);
        assert_eq!(iso_levels([1.0, 2.0], 20).len(), 8);
        assert_eq!(iso_levels([1.0, 2.0], 7).len(), 7);
    }

    #[test]
    fn degenerate_observations() {
        assert!(iso_levels(std::iter::empty(), 8).is_empty());
        let flat = iso_levels([55.0, 55.0, 55.0], 8);
        assert_eq!(flat.len(), 8);
        assert!(flat.iter().all(|l| l.value == 55.0 && l.label == "55.0%"));
        assert_eq!(iso_levels([70.0], 6).len(), 6);
    }
}
