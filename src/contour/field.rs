//! Scattered efficiency samples -> regular flow–head grid.
//!
//! Interpolation is linear barycentric over a Delaunay triangulation of the
//! samples. Grid nodes outside the convex hull stay `None`; nothing is
//! extrapolated. Coordinates are rescaled to the unit square before
//! triangulating, since flow and head typically differ by orders of magnitude.

use std::cmp::Ordering;

use tracing::debug;

use crate::domain::{ContourField, NormalizedPoint};
use crate::math::{Triangulation, finite_range, linspace};

/// One scattered sample: `(flow, head, efficiency)`.
pub type Sample = (f64, f64, f64);

/// Points usable for the efficiency surface.
///
/// Keeps points with an efficiency value and finite, non-negative flow, head
/// and efficiency.
pub fn contour_samples(points: &[NormalizedPoint<'_>]) -> Vec<Sample> {
    points
        .iter()
        .filter_map(|p| {
            let eff = p.efficiency()?;
            let plausible = p.flow.is_finite()
                && p.flow >= 0.0
                && p.head.is_finite()
                && p.head >= 0.0
                && eff >= 0.0;
            plausible.then_some((p.flow, p.head, eff))
        })
        .collect()
}

/// Interpolate samples onto a `grid_size` x `grid_size` grid.
///
/// Returns an empty field for degenerate input: fewer than 3 samples, zero
/// flow or head span, or all samples collinear.
pub fn interpolate_field(samples: &[Sample], grid_size: usize) -> ContourField {
    if samples.len() < 3 {
        debug!(samples = samples.len(), "too few samples for a contour field");
        return ContourField::default();
    }

    let (Some((f_min, f_max)), Some((h_min, h_max))) = (
        finite_range(samples.iter().map(|s| s.0)),
        finite_range(samples.iter().map(|s| s.1)),
    ) else {
        return ContourField::default();
    };
    let f_span = f_max - f_min;
    let h_span = h_max - h_min;
    if f_span <= 0.0 || h_span <= 0.0 {
        debug!(f_span, h_span, "contour samples have no area");
        return ContourField::default();
    }

    let to_unit = |f: f64, h: f64| [(f - f_min) / f_span, (h - h_min) / h_span];
    let (coords, node_values) = merge_duplicates(samples.iter().map(|&(f, h, e)| (to_unit(f, h), e)));

    let tri = Triangulation::new(&coords);
    if tri.is_empty() {
        debug!(samples = coords.len(), "contour samples are collinear");
        return ContourField::default();
    }

    let n = grid_size.max(2);
    let flow_axis = linspace(f_min, f_max, n);
    let head_axis = linspace(h_min, h_max, n);

    let values = head_axis
        .iter()
        .map(|&h| {
            flow_axis
                .iter()
                .map(|&f| tri.interpolate(&node_values, to_unit(f, h)))
                .collect()
        })
        .collect();

    ContourField {
        flow_axis,
        head_axis,
        values,
    }
}

/// Collapse samples at identical coordinates into one (mean value).
fn merge_duplicates(samples: impl Iterator<Item = ([f64; 2], f64)>) -> (Vec<[f64; 2]>, Vec<f64>) {
    let mut sorted: Vec<([f64; 2], f64)> = samples.collect();
    sorted.sort_by(|a, b| cmp_coord(&a.0, &b.0));

    let mut coords: Vec<[f64; 2]> = Vec::with_capacity(sorted.len());
    let mut values: Vec<f64> = Vec::with_capacity(sorted.len());
    let mut run_len = 0usize;
    for (c, v) in sorted {
        let duplicate = coords.last().is_some_and(|last| cmp_coord(last, &c) == Ordering::Equal);
        match values.last_mut() {
            Some(mean) if duplicate => {
                run_len += 1;
                *mean += (v - *mean) / run_len as f64;
            }
            _ => {
                coords.push(c);
                values.push(v);
                run_len = 1;
            }
        }
    }
    (coords, values)
}

fn cmp_coord(a: &[f64; 2], b: &[f64; 2]) -> Ordering {
    a[0].total_cmp(&b[0]).then_with(|| a[1].total_cmp(&b[1]))
}
