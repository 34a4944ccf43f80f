//! Efficiency iso-contour surface over the flow–head plane.
//!
//! Built from the full normalized selection (across diameters):
//!
//! - `field`: scattered efficiency -> regular grid (linear barycentric)
//! - `levels`: iso-levels from the observed efficiency range
//! - `isolines`: marching-squares segments per level

pub mod field;
pub mod isolines;
pub mod levels;

pub use field::*;
pub use isolines::*;
pub use levels::*;

use tracing::debug;

use crate::domain::{ContourSurface, DEFAULT_GRID_SIZE, DEFAULT_LEVEL_COUNT, NormalizedPoint};

/// Build the contour surface with the default grid size and level count.
pub fn build_contour_field(points: &[NormalizedPoint<'_>]) -> ContourSurface {
    build_contour_field_with(points, DEFAULT_GRID_SIZE, DEFAULT_LEVEL_COUNT)
}

/// Build the contour surface.
///
/// The field and the levels are independent: levels only need the observed
/// efficiency range, so they are produced even when the field is empty.
pub fn build_contour_field_with(
    points: &[NormalizedPoint<'_>],
    grid_size: usize,
    level_count: usize,
) -> ContourSurface {
    let samples = contour_samples(points);
    let field = interpolate_field(&samples, grid_size);
    let levels = iso_levels(samples.iter().map(|s| s.2), level_count);
    let isolines = iso_lines(&field, &levels);

    debug!(
        samples = samples.len(),
        defined_nodes = field.defined_count(),
        levels = levels.len(),
        "built contour surface"
    );

    ContourSurface {
        field,
        levels,
        isolines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TestPoint;

    fn row(row_id: usize, flow: f64, head: f64, eff: Option<f64>) -> TestPoint {
        TestPoint {
            row_id,
            pump: "P1".to_string(),
            stages: Some(1),
            test_type: Some("SP".to_string()),
            speed: Some(2900.0),
            flow: Some(flow),
            head: Some(head),
            efficiency: eff,
            power: None,
            impeller_dia: Some("200".to_string()),
            testpoint: None,
            npsh_required: None,
        }
    }

    fn normalized(rows: &[TestPoint]) -> Vec<NormalizedPoint<'_>> {
        crate::curves::normalize(rows, 2900.0).unwrap()
    }

    #[test]
    fn levels_survive_an_empty_field() {
        let rows = [row(0, 100.0, 50.0, Some(70.0)), row(1, 150.0, 45.0, Some(80.0))];
        let surface = build_contour_field(&normalized(&rows));
        assert!(surface.field.is_empty());
        assert_eq!(surface.levels.len(), 8);
        assert!(surface.levels.iter().all(|l| (70.0..=80.0).contains(&l.value)));
    }

    #[test]
    fn missing_and_negative_efficiency_are_ignored() {
        let rows = [
            row(0, 100.0, 50.0, Some(70.0)),
            row(1, 150.0, 45.0, Some(80.0)),
            row(2, 200.0, 30.0, None),
            row(3, 120.0, 40.0, Some(-1.0)),
        ];
        let surface = build_contour_field(&normalized(&rows));
        assert!(surface.field.is_empty());
        assert_eq!(surface.levels.first().map(|l| l.value), Some(70.0));
    }

    #[test]
    fn full_surface_for_a_spread_of_points() {
        let mut rows = Vec::new();
        for (d, scale) in [(180.0, 0.8), (200.0, 1.0), (220.0, 1.2)] {
            for k in 0..6 {
                let q = k as f64 * 40.0 * scale;
                let h = 60.0 * scale * scale - 0.001 * q * q;
                let eff = 80.0 - 0.002 * (q - 120.0 * scale).powi(2);
                let mut r = row(rows.len(), q, h, Some(eff));
                r.impeller_dia = Some(format!("{d}"));
                rows.push(r);
            }
        }
        let pts = normalized(&rows);
        let surface = build_contour_field_with(&pts, 40, 6);

        assert_eq!(surface.field.values.len(), 40);
        assert!(surface.field.defined_count() > 0);
        assert_eq!(surface.levels.len(), 6);
        assert_eq!(surface.isolines.len(), 6);

        let observed: Vec<f64> = rows.iter().filter_map(|r| r.efficiency).collect();
        let lo = observed.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = observed.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!(surface.levels.iter().all(|l| l.value >= lo && l.value <= hi));
        for v in surface.field.values.iter().flatten().flatten() {
            assert!(*v >= lo - 1e-6 && *v <= hi + 1e-6);
        }
    }
}
