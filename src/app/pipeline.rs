//! Shared pipeline logic used by every front-end.
//!
//! One run for one selection:
//! select rows -> rated speed -> normalize -> group -> (smooth + characteristic points) per group,
//! and independently normalized selection -> contour surface.
//!
//! Every run is a pure function of the table and the config; nothing is cached
//! between runs.

use rayon::prelude::*;
use tracing::info;

use crate::contour::build_contour_field_with;
use crate::curves::{characteristic_points, default_rated_speed, group, normalize, smooth_with, validate_rated_speed};
use crate::domain::{
    CharacteristicPoints, ContourSurface, CurveGroup, NormalizedPoint, RatedSpeedSource, RunConfig, Selection,
    SmoothCurve, TestTable,
};
use crate::error::CurveError;

/// Per-group outputs.
#[derive(Debug, Clone)]
pub struct GroupAnalysis<'a> {
    pub group: CurveGroup<'a>,
    /// Smoothed head vs flow.
    pub head_curve: SmoothCurve,
    /// Smoothed efficiency vs flow, if any member has an efficiency.
    pub efficiency_curve: Option<SmoothCurve>,
    /// `(flow, NPSHr)` for members that recorded one.
    pub npsh_required: Vec<(f64, f64)>,
}

impl<'a> GroupAnalysis<'a> {
    pub fn characteristic_points(&self) -> Option<CharacteristicPoints<'_, 'a>> {
        characteristic_points(&self.group)
    }
}

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput<'a> {
    pub selection: Selection,
    pub rated_speed: f64,
    pub rated_speed_source: RatedSpeedSource,
    /// Rows matching the selection before normalization.
    pub rows_selected: usize,
    pub points: Vec<NormalizedPoint<'a>>,
    /// Ordered by group key.
    pub groups: Vec<GroupAnalysis<'a>>,
    pub contour: ContourSurface,
}

/// Execute the pipeline for `config.selection`.
pub fn run_pipeline<'a>(table: &'a TestTable, config: &RunConfig) -> Result<RunOutput<'a>, CurveError> {
    // 1) Select rows.
    let selected = table.select(&config.selection);
    if selected.is_empty() {
        return Err(CurveError::EmptySelection(config.selection.describe()));
    }

    // 2) Resolve the rated speed.
    let (rated_speed, rated_speed_source) = match config.rated_speed {
        Some(speed) => (validate_rated_speed(speed)?, RatedSpeedSource::Explicit),
        None => (default_rated_speed(selected.iter().copied())?, RatedSpeedSource::Mean),
    };

    // 3) Affinity-law normalization.
    let points = normalize(selected.iter().copied(), rated_speed)?;
    if points.is_empty() {
        return Err(CurveError::EmptySelection(format!(
            "{} with a positive speed and both flow and head",
            config.selection.describe()
        )));
    }

    // 4) Group and analyze each curve. Groups are independent; `collect`
    //    keeps them in key order.
    let samples = config.samples;
    let groups: Vec<GroupAnalysis<'a>> = group(&points)
        .into_par_iter()
        .map(|g| analyze_group(g, samples))
        .collect();

    // 5) Contour surface over the whole selection.
    let contour = build_contour_field_with(&points, config.grid_size, config.level_count);

    info!(
        selection = %config.selection.describe(),
        rated_speed,
        rows = selected.len(),
        points = points.len(),
        groups = groups.len(),
        "pipeline run complete"
    );

    Ok(RunOutput {
        selection: config.selection.clone(),
        rated_speed,
        rated_speed_source,
        rows_selected: selected.len(),
        points,
        groups,
        contour,
    })
}

fn analyze_group(group: CurveGroup<'_>, samples: usize) -> GroupAnalysis<'_> {
    let head_curve = smooth_with(&group.head_pairs(), samples);
    let efficiency = group.efficiency_pairs();
    let efficiency_curve = (!efficiency.is_empty()).then(|| smooth_with(&efficiency, samples));
    let npsh_required = group.npsh_pairs();

    GroupAnalysis {
        group,
        head_curve,
        efficiency_curve,
        npsh_required,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::domain::{
        DEFAULT_GRID_SIZE, DEFAULT_LEVEL_COUNT, DEFAULT_SMOOTH_SAMPLES, DiameterKey, Fallback, SmoothKind,
        TestPoint,
    };

    fn row(row_id: usize, speed: f64, flow: f64, head: f64, eff: f64, dia: &str) -> TestPoint {
        TestPoint {
            row_id,
            pump: "P1".to_string(),
            stages: Some(1),
            test_type: Some("SP".to_string()),
            speed: Some(speed),
            flow: Some(flow),
            head: Some(head),
            efficiency: Some(eff),
            power: None,
            impeller_dia: Some(dia.to_string()),
            testpoint: Some(row_id as u32 + 1),
            npsh_required: None,
        }
    }

    fn config(rated_speed: Option<f64>) -> RunConfig {
        RunConfig {
            data_path: PathBuf::from("test.csv"),
            selection: Selection {
                pumps: vec!["P1".to_string()],
                stages: 1,
                test_type: "SP".to_string(),
            },
            rated_speed,
            samples: DEFAULT_SMOOTH_SAMPLES,
            grid_size: DEFAULT_GRID_SIZE,
            level_count: DEFAULT_LEVEL_COUNT,
            export: None,
        }
    }

    #[test]
    fn three_point_scenario_end_to_end() {
        let table = TestTable::new(vec![
            row(0, 1450.0, 100.0, 50.0, 70.0, "200"),
            row(1, 1450.0, 150.0, 45.0, 80.0, "200"),
            row(2, 1450.0, 200.0, 30.0, 65.0, "200"),
        ]);
        let run = run_pipeline(&table, &config(Some(1450.0))).unwrap();

        // Identity normalization.
        for p in &run.points {
            assert_eq!(Some(p.flow), p.source.flow);
            assert_eq!(Some(p.head), p.source.head);
        }

        assert_eq!(run.groups.len(), 1);
        let g = &run.groups[0];
        assert_eq!(g.group.key().diameter, DiameterKey::Known(200.0));
        let flows: Vec<f64> = g.group.members().iter().map(|m| m.flow).collect();
        assert_eq!(flows, vec![100.0, 150.0, 200.0]);

        let cp = g.characteristic_points().unwrap();
        assert_eq!(cp.best_efficiency.map(|p| p.flow), Some(150.0));
        assert_eq!(cp.shutoff.flow, 100.0);
        assert_eq!(cp.runout.flow, 200.0);

        assert_eq!(
            g.head_curve.kind,
            SmoothKind::Passthrough { fallback: Fallback::TooFewPoints { distinct: 3 } }
        );
        assert_eq!(g.head_curve.points, vec![(100.0, 50.0), (150.0, 45.0), (200.0, 30.0)]);

        // Three non-collinear points: a (partially defined) field and 8 levels in [65, 80].
        assert!(!run.contour.field.is_empty());
        assert_eq!(run.contour.levels.len(), 8);
        assert_eq!(run.contour.levels[0].value, 65.0);
        assert_eq!(run.contour.levels[7].value, 80.0);
    }

    #[test]
    fn off_speed_rows_and_default_rated_speed() {
        let table = TestTable::new(vec![
            row(0, 1500.0, 100.0, 20.0, 60.0, "250/250"),
            row(1, 1500.0, 150.0, 18.0, 70.0, "250"),
            row(2, 0.0, 175.0, 15.0, 72.0, "250"),
            row(3, 1500.0, 200.0, 14.0, 71.0, "250"),
            row(4, 1500.0, 250.0, 10.0, 66.0, "250"),
        ]);
        let run = run_pipeline(&table, &config(Some(3000.0))).unwrap();
        assert_eq!(run.rows_selected, 5);
        assert_eq!(run.points.len(), 4);
        assert!((run.points[0].flow - 200.0).abs() < 1e-12);
        assert!((run.points[0].head - 80.0).abs() < 1e-12);

        let g = &run.groups[0];
        assert_eq!(g.group.len(), 4);
        assert!(g.head_curve.is_spline());
        assert_eq!(g.head_curve.points.len(), DEFAULT_SMOOTH_SAMPLES);
        assert!(g.efficiency_curve.as_ref().is_some_and(|c| c.is_spline()));

        let run = run_pipeline(&table, &config(None)).unwrap();
        assert_eq!(run.rated_speed, 1500.0);
        assert_eq!(run.rated_speed_source, RatedSpeedSource::Mean);
    }

    #[test]
    fn groups_are_ordered_by_diameter() {
        let table = TestTable::new(vec![
            row(0, 1450.0, 100.0, 50.0, 70.0, "220"),
            row(1, 1450.0, 90.0, 40.0, 70.0, "180"),
            row(2, 1450.0, 95.0, 45.0, 70.0, "n/a"),
            row(3, 1450.0, 120.0, 42.0, 75.0, "200"),
        ]);
        let run = run_pipeline(&table, &config(None)).unwrap();
        let labels: Vec<String> = run.groups.iter().map(|g| g.group.key().diameter.label()).collect();
        assert_eq!(labels, vec!["180", "200", "220", "unknown"]);
        let total: usize = run.groups.iter().map(|g| g.group.len()).sum();
        assert_eq!(total, run.points.len());
    }

    #[test]
    fn invalid_inputs_are_typed_errors() {
        let table = TestTable::new(vec![row(0, 1450.0, 100.0, 50.0, 70.0, "200")]);
        assert!(matches!(
            run_pipeline(&table, &config(Some(-10.0))),
            Err(CurveError::InvalidRatedSpeed(_))
        ));

        let mut other = config(None);
        other.selection.test_type = "DP".to_string();
        assert!(matches!(run_pipeline(&table, &other), Err(CurveError::EmptySelection(_))));

        let zero = TestTable::new(vec![row(0, 0.0, 100.0, 50.0, 70.0, "200")]);
        assert!(matches!(run_pipeline(&zero, &config(None)), Err(CurveError::NoValidSpeed)));
        assert!(matches!(
            run_pipeline(&zero, &config(Some(1450.0))),
            Err(CurveError::EmptySelection(_))
        ));
    }
}
