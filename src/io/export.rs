//! Export a pipeline run to JSON.
//!
//! The file carries everything a renderer needs: per-group points (measured
//! and normalized), smooth curves, characteristic points by row id, and the
//! contour surface. The schema is defined by `domain::RunFile`.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use chrono::Utc;

use crate::app::pipeline::{GroupAnalysis, RunOutput};
use crate::domain::{GroupFile, NormalizedPoint, PointRecord, RunFile};
use crate::error::CurveError;

/// Write a run file.
pub fn write_run_json(path: &Path, run: &RunOutput<'_>) -> Result<(), CurveError> {
    let file = File::create(path).map_err(|source| CurveError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::to_writer_pretty(BufWriter::new(file), &run_file(run))?;
    Ok(())
}

/// Read a run file back.
pub fn read_run_json(path: &Path) -> Result<RunFile, CurveError> {
    let file = File::open(path).map_err(|source| CurveError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
}

/// Build the serializable view of a run.
pub fn run_file(run: &RunOutput<'_>) -> RunFile {
    RunFile {
        tool: "pc".to_string(),
        generated_at: Utc::now(),
        selection: run.selection.clone(),
        rated_speed: run.rated_speed,
        rated_speed_source: run.rated_speed_source,
        groups: run.groups.iter().map(group_file).collect(),
        contour: run.contour.clone(),
    }
}

fn group_file(analysis: &GroupAnalysis<'_>) -> GroupFile {
    let cp = analysis.characteristic_points();
    let key = analysis.group.key();
    GroupFile {
        pump: key.pump.clone(),
        diameter: key.diameter,
        points: analysis.group.members().iter().map(point_record).collect(),
        head_curve: analysis.head_curve.clone(),
        efficiency_curve: analysis.efficiency_curve.clone(),
        npsh_required: analysis.npsh_required.clone(),
        best_efficiency_row: cp.and_then(|c| c.best_efficiency).map(|p| p.row_id()),
        shutoff_row: cp.map(|c| c.shutoff.row_id()),
        runout_row: cp.map(|c| c.runout.row_id()),
    }
}

fn point_record(p: &NormalizedPoint<'_>) -> PointRecord {
    let src = p.source;
    PointRecord {
        row_id: src.row_id,
        testpoint: src.testpoint,
        flow: p.flow,
        head: p.head,
        measured_flow: src.flow,
        measured_head: src.head,
        speed: src.speed,
        efficiency: src.efficiency,
        power: src.power,
        impeller_dia: src.impeller_dia.clone(),
    }
}
