//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and installs logging
//! - parses CLI arguments
//! - loads the test table once
//! - resolves the selection and runs the pipeline
//! - prints reports and writes optional exports

use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{CatalogArgs, Command, CurveArgs, DATA_ENV, DEFAULT_DATA_FILE, DataArgs};
use crate::domain::{RunConfig, Selection, TestTable};
use crate::error::AppError;
use crate::io::ingest::{IngestedTable, load_test_table};

pub mod pipeline;

/// Entry point for the `pc` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = crate::cli::Cli::parse();
    match cli.command {
        Command::Curves(args) => handle_curves(args),
        Command::Catalog(args) => handle_catalog(args),
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn handle_curves(args: CurveArgs) -> Result<(), AppError> {
    let data_path = resolve_data_path(&args.data);
    let ingested = load(&data_path)?;
    let config = run_config_from_args(&args, data_path, &ingested.table)?;

    let run = pipeline::run_pipeline(&ingested.table, &config)?;
    println!("{}", crate::report::format_run_summary(&run));

    if let Some(path) = &config.export {
        crate::io::export::write_run_json(path, &run)?;
        info!(path = %path.display(), "wrote run export");
    }
    Ok(())
}

fn handle_catalog(args: CatalogArgs) -> Result<(), AppError> {
    let data_path = resolve_data_path(&args.data);
    let ingested = load(&data_path)?;
    let table = &ingested.table;

    let Some(pump) = args.pump else {
        print!("{}", crate::report::format_list("Pumps", &crate::catalog::pumps(table)));
        return Ok(());
    };

    let Some(stage) = args.stage else {
        let stages = crate::catalog::stages(table, std::slice::from_ref(&pump));
        print!("{}", crate::report::format_list(&format!("Stages for {pump}"), &stages));
        return Ok(());
    };

    let types = crate::catalog::test_types(table, &pump, stage);
    print!(
        "{}",
        crate::report::format_list(&format!("Test types for {pump}, {stage} stage(s)"), &types)
    );
    match crate::catalog::speed_summary(table, &pump, stage) {
        Some(summary) => print!("{}", crate::report::format_speed_summary(&summary)),
        None => println!("Speeds: no valid speed data"),
    }
    Ok(())
}

fn load(path: &std::path::Path) -> Result<IngestedTable, AppError> {
    let ingested = load_test_table(path)?;
    if !ingested.row_errors.is_empty() {
        eprint!(
            "{}",
            crate::report::format_row_errors(&ingested.row_errors, ingested.rows_read)
        );
    }
    if ingested.table.is_empty() {
        return Err(AppError::new(3, format!("No usable rows in '{}'.", path.display())));
    }
    Ok(ingested)
}

/// `--data`, then `$PUMP_CURVES_DATA`, then `test.csv`.
pub fn resolve_data_path(args: &DataArgs) -> PathBuf {
    args.data
        .clone()
        .or_else(|| std::env::var_os(DATA_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_FILE))
}

/// Build the run config, filling unspecified pump/stage from the data.
pub fn run_config_from_args(args: &CurveArgs, data_path: PathBuf, table: &TestTable) -> Result<RunConfig, AppError> {
    let pumps = if args.pumps.is_empty() {
        let first = crate::catalog::pumps(table)
            .into_iter()
            .next()
            .ok_or_else(|| AppError::new(3, "No pump types in the data."))?;
        vec![first]
    } else {
        args.pumps.clone()
    };

    let stages = match args.stage {
        Some(s) => s,
        None => crate::catalog::stages(table, &pumps)
            .into_iter()
            .next()
            .ok_or_else(|| AppError::new(3, format!("No stage data for pump(s) {}.", pumps.join(", "))))?,
    };

    Ok(RunConfig {
        data_path,
        selection: Selection {
            pumps,
            stages,
            test_type: args.test_type.clone(),
        },
        rated_speed: args.rated_speed,
        samples: args.samples,
        grid_size: args.grid,
        level_count: usize::from(args.levels),
        export: args.export.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TestPoint;

    fn row(row_id: usize, pump: &str, stages: u32) -> TestPoint {
        TestPoint {
            row_id,
            pump: pump.to_string(),
            stages: Some(stages),
            test_type: Some("SP".to_string()),
            speed: Some(1450.0),
            flow: Some(1.0),
            head: Some(1.0),
            efficiency: None,
            power: None,
            impeller_dia: None,
            testpoint: None,
            npsh_required: None,
        }
    }

    #[test]
    fn selection_defaults_come_from_the_data() {
        let table = TestTable::new(vec![row(0, "Z", 1), row(1, "B", 4), row(2, "B", 2)]);
        let cli = crate::cli::Cli::parse_from(["pc", "curves", "--data", "x.csv"]);
        let Command::Curves(args) = cli.command else {
            panic!("expected curves");
        };
        let config = run_config_from_args(&args, resolve_data_path(&args.data), &table).unwrap();
        assert_eq!(config.selection.pumps, vec!["B"]);
        assert_eq!(config.selection.stages, 2);
        assert_eq!(config.data_path, PathBuf::from("x.csv"));
        assert_eq!(config.level_count, 8);
    }

    #[test]
    fn missing_stage_data_is_an_error() {
        let mut r = row(0, "A", 1);
        r.stages = None;
        let table = TestTable::new(vec![r]);
        let cli = crate::cli::Cli::parse_from(["pc", "curves"]);
        let Command::Curves(args) = cli.command else {
            panic!("expected curves");
        };
        let err = run_config_from_args(&args, PathBuf::from("t.csv"), &table).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
