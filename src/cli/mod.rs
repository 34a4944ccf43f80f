//! Command-line parsing for the pump curve tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the numeric code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::{DEFAULT_GRID_SIZE, DEFAULT_LEVEL_COUNT, DEFAULT_SMOOTH_SAMPLES};

/// Environment variable holding the default CSV path.
pub const DATA_ENV: &str = "PUMP_CURVES_DATA";

/// CSV path used when neither `--data` nor the environment names one.
pub const DEFAULT_DATA_FILE: &str = "test.csv";

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "pc", version, about = "Pump performance curves from test-bench data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Normalize, group and smooth curves for a selection; print a summary and optionally export JSON.
    Curves(CurveArgs),
    /// List pumps, stages and test types available in the data.
    Catalog(CatalogArgs),
}

#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Test-bench CSV file (defaults to $PUMP_CURVES_DATA, then `test.csv`).
    #[arg(long, value_name = "CSV")]
    pub data: Option<PathBuf>,
}

/// Options for a curve run.
#[derive(Debug, Parser, Clone)]
pub struct CurveArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Pump type(s) to include (repeatable). Defaults to the first pump in the data.
    #[arg(short = 'p', long = "pump")]
    pub pumps: Vec<String>,

    /// Stage count. Defaults to the first stage count recorded for the pumps.
    #[arg(short = 's', long)]
    pub stage: Option<u32>,

    /// Test type (e.g. SP, DP).
    #[arg(short = 't', long, default_value = "SP")]
    pub test_type: String,

    /// Rated speed (RPM). Defaults to the mean of valid measured speeds.
    #[arg(short = 'r', long)]
    pub rated_speed: Option<f64>,

    /// Samples per smoothed curve.
    #[arg(long, default_value_t = DEFAULT_SMOOTH_SAMPLES)]
    pub samples: usize,

    /// Contour grid nodes per axis.
    #[arg(long, default_value_t = DEFAULT_GRID_SIZE)]
    pub grid: usize,

    /// Number of efficiency iso-levels (6 to 8).
    #[arg(long, default_value_t = DEFAULT_LEVEL_COUNT as u8, value_parser = clap::value_parser!(u8).range(6..=8))]
    pub levels: u8,

    /// Export the run (points, curves, characteristic points, contour) to JSON.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}

/// Options for catalog listing.
#[derive(Debug, Parser, Clone)]
pub struct CatalogArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// List stage counts for this pump.
    #[arg(short = 'p', long)]
    pub pump: Option<String>,

    /// With `--pump`, list test types and speeds for this stage count.
    #[arg(short = 's', long, requires = "pump")]
    pub stage: Option<u32>,
}
