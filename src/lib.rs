//! `pump-curves` library crate.
//!
//! Derives standardized pump performance curves from raw test-bench rows:
//! affinity-law speed normalization, grouping into physical curves, spline
//! smoothing, characteristic points (BEP, shutoff, runout) and an efficiency
//! contour surface.
//!
//! The binary (`pc`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the numeric pipeline can back other front-ends (API, dashboard)

pub mod app;
pub mod catalog;
pub mod cli;
pub mod contour;
pub mod curves;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod report;
