//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw measured rows (`TestPoint`) and the immutable table that owns them (`TestTable`)
//! - speed-normalized points (`NormalizedPoint`) and their grouping (`CurveGroup`, `GroupKey`)
//! - derived outputs (`SmoothCurve`, `CharacteristicPoints`, `ContourSurface`)
//! - run configuration and the exported run file schema

pub mod types;

pub use types::*;
