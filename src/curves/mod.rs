//! Per-curve processing.
//!
//! Responsibilities:
//!
//! - rescale measured points to a rated speed (affinity laws)
//! - partition normalized points into physical curves
//! - smooth each curve for rendering
//! - locate BEP / shutoff / runout

pub mod affinity;
pub mod characteristic;
pub mod grouping;
pub mod smoothing;

pub use affinity::*;
pub use characteristic::*;
pub use grouping::*;
pub use smoothing::*;
