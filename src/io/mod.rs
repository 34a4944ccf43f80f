//! Input/output helpers.
//!
//! - CSV ingest into a fixed-schema `TestTable` (`ingest`)
//! - run export to JSON (`export`)

pub mod export;
pub mod ingest;

pub use export::*;
pub use ingest::*;
