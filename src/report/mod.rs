//! Terminal reporting for runs and catalog queries.

pub mod format;

pub use format::*;
