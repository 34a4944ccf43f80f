//! Error types.
//!
//! Two layers:
//!
//! - [`CurveError`]: typed errors raised by the library (bad rated speed, empty
//!   selection, unreadable input). Degenerate-but-valid outputs (raw passthrough
//!   curves, empty contour fields) are *not* errors and never show up here.
//! - [`AppError`]: what the `pc` binary reports, carrying a process exit code.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CurveError {
    #[error("rated speed must be a positive, finite number of RPM (got {0})")]
    InvalidRatedSpeed(f64),
    #[error("no valid (positive) measured speed in the selection; cannot derive a rated speed")]
    NoValidSpeed,
    #[error("no test points match {0}")]
    EmptySelection(String),
    #[error("missing required column: `{0}`")]
    MissingColumn(&'static str),
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CurveError {
    /// Exit code used by the binary for this error.
    ///
    /// - `2`: bad input (arguments, files, schema)
    /// - `3`: nothing left to compute after filtering
    pub fn exit_code(&self) -> u8 {
        match self {
            CurveError::EmptySelection(_) | CurveError::NoValidSpeed => 3,
            _ => 2,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<CurveError> for AppError {
    fn from(err: CurveError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_maps_to_exit_code_3() {
        let err: AppError = CurveError::EmptySelection("pump P1".to_string()).into();
        assert_eq!(err.exit_code(), 3);
        assert!(err.to_string().contains("pump P1"));
    }

    #[test]
    fn invalid_rated_speed_maps_to_exit_code_2() {
        let err: AppError = CurveError::InvalidRatedSpeed(-1.0).into();
        assert_eq!(err.exit_code(), 2);
    }
}
