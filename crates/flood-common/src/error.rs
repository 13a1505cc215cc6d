//! Error types shared across pipeline crates.

use thiserror::Error;

/// Result type alias using CommonError.
pub type CommonResult<T> = Result<T, CommonError>;

/// Errors raised while building shared domain values.
#[derive(Debug, Error)]
pub enum CommonError {
    #[error("grid data length {len} does not match shape {rows}x{cols}")]
    ShapeMismatch { rows: usize, cols: usize, len: usize },

    #[error("grid has an empty dimension: {rows}x{cols}")]
    EmptyGrid { rows: usize, cols: usize },
}
