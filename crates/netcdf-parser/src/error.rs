//! Error types for NetCDF parsing operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for NetCDF parser operations.
pub type NetCdfResult<T> = Result<T, NetCdfError>;

/// Error types for NetCDF parsing.
#[derive(Error, Debug)]
pub enum NetCdfError {
    /// The file could not be opened (missing, unreadable or not netCDF).
    #[error("Failed to open {path}: {message}")]
    Open { path: PathBuf, message: String },

    /// Missing required variable or attribute
    #[error("Missing required data: {0}")]
    MissingData(String),

    /// Invalid data format
    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    /// Error reported by the netCDF library while reading
    #[error("NetCDF read failed: {0}")]
    Read(#[from] netcdf::Error),
}

impl NetCdfError {
    pub(crate) fn open(path: impl Into<PathBuf>, err: netcdf::Error) -> Self {
        Self::Open {
            path: path.into(),
            message: err.to_string(),
        }
    }
}
