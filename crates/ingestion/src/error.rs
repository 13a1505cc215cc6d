//! Error types for the ingestion crate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during conversion and ingestion.
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Unrecognized filename schema for '{filename}': {token_count} tokens")]
    UnrecognizedSchema { filename: String, token_count: usize },

    #[error("Unrecognized time units: '{0}'")]
    UnrecognizedTimeUnits(String),

    #[error("Invalid time offset {offset} for units '{units}'")]
    InvalidTimeOffset { units: String, offset: f64 },

    #[error("Failed to parse NetCDF data: {0}")]
    NetcdfParse(#[from] netcdf_parser::NetCdfError),

    #[error("Invalid raster: {0}")]
    InvalidRaster(String),

    #[error("Failed to write raster: {0}")]
    RasterWrite(String),

    #[error("Failed to write sidecar: {0}")]
    Sidecar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Catalog request failed: {0}")]
    Catalog(String),
}

/// Coarse classification of a failure, carried in job results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnrecognizedSchema,
    UnrecognizedTimeUnits,
    SourceRead,
    RasterWrite,
    Sidecar,
    Config,
    Catalog,
    /// The job panicked.
    Panic,
}

impl IngestionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            IngestionError::FileRead(_)
            | IngestionError::NetcdfParse(_)
            | IngestionError::InvalidRaster(_) => ErrorKind::SourceRead,
            IngestionError::UnrecognizedSchema { .. } => ErrorKind::UnrecognizedSchema,
            IngestionError::UnrecognizedTimeUnits(_) | IngestionError::InvalidTimeOffset { .. } => {
                ErrorKind::UnrecognizedTimeUnits
            }
            IngestionError::RasterWrite(_) => ErrorKind::RasterWrite,
            IngestionError::Sidecar(_) => ErrorKind::Sidecar,
            IngestionError::InvalidConfig(_) => ErrorKind::Config,
            IngestionError::Catalog(_) => ErrorKind::Catalog,
        }
    }
}

impl From<tiff::TiffError> for IngestionError {
    fn from(e: tiff::TiffError) -> Self {
        IngestionError::RasterWrite(e.to_string())
    }
}

impl From<bincode::Error> for IngestionError {
    fn from(e: bincode::Error) -> Self {
        IngestionError::Sidecar(e.to_string())
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let err = IngestionError::UnrecognizedTimeUnits("hours since 2000".into());
        assert_eq!(err.kind(), ErrorKind::UnrecognizedTimeUnits);

        let err = IngestionError::FileRead(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        assert_eq!(err.kind(), ErrorKind::SourceRead);
    }

    #[test]
    fn test_display_includes_filename() {
        let err = IngestionError::UnrecognizedSchema {
            filename: "a_b.nc".into(),
            token_count: 2,
        };
        assert_eq!(
            err.to_string(),
            "Unrecognized filename schema for 'a_b.nc': 2 tokens"
        );
    }
}
