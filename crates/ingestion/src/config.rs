//! Configuration for the netCDF to GeoTIFF conversion run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

use flood_common::NO_DATA;

use crate::error::{IngestionError, Result};

/// Default number of conversion workers.
///
/// Each worker holds a full decoded slice plus its encoded raster, so the
/// pool is kept small.
pub const DEFAULT_WORKERS: usize = 3;

/// Record count kept by testing mode when no explicit limit is given.
pub const DEFAULT_TESTING_LIMIT: usize = 10;

/// Configuration for one conversion run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Directory tree searched for source files.
    pub input_dir: PathBuf,

    /// Directory receiving rasters and sidecars.
    pub output_dir: PathBuf,

    /// Source file extension, without the dot.
    pub input_extension: String,

    /// Raster file extension, without the dot.
    pub raster_extension: String,

    /// Sidecar file extension, without the dot.
    pub sidecar_extension: String,

    /// Number of parallel conversion workers.
    pub workers: usize,

    /// Process only the first N discovered records.
    pub testing_limit: Option<usize>,

    /// Remove and recreate `output_dir` before converting.
    pub reset_output: bool,

    /// No-data value written into rasters.
    pub no_data: f32,

    /// Raster compression codec.
    pub compression: RasterCompression,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("data/netcdf"),
            output_dir: PathBuf::from("data/geotiff"),
            input_extension: "nc".to_string(),
            raster_extension: "tif".to_string(),
            sidecar_extension: "meta".to_string(),
            workers: DEFAULT_WORKERS,
            testing_limit: None,
            reset_output: true,
            no_data: NO_DATA,
            compression: RasterCompression::Lzw,
        }
    }
}

impl ConversionConfig {
    /// Defaults overridden from `CONVERTER_*` environment variables.
    ///
    /// Unparseable numbers and unknown compression names are errors.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("CONVERTER_INPUT_DIR") {
            config.input_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("CONVERTER_OUTPUT_DIR") {
            config.output_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("CONVERTER_INPUT_EXTENSION") {
            config.input_extension = val;
        }

        if let Ok(val) = std::env::var("CONVERTER_WORKERS") {
            config.workers = val.parse().map_err(|e| {
                IngestionError::InvalidConfig(format!("CONVERTER_WORKERS '{}': {}", val, e))
            })?;
        }

        if let Ok(val) = std::env::var("CONVERTER_TESTING_LIMIT") {
            let limit = val.parse().map_err(|e| {
                IngestionError::InvalidConfig(format!("CONVERTER_TESTING_LIMIT '{}': {}", val, e))
            })?;
            config.testing_limit = Some(limit);
        }

        if let Ok(val) = std::env::var("CONVERTER_RESET_OUTPUT") {
            config.reset_output = val.to_lowercase() == "true" || val == "1";
        }

        if let Ok(val) = std::env::var("CONVERTER_COMPRESSION") {
            config.compression = val.parse()?;
        }

        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(IngestionError::InvalidConfig(
                "workers must be > 0".to_string(),
            ));
        }

        for (name, ext) in [
            ("input_extension", &self.input_extension),
            ("raster_extension", &self.raster_extension),
            ("sidecar_extension", &self.sidecar_extension),
        ] {
            if ext.is_empty() || ext.contains('.') {
                return Err(IngestionError::InvalidConfig(format!(
                    "{} must be a non-empty extension without dots, got '{}'",
                    name, ext
                )));
            }
        }

        if self.raster_extension == self.sidecar_extension {
            return Err(IngestionError::InvalidConfig(
                "raster and sidecar extensions must differ".to_string(),
            ));
        }

        if self.input_dir == self.output_dir {
            return Err(IngestionError::InvalidConfig(format!(
                "input and output directories are the same: {}",
                self.input_dir.display()
            )));
        }

        if self.reset_output && self.input_dir.starts_with(&self.output_dir) {
            return Err(IngestionError::InvalidConfig(format!(
                "resetting {} would delete the input directory",
                self.output_dir.display()
            )));
        }

        if self.testing_limit == Some(0) {
            return Err(IngestionError::InvalidConfig(
                "testing_limit must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Compression codec for GeoTIFF output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RasterCompression {
    /// No compression.
    None,
    /// LZW.
    #[default]
    Lzw,
    /// Deflate (zlib).
    Deflate,
}

impl FromStr for RasterCompression {
    type Err = IngestionError;

    /// Case-insensitive; unknown names are rejected.
    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Self::None),
            "lzw" => Ok(Self::Lzw),
            "deflate" => Ok(Self::Deflate),
            other => Err(IngestionError::InvalidConfig(format!(
                "unknown compression '{}', expected lzw, deflate or none",
                other
            ))),
        }
    }
}

impl RasterCompression {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Lzw => "lzw",
            Self::Deflate => "deflate",
        }
    }
}

impl std::fmt::Display for RasterCompression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ConversionConfig::default();
        assert_eq!(config.workers, 3);
        assert_eq!(config.no_data, -9999.0);
        assert_eq!(config.compression, RasterCompression::Lzw);
        assert!(config.reset_output);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let config = ConversionConfig {
            workers: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(IngestionError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_validate_rejects_same_dirs() {
        let config = ConversionConfig {
            input_dir: PathBuf::from("/data"),
            output_dir: PathBuf::from("/data"),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_reset_of_input_parent() {
        let config = ConversionConfig {
            input_dir: PathBuf::from("/data/netcdf"),
            output_dir: PathBuf::from("/data"),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ConversionConfig {
            reset_output: false,
            ..config
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_extension() {
        let config = ConversionConfig {
            raster_extension: ".tif".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ConversionConfig {
            sidecar_extension: "tif".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_compression_parse() {
        assert_eq!("DEFLATE".parse::<RasterCompression>().unwrap(), RasterCompression::Deflate);
        assert_eq!("none".parse::<RasterCompression>().unwrap(), RasterCompression::None);
        assert_eq!("lzw".parse::<RasterCompression>().unwrap(), RasterCompression::Lzw);
        assert!(matches!(
            "deflat".parse::<RasterCompression>(),
            Err(IngestionError::InvalidConfig(_))
        ));
        assert_eq!(RasterCompression::Lzw.to_string(), "lzw");
    }
}
