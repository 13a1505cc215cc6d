//! Per-file conversion: netCDF first slice to GeoTIFF plus sidecar.

use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use netcdf_parser::{read_first_slice, MetadataExtractor};

use crate::config::ConversionConfig;
use crate::error::{ErrorKind, Result};
use crate::geotiff::RasterWriter;
use crate::georef::GeoreferenceBuilder;
use crate::record::FileRecord;
use crate::sanitize::RasterSanitizer;
use crate::sidecar::write_sidecar;
use crate::time::normalize_time;

/// Outputs of a successful conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSuccess {
    pub id: u64,
    pub filename: String,
    pub raster_path: PathBuf,
    pub sidecar_path: PathBuf,
    /// Normalized time axis of the source file.
    pub timestamps: Vec<NaiveDateTime>,
}

/// A conversion that did not complete.
///
/// Outputs written before the failure are left on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobFailure {
    pub id: u64,
    pub filename: String,
    pub kind: ErrorKind,
    pub message: String,
}

/// Outcome of one conversion attempt.
pub type JobResult = std::result::Result<JobSuccess, JobFailure>;

/// The per-file conversion procedure, shared by all workers.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    extractor: MetadataExtractor,
    sanitizer: RasterSanitizer,
    georeference: GeoreferenceBuilder,
    writer: RasterWriter,
    output_dir: PathBuf,
    raster_extension: String,
    sidecar_extension: String,
    no_data: f32,
}

impl ConversionJob {
    pub fn new(config: &ConversionConfig, extractor: MetadataExtractor) -> Self {
        Self {
            extractor,
            sanitizer: RasterSanitizer::new(config.no_data),
            georeference: GeoreferenceBuilder::default(),
            writer: RasterWriter::new(config.compression),
            output_dir: config.output_dir.clone(),
            raster_extension: config.raster_extension.clone(),
            sidecar_extension: config.sidecar_extension.clone(),
            no_data: config.no_data,
        }
    }

    /// Convert one record.
    ///
    /// Errors and panics inside the conversion both come back as a
    /// [`JobFailure`].
    pub fn run(&self, record: &FileRecord) -> JobResult {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.convert(record)));

        let failure = |kind: ErrorKind, message: String| {
            error!(file = %record.filename, kind = ?kind, error = %message, "Conversion failed");
            JobFailure {
                id: record.id,
                filename: record.filename.clone(),
                kind,
                message,
            }
        };

        match outcome {
            Ok(Ok(success)) => {
                info!(
                    file = %record.filename,
                    first_time = ?success.timestamps.first(),
                    "Converted"
                );
                Ok(success)
            }
            Ok(Err(e)) => Err(failure(e.kind(), e.to_string())),
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(failure(ErrorKind::Panic, message))
            }
        }
    }

    fn convert(&self, record: &FileRecord) -> Result<JobSuccess> {
        let source = record.source_path();

        let metadata = self.extractor.extract(&source)?;
        let mut record = record.clone();
        record.global_attributes = metadata.global;
        record.variable_attributes = metadata.variable;

        let slice = read_first_slice(&source, self.extractor.selection())?;
        let timestamps = normalize_time(&slice.time.units, &slice.time.values)?;

        let (rows, cols) = slice.grid.shape();
        if slice.axes.lats.len() != rows || slice.axes.lons.len() != cols {
            warn!(
                file = %record.filename,
                lats = slice.axes.lats.len(),
                lons = slice.axes.lons.len(),
                rows,
                cols,
                "Coordinate axes do not match slice shape"
            );
        }

        let sanitized = self.sanitizer.sanitize(slice.grid);
        let georef = self.georeference.build(rows, cols)?;

        let raster_path = record.output_path(&self.output_dir, &self.raster_extension);
        self.writer
            .write(&raster_path, &georef, &sanitized.grid, self.no_data)?;

        let sidecar_path = record.output_path(&self.output_dir, &self.sidecar_extension);
        write_sidecar(&sidecar_path, &record)?;

        Ok(JobSuccess {
            id: record.id,
            filename: record.filename.clone(),
            raster_path,
            sidecar_path,
            timestamps,
        })
    }
}
