//! Flood inundation conversion library.
//!
//! Turns a directory of inundation netCDF files into north-up GeoTIFFs with
//! one metadata sidecar per raster, and builds catalog ingestion requests
//! from those sidecars.
//!
//! # Architecture
//!
//! This crate is used by both the `converter` and the `ingester` services.
//! A run goes through these stages:
//!
//! - Discovery of source files and filename parsing (5, 6 and 8 token
//!   schemas)
//! - Single-threaded attribute pre-extraction
//! - Pooled per-file conversion: time axis normalization, sentinel masking,
//!   vertical flip, global georeferencing, GeoTIFF and sidecar output
//! - Catalog request assembly from sidecars (key and value sanitization)

pub mod catalog;
pub mod config;
pub mod discovery;
pub mod error;
pub mod filename;
pub mod geotiff;
pub mod georef;
pub mod job;
pub mod pipeline;
pub mod pool;
pub mod record;
pub mod sanitize;
pub mod sidecar;
pub mod time;

// Re-exports
pub use catalog::{
    find_sidecars, make_key_valid, make_value_valid, IngestRequest, Property, PropertyKind,
    RequestOptions,
};
pub use config::{ConversionConfig, RasterCompression};
pub use discovery::{discover_files, extract_all, RecordSet};
pub use error::{ErrorKind, IngestionError, Result};
pub use filename::{filename_stem, parse_filename, FilenameSchema};
pub use geotiff::RasterWriter;
pub use georef::{Georeference, GeoreferenceBuilder};
pub use job::{ConversionJob, JobFailure, JobResult, JobSuccess};
pub use pipeline::{ConversionPipeline, RunSummary};
pub use pool::WorkerPool;
pub use record::FileRecord;
pub use sanitize::{RasterSanitizer, Sanitized};
pub use sidecar::{read_sidecar, write_sidecar};
pub use time::{normalize_time, TimeEpoch};
