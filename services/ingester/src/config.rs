//! Ingester configuration.

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use ingestion::RequestOptions;

/// Top-level ingester configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Directory holding the converter's sidecar files
    pub sidecar_dir: PathBuf,

    /// Sidecar file extension, without the dot
    pub sidecar_extension: String,

    /// Raster file extension, without the dot
    pub raster_extension: String,

    /// Cloud-storage prefix where the rasters were uploaded
    pub raster_uri_prefix: String,

    /// Image collection receiving the assets
    pub collection_path: String,

    /// Recorded on every asset as `ingested_by`
    pub ingested_by: String,

    /// Recorded on every asset as `ingestion_date`
    pub ingestion_date: NaiveDate,

    /// Number of concurrent uploads
    pub parallel_uploads: usize,

    /// Print upload commands instead of running them
    pub dry_run: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            sidecar_dir: PathBuf::from("data/geotiff"),
            sidecar_extension: "meta".to_string(),
            raster_extension: "tif".to_string(),
            raster_uri_prefix: "gs://aqueduct30_v01/floods/geotiff".to_string(),
            collection_path: "projects/aqueduct/floods/output/inundation".to_string(),
            ingested_by: "ingester".to_string(),
            ingestion_date: Utc::now().date_naive(),
            parallel_uploads: 1,
            dry_run: false,
        }
    }
}

impl IngestConfig {
    /// Load configuration from `INGEST_*` environment variables.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let ingestion_date = match env::var("INGEST_DATE") {
            Ok(val) => NaiveDate::parse_from_str(&val, "%Y-%m-%d")
                .map_err(|e| anyhow!("INGEST_DATE '{}' is not YYYY-MM-DD: {}", val, e))?,
            Err(_) => defaults.ingestion_date,
        };

        let parallel_uploads = match env::var("INGEST_PARALLEL_UPLOADS") {
            Ok(val) => val
                .parse()
                .map_err(|e| anyhow!("INGEST_PARALLEL_UPLOADS '{}': {}", val, e))?,
            Err(_) => defaults.parallel_uploads,
        };

        Ok(Self {
            sidecar_dir: env::var("INGEST_SIDECAR_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.sidecar_dir),
            sidecar_extension: env::var("INGEST_SIDECAR_EXTENSION")
                .unwrap_or(defaults.sidecar_extension),
            raster_extension: env::var("INGEST_RASTER_EXTENSION")
                .unwrap_or(defaults.raster_extension),
            raster_uri_prefix: env::var("INGEST_RASTER_URI_PREFIX")
                .unwrap_or(defaults.raster_uri_prefix),
            collection_path: env::var("INGEST_COLLECTION_PATH")
                .unwrap_or(defaults.collection_path),
            ingested_by: env::var("INGEST_INGESTED_BY").unwrap_or(defaults.ingested_by),
            ingestion_date,
            parallel_uploads,
            dry_run: env::var("INGEST_DRY_RUN")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(defaults.dry_run),
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.parallel_uploads == 0 {
            return Err(anyhow!("parallel_uploads must be > 0"));
        }
        if self.collection_path.trim_matches('/').is_empty() {
            return Err(anyhow!("collection_path must not be empty"));
        }
        Ok(())
    }

    /// Options for building upload requests.
    pub fn request_options(&self) -> RequestOptions {
        RequestOptions {
            collection_path: self.collection_path.clone(),
            raster_uri_prefix: self.raster_uri_prefix.clone(),
            raster_extension: self.raster_extension.clone(),
            ingested_by: self.ingested_by.clone(),
            ingestion_date: self.ingestion_date,
        }
    }
}
