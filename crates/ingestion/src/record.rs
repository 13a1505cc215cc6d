//! Per-file metadata records.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use flood_common::AttributeMap;

use crate::filename::{filename_stem, parse_filename};

/// Everything known about one discovered source file.
///
/// Populated during discovery and pre-extraction, then only read. The
/// terminal state is written out as the sidecar.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Discovery-order identifier.
    pub id: u64,
    /// Directory the file was found in.
    pub root: PathBuf,
    /// File name including extension.
    pub filename: String,
    /// Fields parsed from the filename; empty for unrecognized schemas.
    pub properties_from_filename: AttributeMap,
    /// File-level netCDF attributes.
    pub global_attributes: AttributeMap,
    /// Measurement-variable attributes, keyed `{variable}_{attribute}`.
    pub variable_attributes: AttributeMap,
}

impl FileRecord {
    /// Create a record and parse its filename.
    ///
    /// An unrecognized filename schema is logged and leaves
    /// `properties_from_filename` empty.
    pub fn new(id: u64, root: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        let filename = filename.into();
        let properties_from_filename = match parse_filename(filename_stem(&filename)) {
            Ok(map) => map,
            Err(e) => {
                warn!(file = %filename, error = %e, "Filename does not match a known schema");
                AttributeMap::new()
            }
        };

        Self {
            id,
            root: root.into(),
            filename,
            properties_from_filename,
            global_attributes: AttributeMap::new(),
            variable_attributes: AttributeMap::new(),
        }
    }

    pub fn source_path(&self) -> PathBuf {
        self.root.join(&self.filename)
    }

    /// Filename without its extension; names the raster, the sidecar and
    /// the catalog asset.
    pub fn base_name(&self) -> &str {
        filename_stem(&self.filename)
    }

    /// Output path for this record with the given extension.
    pub fn output_path(&self, dir: &Path, extension: &str) -> PathBuf {
        dir.join(format!("{}.{}", self.base_name(), extension))
    }

    /// Filename fields, then global attributes, then variable attributes.
    ///
    /// A later key replaces an earlier one in place.
    pub fn merged_attributes(&self) -> AttributeMap {
        let mut merged = self.properties_from_filename.clone();
        merged.extend_from(&self.global_attributes);
        merged.extend_from(&self.variable_attributes);
        merged
    }
}
