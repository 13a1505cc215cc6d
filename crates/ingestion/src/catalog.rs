//! Catalog ingestion requests built from sidecar records.
//!
//! The asset catalog accepts property keys made of ASCII letters, digits and
//! underscores, at most 40 characters long, and property values under 1 KiB.
//! Everything here is pure; issuing the requests is left to the caller.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use flood_common::{AttributeMap, NO_DATA};

use crate::error::{IngestionError, Result};
use crate::record::FileRecord;

/// Longest property key the catalog accepts.
pub const MAX_KEY_LEN: usize = 40;

/// Values at or above this many bytes are truncated.
pub const MAX_VALUE_BYTES: usize = 1024;

/// Characters kept from a truncated value.
pub const TRUNCATED_VALUE_CHARS: usize = 500;

/// Appended to truncated values.
pub const TRUNCATION_MARKER: &str = "  (too long, see netcdf for full details)..";

/// Variable attributes with this suffix carry the fill value, which is
/// passed to the catalog as the no-data value instead.
const FILL_VALUE_SUFFIX: &str = "__FillValue";

/// Make `key` acceptable as a catalog property name.
///
/// Hyphens become underscores, every other character outside
/// `[A-Za-z0-9_]` is dropped, and the result is cut to 40 characters.
pub fn make_key_valid(key: &str) -> String {
    key.chars()
        .map(|c| if c == '-' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .take(MAX_KEY_LEN)
        .collect()
}

/// Make `value` acceptable as a catalog property value.
///
/// Values of 1024 bytes or more keep their first 500 characters followed by
/// a truncation marker.
pub fn make_value_valid(value: &str) -> String {
    if value.len() < MAX_VALUE_BYTES {
        return value.to_string();
    }
    let mut truncated: String = value.chars().take(TRUNCATED_VALUE_CHARS).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

/// Type annotation understood by the catalog's property syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    String,
    Number,
    Date,
}

impl PropertyKind {
    fn prefix(&self) -> &'static str {
        match self {
            PropertyKind::String => "(string)",
            PropertyKind::Number => "(number)",
            PropertyKind::Date => "(date)",
        }
    }
}

/// One sanitized property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub key: String,
    pub kind: PropertyKind,
    pub value: String,
}

impl Property {
    /// `(kind)key=value`, as passed after `-p`.
    pub fn to_arg(&self) -> String {
        format!("{}{}={}", self.kind.prefix(), self.key, self.value)
    }
}

/// Where rasters live and where assets go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    /// Image collection receiving the assets.
    pub collection_path: String,
    /// Prefix of the storage location holding the uploaded rasters.
    pub raster_uri_prefix: String,
    pub raster_extension: String,
    pub ingested_by: String,
    pub ingestion_date: NaiveDate,
}

/// One image upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestRequest {
    pub asset_id: String,
    pub source_uri: String,
    pub no_data: f32,
    pub properties: Vec<Property>,
}

impl IngestRequest {
    /// Build the upload request for a record.
    ///
    /// Properties are `ingested_by` and `ingestion_date`, then the filename
    /// fields, global attributes and variable attributes in that order. A
    /// sanitized key that repeats an earlier one replaces its value in place.
    pub fn from_record(record: &FileRecord, options: &RequestOptions) -> Self {
        let base = record.base_name();

        let mut properties = vec![
            Property {
                key: "ingested_by".to_string(),
                kind: PropertyKind::String,
                value: options.ingested_by.clone(),
            },
            Property {
                key: "ingestion_date".to_string(),
                kind: PropertyKind::Date,
                value: options.ingestion_date.format("%Y-%m-%d").to_string(),
            },
        ];

        for map in [
            &record.properties_from_filename,
            &record.global_attributes,
            &record.variable_attributes,
        ] {
            for property in attribute_properties(map) {
                match properties.iter_mut().find(|p| p.key == property.key) {
                    Some(existing) => *existing = property,
                    None => properties.push(property),
                }
            }
        }

        Self {
            asset_id: format!("{}/{}", options.collection_path.trim_end_matches('/'), base),
            source_uri: format!(
                "{}/{}.{}",
                options.raster_uri_prefix.trim_end_matches('/'),
                base,
                options.raster_extension
            ),
            no_data: NO_DATA,
            properties,
        }
    }

    /// Arguments for `earthengine`, without the program name.
    pub fn to_command_args(&self) -> Vec<String> {
        let mut args = vec![
            "upload".to_string(),
            "image".to_string(),
            format!("--asset_id={}", self.asset_id),
            self.source_uri.clone(),
            format!("--nodata_value={}", self.no_data),
        ];
        for property in &self.properties {
            args.push("-p".to_string());
            args.push(property.to_arg());
        }
        args
    }
}

fn attribute_properties(map: &AttributeMap) -> impl Iterator<Item = Property> + '_ {
    map.iter()
        .filter(|(key, _)| !key.ends_with(FILL_VALUE_SUFFIX))
        .filter_map(|(key, value)| {
            let mut key = make_key_valid(key);
            if key.is_empty() {
                return None;
            }
            let kind = if value.is_numeric() {
                PropertyKind::Number
            } else {
                PropertyKind::String
            };
            let value = make_value_valid(&value.to_string());
            if key == "year" && value == "hist" {
                key = "year_string".to_string();
            }
            Some(Property { key, kind, value })
        })
}

/// Sidecar files under `dir`, sorted by path.
pub fn find_sidecars(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let suffix = format!(".{}", extension);
    let mut paths = Vec::new();
    for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| IngestionError::FileRead(e.into()))?;
        if entry.file_type().is_file() && entry.file_name().to_string_lossy().ends_with(&suffix) {
            paths.push(entry.into_path());
        }
    }
    Ok(paths)
}
