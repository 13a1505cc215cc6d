//! Source file discovery and metadata pre-extraction.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use netcdf_parser::MetadataExtractor;

use crate::error::{IngestionError, Result};
use crate::record::FileRecord;

/// Records keyed by discovery id.
pub type RecordSet = BTreeMap<u64, FileRecord>;

/// Walk `input_dir` recursively and create a record for every file named
/// `*.{extension}`.
///
/// Entries are visited in file-name order within each directory, so ids
/// are stable between runs over the same tree.
///
/// Outputs share one flat directory keyed by base name, so only the first
/// file with a given base name is kept; later ones are skipped with a
/// warning.
pub fn discover_files(input_dir: &Path, extension: &str) -> Result<RecordSet> {
    let suffix = format!(".{}", extension);
    let mut records = RecordSet::new();
    let mut seen: HashMap<String, PathBuf> = HashMap::new();
    let mut next_id = 0u64;

    for entry in walkdir::WalkDir::new(input_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| IngestionError::FileRead(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let Some(filename) = entry.file_name().to_str() else {
            warn!(path = %entry.path().display(), "Skipping non UTF-8 filename");
            continue;
        };
        if !filename.ends_with(&suffix) {
            continue;
        }

        let root = entry.path().parent().unwrap_or(input_dir);
        let record = FileRecord::new(next_id, root, filename);
        if let Some(first) = seen.get(record.base_name()) {
            warn!(
                path = %entry.path().display(),
                first = %first.display(),
                base_name = %record.base_name(),
                "Skipping file with duplicate base name"
            );
            continue;
        }
        seen.insert(record.base_name().to_string(), entry.path().to_path_buf());
        records.insert(next_id, record);
        next_id += 1;
    }

    info!(
        input_dir = %input_dir.display(),
        extension,
        count = records.len(),
        "Discovered source files"
    );
    Ok(records)
}

/// Fill in global and variable attributes for every record.
///
/// Runs single-threaded before any conversion. A file that cannot be read
/// is logged and keeps empty attribute maps; its conversion job will hit
/// the same error and report it. Returns the number of failed files.
pub fn extract_all(records: &mut RecordSet, extractor: &MetadataExtractor) -> usize {
    let mut failures = 0;
    for record in records.values_mut() {
        match extractor.extract(&record.source_path()) {
            Ok(metadata) => {
                debug!(
                    file = %record.filename,
                    variable = %metadata.variable_name,
                    "Extracted attributes"
                );
                record.global_attributes = metadata.global;
                record.variable_attributes = metadata.variable;
            }
            Err(e) => {
                warn!(file = %record.filename, error = %e, "Attribute extraction failed");
                failures += 1;
            }
        }
    }
    failures
}

/// Keep only the first `limit` records by id.
pub fn truncate(records: &mut RecordSet, limit: usize) {
    if let Some(&cutoff) = records.keys().nth(limit) {
        records.retain(|id, _| *id < cutoff);
    }
}
