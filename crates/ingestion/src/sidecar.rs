//! Sidecar persistence for file records.
//!
//! Sidecars are `bincode` encodings of [`FileRecord`]. The format is not
//! self-describing, so readers must use the same record definition.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{IngestionError, Result};
use crate::record::FileRecord;

/// Serialize `record` to `path`, replacing any existing file.
pub fn write_sidecar(path: &Path, record: &FileRecord) -> Result<()> {
    let write_err = |e: std::io::Error| {
        IngestionError::Sidecar(format!("{}: {}", path.display(), e))
    };
    let mut writer = BufWriter::new(File::create(path).map_err(write_err)?);
    bincode::serialize_into(&mut writer, record)?;
    writer.flush().map_err(write_err)?;
    Ok(())
}

/// Load a record previously written by [`write_sidecar`].
pub fn read_sidecar(path: &Path) -> Result<FileRecord> {
    let reader = BufReader::new(File::open(path)?);
    Ok(bincode::deserialize_from(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use flood_common::AttributeValue;

    #[test]
    fn test_record_survives_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rec.meta");

        let mut record = FileRecord::new(7, "/data", "inuncoast_historical_nosub_hist_rp0001_5.nc");
        record.global_attributes.insert("version", 2i64);
        record.global_attributes.insert("history", AttributeValue::FloatList(vec![0.5, 1.0]));
        record.variable_attributes.insert(
            "inun_created",
            NaiveDate::from_ymd_opt(2018, 8, 16)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
        );

        write_sidecar(&path, &record).unwrap();
        assert_eq!(read_sidecar(&path).unwrap(), record);
    }

    #[test]
    fn test_garbage_sidecar_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.meta");
        std::fs::write(&path, [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01]).unwrap();
        assert!(matches!(read_sidecar(&path), Err(IngestionError::Sidecar(_))));
    }
}
