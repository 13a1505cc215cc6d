//! End-to-end conversion run: discovery, pre-extraction, pooled conversion.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use netcdf_parser::{MetadataExtractor, VariableSelection};

use crate::config::ConversionConfig;
use crate::discovery::{discover_files, extract_all, truncate};
use crate::error::Result;
use crate::job::{ConversionJob, JobFailure, JobResult, JobSuccess};
use crate::pool::WorkerPool;

/// Totals for one conversion run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Files found under the input directory.
    pub discovered: usize,
    /// Files whose attributes could not be read before conversion.
    pub extraction_failures: usize,
    /// Files handed to the worker pool (after testing-mode truncation).
    pub processed: usize,
    pub succeeded: Vec<JobSuccess>,
    pub failed: Vec<JobFailure>,
    /// Wall time for the whole run.
    #[serde(with = "duration_secs")]
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    /// Write the summary as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)?;
        Ok(())
    }

    fn collect(&mut self, results: Vec<JobResult>) {
        for result in results {
            match result {
                Ok(success) => self.succeeded.push(success),
                Err(failure) => self.failed.push(failure),
            }
        }
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_f64(d.as_secs_f64())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(d)?;
        Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom)
    }
}

/// Drives a full conversion run from a [`ConversionConfig`].
#[derive(Debug, Clone)]
pub struct ConversionPipeline {
    config: ConversionConfig,
    selection: VariableSelection,
}

impl ConversionPipeline {
    pub fn new(config: ConversionConfig) -> Self {
        Self {
            config,
            selection: VariableSelection::default(),
        }
    }

    /// Read the measurement variable by name instead of taking the last one.
    pub fn with_variable(mut self, selection: VariableSelection) -> Self {
        self.selection = selection;
        self
    }

    /// Run discovery, pre-extraction and conversion.
    ///
    /// Only configuration and discovery problems are returned as errors.
    /// Per-file failures are collected into the summary.
    pub fn run(&self) -> Result<RunSummary> {
        let start = Instant::now();
        self.config.validate()?;
        self.prepare_output_dir()?;

        let mut records = discover_files(&self.config.input_dir, &self.config.input_extension)?;
        let mut summary = RunSummary {
            discovered: records.len(),
            ..Default::default()
        };

        let extractor = MetadataExtractor::new(self.selection.clone());
        summary.extraction_failures = extract_all(&mut records, &extractor);

        if let Some(limit) = self.config.testing_limit {
            truncate(&mut records, limit);
            info!(limit, kept = records.len(), "Testing mode: truncated record set");
        }
        summary.processed = records.len();

        let pool = WorkerPool::new(self.config.workers)?;
        let job = ConversionJob::new(&self.config, extractor);
        summary.collect(pool.run(&records, &job));
        summary.elapsed = start.elapsed();

        if summary.failed.is_empty() {
            info!(
                processed = summary.processed,
                succeeded = summary.success_count(),
                elapsed_secs = summary.elapsed.as_secs_f64(),
                "Conversion finished"
            );
        } else {
            warn!(
                processed = summary.processed,
                succeeded = summary.success_count(),
                failed = summary.failure_count(),
                elapsed_secs = summary.elapsed.as_secs_f64(),
                "Conversion finished with failures"
            );
        }
        Ok(summary)
    }

    fn prepare_output_dir(&self) -> Result<()> {
        let dir = &self.config.output_dir;
        if self.config.reset_output && dir.exists() {
            info!(output_dir = %dir.display(), "Removing previous output");
            fs::remove_dir_all(dir)?;
        }
        fs::create_dir_all(dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{filenames, InundationFile};

    fn config_for(input: &Path, output: &Path) -> ConversionConfig {
        ConversionConfig {
            input_dir: input.to_path_buf(),
            output_dir: output.to_path_buf(),
            ..Default::default()
        }
    }

    #[test]
    fn test_reset_removes_stale_outputs() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::write(output.path().join("stale.tif"), b"old").unwrap();

        let summary = ConversionPipeline::new(config_for(input.path(), output.path()))
            .run()
            .unwrap();
        assert_eq!(summary.discovered, 0);
        assert!(!output.path().join("stale.tif").exists());
    }

    #[test]
    fn test_no_reset_keeps_existing_files() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::write(output.path().join("keep.txt"), b"x").unwrap();

        let config = ConversionConfig {
            reset_output: false,
            ..config_for(input.path(), output.path())
        };
        ConversionPipeline::new(config).run().unwrap();
        assert!(output.path().join("keep.txt").exists());
    }

    #[test]
    fn test_testing_limit_truncates() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        for year in 2030..2034 {
            let name = format!("inun_rcp4p5_MIROC-ESM-CHEM_{}_0002.nc", year);
            InundationFile::new(&name, 3, 6).write_to(input.path()).unwrap();
        }

        let config = ConversionConfig {
            testing_limit: Some(2),
            ..config_for(input.path(), output.path())
        };
        let summary = ConversionPipeline::new(config).run().unwrap();
        assert_eq!(summary.discovered, 4);
        assert_eq!(summary.processed, 2);
        assert_eq!(summary.success_count(), 2);
        let mut names: Vec<_> = summary.succeeded.iter().map(|s| s.filename.clone()).collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "inun_rcp4p5_MIROC-ESM-CHEM_2030_0002.nc",
                "inun_rcp4p5_MIROC-ESM-CHEM_2031_0002.nc"
            ]
        );
    }

    #[test]
    fn test_invalid_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConversionConfig {
            workers: 0,
            ..config_for(&dir.path().join("in"), &dir.path().join("out"))
        };
        assert!(ConversionPipeline::new(config).run().is_err());
    }

    #[test]
    fn test_summary_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        let summary = RunSummary {
            discovered: 2,
            processed: 2,
            elapsed: Duration::from_millis(1500),
            ..Default::default()
        };
        summary.write_json(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["discovered"], 2);
        assert_eq!(value["elapsed"], 1.5);
        let back: RunSummary = serde_json::from_str(&text).unwrap();
        assert_eq!(back, summary);
    }

    #[test]
    fn test_named_variable_selection() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        InundationFile::new(filenames::FIVE_TOKEN, 2, 4)
            .variable_name("depth")
            .write_to(input.path())
            .unwrap();

        let pipeline = ConversionPipeline::new(config_for(input.path(), output.path()))
            .with_variable(VariableSelection::Named("inun".to_string()));
        let summary = pipeline.run().unwrap();
        assert_eq!(summary.failure_count(), 1);
        assert_eq!(summary.extraction_failures, 1);
    }
}
