//! Flood inundation converter.
//!
//! Walks a directory of inundation netCDF files and writes, for each one, a
//! north-up EPSG:4326 GeoTIFF of the first time step and a metadata sidecar
//! for the catalog ingester.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use ingestion::config::DEFAULT_TESTING_LIMIT;
use ingestion::{ConversionConfig, ConversionPipeline, RasterCompression};
use netcdf_parser::VariableSelection;

#[derive(Parser, Debug)]
#[command(name = "converter")]
#[command(about = "Convert flood inundation netCDF files to GeoTIFF with metadata sidecars")]
struct Args {
    /// Directory searched recursively for source files
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Directory receiving rasters and sidecars
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Source file extension
    #[arg(long)]
    extension: Option<String>,

    /// Number of parallel conversion workers
    #[arg(short, long)]
    workers: Option<usize>,

    /// Only convert the first 10 discovered files
    #[arg(long)]
    testing: bool,

    /// Only convert the first N discovered files
    #[arg(long, conflicts_with = "testing")]
    limit: Option<usize>,

    /// Keep existing files in the output directory
    #[arg(long)]
    keep_output: bool,

    /// Raster compression (lzw, deflate, none)
    #[arg(long, value_parser = parse_compression)]
    compression: Option<RasterCompression>,

    /// Measurement variable name (default: last variable in each file)
    #[arg(long)]
    variable: Option<String>,

    /// Write a JSON run summary to this path
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

impl Args {
    /// Apply command-line overrides on top of environment configuration.
    fn into_config(self, mut config: ConversionConfig) -> ConversionConfig {
        if let Some(dir) = self.input_dir {
            config.input_dir = dir;
        }
        if let Some(dir) = self.output_dir {
            config.output_dir = dir;
        }
        if let Some(ext) = self.extension {
            config.input_extension = ext.trim_start_matches('.').to_string();
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if self.testing {
            config.testing_limit = Some(DEFAULT_TESTING_LIMIT);
        }
        if let Some(limit) = self.limit {
            config.testing_limit = Some(limit);
        }
        if self.keep_output {
            config.reset_output = false;
        }
        if let Some(compression) = self.compression {
            config.compression = compression;
        }
        config
    }
}

fn parse_compression(s: &str) -> std::result::Result<RasterCompression, String> {
    s.parse().map_err(|e: ingestion::IngestionError| e.to_string())
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_names(true);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.log_json)?;

    let summary_path = args.summary.clone();
    let selection = match &args.variable {
        Some(name) => VariableSelection::Named(name.clone()),
        None => VariableSelection::LastDeclared,
    };
    let config = args.into_config(ConversionConfig::from_env()?);

    info!(
        input_dir = %config.input_dir.display(),
        output_dir = %config.output_dir.display(),
        workers = config.workers,
        testing_limit = ?config.testing_limit,
        compression = %config.compression,
        "Starting flood inundation converter"
    );

    let summary = ConversionPipeline::new(config)
        .with_variable(selection)
        .run()
        .context("conversion run failed")?;

    for failure in &summary.failed {
        warn!(
            file = %failure.filename,
            kind = ?failure.kind,
            error = %failure.message,
            "Failed file"
        );
    }

    info!(
        discovered = summary.discovered,
        processed = summary.processed,
        succeeded = summary.success_count(),
        failed = summary.failure_count(),
        elapsed = ?summary.elapsed,
        "Done"
    );

    if let Some(path) = summary_path {
        summary
            .write_json(&path)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        info!(path = %path.display(), "Wrote run summary");
    }

    Ok(())
}
