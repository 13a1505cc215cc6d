//! Flood inundation catalog ingester.
//!
//! Reads the converter's metadata sidecars and uploads the matching GeoTIFFs
//! to an Earth Engine image collection, skipping assets that already exist.

mod client;
mod config;
mod ingest;

use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use client::EarthEngineCli;
use config::IngestConfig;
use ingest::IngestionPipeline;

#[derive(Parser, Debug)]
#[command(name = "ingester")]
#[command(about = "Ingest converted flood rasters into the asset catalog")]
struct Args {
    /// Directory holding metadata sidecars
    #[arg(short, long)]
    sidecar_dir: Option<PathBuf>,

    /// Target image collection
    #[arg(short, long)]
    collection: Option<String>,

    /// Cloud-storage prefix of the uploaded rasters
    #[arg(long)]
    raster_uri_prefix: Option<String>,

    /// Ingestion date recorded on each asset (YYYY-MM-DD)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Number of concurrent uploads
    #[arg(long)]
    parallel_uploads: Option<usize>,

    /// Print upload commands without running them
    #[arg(long)]
    dry_run: bool,

    /// Path to the earthengine executable
    #[arg(long, env = "EARTHENGINE_BIN", default_value = "earthengine")]
    earthengine: String,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
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
        .with_thread_ids(true);

    if args.log_json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    info!("Starting flood catalog ingester");

    let mut config = IngestConfig::from_env()?;
    if let Some(dir) = args.sidecar_dir {
        config.sidecar_dir = dir;
    }
    if let Some(collection) = args.collection {
        config.collection_path = collection;
    }
    if let Some(prefix) = args.raster_uri_prefix {
        config.raster_uri_prefix = prefix;
    }
    if let Some(date) = args.date {
        config.ingestion_date = date;
    }
    if let Some(n) = args.parallel_uploads {
        config.parallel_uploads = n;
    }
    config.dry_run |= args.dry_run;
    config.validate()?;

    info!(
        sidecar_dir = %config.sidecar_dir.display(),
        collection = %config.collection_path,
        dry_run = config.dry_run,
        "Loaded configuration"
    );

    let pipeline = IngestionPipeline::new(config, EarthEngineCli::new(args.earthengine));
    let summary = pipeline.run().await?;

    for (id, error) in &summary.failed {
        warn!(asset = %id, error = %error, "Not ingested");
    }

    Ok(())
}
