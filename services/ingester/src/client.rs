//! Asset catalog clients.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::process::Output;
use tokio::process::Command;
use tracing::{debug, instrument};

use ingestion::IngestRequest;

/// Operations the ingester needs from the asset catalog.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Check whether an asset (image, folder or collection) exists.
    async fn asset_exists(&self, asset_id: &str) -> Result<bool>;

    /// Create a folder asset.
    async fn create_folder(&self, path: &str) -> Result<()>;

    /// Create an image collection.
    async fn create_collection(&self, path: &str) -> Result<()>;

    /// Start an image upload.
    async fn upload_image(&self, request: &IngestRequest) -> Result<()>;
}

/// Client driving the `earthengine` command-line tool.
#[derive(Debug, Clone)]
pub struct EarthEngineCli {
    program: String,
}

impl Default for EarthEngineCli {
    fn default() -> Self {
        Self::new("earthengine")
    }
}

impl EarthEngineCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn output(&self, args: &[String]) -> Result<Output> {
        debug!(program = %self.program, args = ?args, "Running catalog command");
        Command::new(&self.program)
            .args(args)
            .output()
            .await
            .map_err(|e| anyhow!("failed to run {}: {}", self.program, e))
    }

    async fn run(&self, args: &[String]) -> Result<()> {
        let output = self.output(args).await?;
        if output.status.success() {
            Ok(())
        } else {
            Err(anyhow!(
                "{} {} exited with {}: {}",
                self.program,
                args.first().map(String::as_str).unwrap_or_default(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ))
        }
    }
}

#[async_trait]
impl CatalogClient for EarthEngineCli {
    async fn asset_exists(&self, asset_id: &str) -> Result<bool> {
        let args = ["asset".to_string(), "info".to_string(), asset_id.to_string()];
        Ok(self.output(&args).await?.status.success())
    }

    async fn create_folder(&self, path: &str) -> Result<()> {
        self.run(&["create".to_string(), "folder".to_string(), path.to_string()])
            .await
    }

    async fn create_collection(&self, path: &str) -> Result<()> {
        self.run(&[
            "create".to_string(),
            "collection".to_string(),
            path.to_string(),
        ])
        .await
    }

    #[instrument(skip(self, request), fields(asset = %request.asset_id))]
    async fn upload_image(&self, request: &IngestRequest) -> Result<()> {
        self.run(&request.to_command_args()).await
    }
}
