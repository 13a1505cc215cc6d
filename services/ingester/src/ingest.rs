//! Sidecar-driven catalog ingestion.

use anyhow::Result;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use ingestion::{find_sidecars, read_sidecar, IngestRequest};

use crate::client::CatalogClient;
use crate::config::IngestConfig;

/// What happened to each sidecar in a run.
#[derive(Debug, Default, Serialize)]
pub struct IngestSummary {
    /// Asset ids whose upload was started (or printed, in dry-run mode)
    pub uploaded: Vec<String>,
    /// Asset ids already present in the catalog
    pub skipped: Vec<String>,
    /// (sidecar or asset id, error)
    pub failed: Vec<(String, String)>,
}

enum Outcome {
    Uploaded(String),
    Skipped(String),
    Failed(String, String),
}

/// Uploads converted rasters to the asset catalog.
pub struct IngestionPipeline<C: CatalogClient> {
    config: IngestConfig,
    client: Arc<C>,
}

impl<C: CatalogClient> IngestionPipeline<C> {
    pub fn new(config: IngestConfig, client: C) -> Self {
        Self {
            config,
            client: Arc::new(client),
        }
    }

    /// Create the collection and its parent folder when missing.
    pub async fn ensure_collection(&self) -> Result<()> {
        let collection = self.config.collection_path.trim_end_matches('/');

        if let Some((parent, _)) = collection.rsplit_once('/') {
            if !self.client.asset_exists(parent).await? {
                info!(folder = %parent, "Creating folder");
                if !self.config.dry_run {
                    self.client.create_folder(parent).await?;
                }
            }
        }

        if !self.client.asset_exists(collection).await? {
            info!(collection = %collection, "Creating image collection");
            if !self.config.dry_run {
                self.client.create_collection(collection).await?;
            }
        }
        Ok(())
    }

    /// Build upload requests from every sidecar under the sidecar directory.
    ///
    /// Unreadable sidecars are reported in the returned failure list.
    pub fn load_requests(&self) -> Result<(Vec<IngestRequest>, Vec<(String, String)>)> {
        let options = self.config.request_options();
        let mut requests = Vec::new();
        let mut failed = Vec::new();

        for path in find_sidecars(&self.config.sidecar_dir, &self.config.sidecar_extension)? {
            match read_sidecar(&path) {
                Ok(record) => requests.push(IngestRequest::from_record(&record, &options)),
                Err(e) => {
                    warn!(sidecar = %path.display(), error = %e, "Unreadable sidecar");
                    failed.push((path.display().to_string(), e.to_string()));
                }
            }
        }
        Ok((requests, failed))
    }

    /// Ingest every sidecar, skipping assets that already exist.
    #[instrument(skip(self), fields(collection = %self.config.collection_path))]
    pub async fn run(&self) -> Result<IngestSummary> {
        self.ensure_collection().await?;

        let (requests, failed) = self.load_requests()?;
        info!(requests = requests.len(), "Loaded sidecars");

        let outcomes: Vec<Outcome> = stream::iter(requests)
            .map(|request| self.ingest_one(request))
            .buffer_unordered(self.config.parallel_uploads)
            .collect()
            .await;

        let mut summary = IngestSummary {
            failed,
            ..Default::default()
        };
        for outcome in outcomes {
            match outcome {
                Outcome::Uploaded(id) => summary.uploaded.push(id),
                Outcome::Skipped(id) => summary.skipped.push(id),
                Outcome::Failed(id, e) => summary.failed.push((id, e)),
            }
        }
        summary.uploaded.sort();
        summary.skipped.sort();

        info!(
            uploaded = summary.uploaded.len(),
            skipped = summary.skipped.len(),
            failed = summary.failed.len(),
            "Ingestion completed"
        );
        Ok(summary)
    }

    async fn ingest_one(&self, request: IngestRequest) -> Outcome {
        let id = request.asset_id.clone();

        match self.client.asset_exists(&id).await {
            Ok(true) => {
                info!(asset = %id, "Asset exists, skipping");
                return Outcome::Skipped(id);
            }
            Ok(false) => {}
            Err(e) => {
                error!(asset = %id, error = %e, "Existence check failed");
                return Outcome::Failed(id, e.to_string());
            }
        }

        if self.config.dry_run {
            println!("earthengine {}", request.to_command_args().join(" "));
            return Outcome::Uploaded(id);
        }

        match self.client.upload_image(&request).await {
            Ok(()) => {
                info!(asset = %id, "Upload started");
                Outcome::Uploaded(id)
            }
            Err(e) => {
                error!(asset = %id, error = %e, "Upload failed");
                Outcome::Failed(id, e.to_string())
            }
        }
    }
}
