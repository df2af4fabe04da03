//! Coordinating module for the resolve-decode-load pipeline.
//!
//! One run: resolve the selected source into a working directory, load every
//! archive it yields into the store, then optionally remove the working
//! directory. Strictly sequential; the first error aborts the run. The
//! orchestration is generic over the storage and download seams so
//! integration tests can drive the full pipeline against mocks.

use std::fs;
use std::path::PathBuf;

use tracing::{error, info};

use crate::acquire::{self, ArchiveSource};
use crate::config::IngestConfig;
use crate::download::{Download, HttpDownload};
use crate::error::IngestError;
use crate::populate::{self, PopulateReport};
use crate::storage::{MongoStore, Storage};

/// Per-run knobs next to the source selection.
#[derive(Debug, Default)]
pub struct IngestOptions {
    /// Override for the config's working directory.
    pub workdir: Option<PathBuf>,
    /// Remove the working directory after processing. Never applies to
    /// directory-mode sources.
    pub delete_after: bool,
}

/// What one completed run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestReport {
    /// Working directory the archives were processed from.
    pub workdir: PathBuf,
    pub archives: usize,
    pub records: usize,
    pub discarded: usize,
}

impl IngestReport {
    fn new(workdir: PathBuf, populate: PopulateReport) -> Self {
        Self {
            workdir,
            archives: populate.archives,
            records: populate.records,
            discarded: populate.discarded,
        }
    }
}

/// Run one ingestion against the configured document store.
pub async fn ingest(
    config: &IngestConfig,
    source: ArchiveSource,
    options: IngestOptions,
) -> Result<IngestReport, IngestError> {
    let store = MongoStore::connect(&config.store_uri, &config.database).await?;
    let downloader = HttpDownload::new();
    ingest_with(config, source, options, &store, &downloader).await
}

/// Run one ingestion against explicit storage and download implementations.
pub async fn ingest_with<S, D>(
    config: &IngestConfig,
    source: ArchiveSource,
    options: IngestOptions,
    store: &S,
    downloader: &D,
) -> Result<IngestReport, IngestError>
where
    S: Storage + ?Sized,
    D: Download + ?Sized,
{
    let workdir = options.workdir.unwrap_or_else(|| config.workdir.clone());
    info!(source = ?source, workdir = %workdir.display(), "starting ingestion run");

    let resolved = match acquire::resolve(&source, &workdir, &config.url_template, downloader).await
    {
        Ok(resolved) => resolved,
        Err(e) => {
            error!(error = %e, "failed to resolve archive source");
            return Err(e);
        }
    };

    let report = match populate::populate(store, &resolved.path, &config.events).await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %e, path = %resolved.path.display(), "ingestion aborted");
            return Err(e);
        }
    };

    if options.delete_after && !resolved.user_owned {
        fs::remove_dir_all(&resolved.path)?;
        info!(path = %resolved.path.display(), "removed working directory after processing");
    }

    Ok(IngestReport::new(resolved.path, report))
}
