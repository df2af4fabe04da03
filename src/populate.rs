//! Event classification and batched loading into the store.
//!
//! Archives are processed strictly one at a time, in the order the working
//! directory yields them. Each file's records are grouped by event type,
//! filtered against the allow-list, and flushed as one bulk write per type
//! plus a second write of the same records into the catch-all collection —
//! the catch-all is a denormalized union that enables cross-type queries
//! later. A storage failure aborts the whole run.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use mongodb::bson::Document;
use tracing::info;

use crate::decode;
use crate::error::{IngestError, PathError};
use crate::storage::{self, Storage};

/// Collection holding every retained event regardless of type.
pub const ALL_COLLECTION: &str = "AllEvent";

/// Event types that signal repository popularity; the default allow-list.
pub const POPULARITY_EVENTS: [&str; 3] = ["PushEvent", "WatchEvent", "FollowEvent"];

/// Suffix the working directory is scanned for.
pub const ARCHIVE_EXTENSION: &str = ".json.gz";

/// Outcome of one loading run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PopulateReport {
    /// Archive files processed.
    pub archives: usize,
    /// Records written to type collections (the catch-all duplicates these).
    pub records: usize,
    /// Records whose type fell outside the allow-list.
    pub discarded: usize,
}

/// List the archive files the working directory yields, in stable order.
/// Both preconditions are checked before any file is opened.
fn archive_files(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    if !dir.is_dir() {
        return Err(PathError::Missing {
            path: dir.to_owned(),
        }
        .into());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(ARCHIVE_EXTENSION));
        if matches {
            files.push(path);
        }
    }
    if files.is_empty() {
        return Err(PathError::NoArchives {
            path: dir.to_owned(),
        }
        .into());
    }
    files.sort();
    Ok(files)
}

/// Load every archive under `src_dir` into the store, retaining only the
/// event types named in `retain`.
pub async fn populate<S>(
    store: &S,
    src_dir: &Path,
    retain: &[String],
) -> Result<PopulateReport, IngestError>
where
    S: Storage + ?Sized,
{
    let files = archive_files(src_dir)?;
    info!(
        archives = files.len(),
        path = %src_dir.display(),
        "loading archives into the event store"
    );

    let mut report = PopulateReport::default();
    for (index, file) in files.iter().enumerate() {
        let buffer = decode::read_archive(file)?;

        // Per-file, per-type batches; discarded once flushed.
        let mut batches: BTreeMap<String, Vec<Document>> = BTreeMap::new();
        for record in decode::RecordStream::new(file, &buffer) {
            let record = record?;
            match decode::event_type(&record) {
                Some(kind) if retain.iter().any(|retained| retained == kind) => {
                    batches
                        .entry(kind.to_owned())
                        .or_default()
                        .push(storage::to_document(&record)?);
                }
                _ => report.discarded += 1,
            }
        }

        for (kind, documents) in batches {
            report.records += documents.len();
            store.insert_many(&kind, documents.clone()).await?;
            store.insert_many(ALL_COLLECTION, documents).await?;
        }

        report.archives = index + 1;
        if report.archives % 10 == 0 {
            info!(archives = report.archives, "archives populated");
        }
    }

    info!(
        archives = report.archives,
        records = report.records,
        discarded = report.discarded,
        "all archives populated"
    );
    Ok(report)
}
