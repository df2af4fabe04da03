//! Error taxonomy for the ingestion pipeline.
//!
//! Every error that can end a run is a variant of [`IngestError`]. Variants
//! carry typed fields rather than pre-formatted message strings, so callers
//! and tests can match on the exact failure. Module-specific sub-kinds
//! ([`crate::date_expr::DateExpressionError`], [`crate::storage::StorageError`])
//! live next to the code that produces them and fold into this type via
//! `From`.

use std::path::PathBuf;

use thiserror::Error;

use crate::date_expr::DateExpressionError;
use crate::storage::StorageError;

/// Top-level error family for one ingestion run. All variants are fatal:
/// the pipeline performs no retries and no partial-success bookkeeping
/// beyond data already committed for earlier archive files.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    #[error(transparent)]
    Path(#[from] PathError),

    #[error(transparent)]
    ArchiveFormat(#[from] ArchiveFormatError),

    /// Every unresolved name across the whole file list, collected before
    /// failing rather than aborting at the first bad entry.
    #[error("file names could not be resolved: {}", invalid.join(", "))]
    FileResolution { invalid: Vec<String> },

    #[error(transparent)]
    DateExpression(#[from] DateExpressionError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Download failures pass through unreclassified.
    #[error("download failed: {0}")]
    Download(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Invalid selection of the archive source mode.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgumentError {
    #[error(
        "no archive source supplied; pass exactly one of --url, --date, --source-dir, --zip or --files"
    )]
    NoSource,

    #[error("multiple archive sources supplied ({}); pass exactly one", flags.join(", "))]
    MultipleSources { flags: Vec<&'static str> },

    #[error("--{flag} was supplied without a value")]
    EmptyValue { flag: &'static str },
}

/// Problems with the working directory holding the archives.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("archive directory does not exist: {}", path.display())]
    Missing { path: PathBuf },

    #[error("archive directory holds no *.json.gz files: {}", path.display())]
    NoArchives { path: PathBuf },
}

/// A container or archive whose bytes cannot be decoded.
#[derive(Debug, Error)]
pub enum ArchiveFormatError {
    #[error("invalid or corrupt ZIP container: {}", path.display())]
    BadZip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// Mid-stream decode failure; fatal for the whole file, no
    /// partial-record recovery.
    #[error("malformed JSON at byte {offset} of {}", path.display())]
    Decode {
        path: PathBuf,
        offset: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to decompress {}", path.display())]
    Gunzip {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
