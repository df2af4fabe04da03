//! Resolution of one acquisition mode into a working directory of archives.
//!
//! The caller supplies exactly one of five mutually exclusive modes; the
//! resolver turns it into a local directory holding `*.json.gz` files. Only
//! directory mode leaves ownership with the user — every other mode fills a
//! run-owned working directory that may be deleted after processing.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::date_expr;
use crate::download::Download;
use crate::error::{ArchiveFormatError, ArgumentError, IngestError};

/// Exactly one way of getting hold of the archives for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveSource {
    /// Direct URL of the archive payload.
    Url(String),
    /// Date-range expression substituted into the service's URL template.
    DateRange(String),
    /// Directory that already holds the archives; used as-is, never deleted.
    Directory(PathBuf),
    /// ZIP container to extract into the working directory.
    ZipFile(PathBuf),
    /// Archive files to copy: absolute paths or `dir,file1[,file2...]`
    /// clusters.
    FileList(Vec<String>),
}

/// The five optional CLI inputs before mode selection.
#[derive(Debug, Default)]
pub struct SourceSelection {
    pub url: Option<String>,
    pub date: Option<String>,
    pub source_dir: Option<PathBuf>,
    pub zip: Option<PathBuf>,
    pub files: Option<Vec<String>>,
}

impl ArchiveSource {
    /// Collapse the five optional inputs into exactly one source. Zero or
    /// more than one supplied mode is an argument error, as is a supplied
    /// mode whose value is empty.
    pub fn select(selection: SourceSelection) -> Result<Self, ArgumentError> {
        let SourceSelection {
            url,
            date,
            source_dir,
            zip,
            files,
        } = selection;

        let mut supplied: Vec<&'static str> = Vec::new();
        if url.is_some() {
            supplied.push("url");
        }
        if date.is_some() {
            supplied.push("date");
        }
        if source_dir.is_some() {
            supplied.push("source-dir");
        }
        if zip.is_some() {
            supplied.push("zip");
        }
        if files.is_some() {
            supplied.push("files");
        }

        match supplied.len() {
            0 => Err(ArgumentError::NoSource),
            1 => {
                let flag = supplied[0];
                let source = match (url, date, source_dir, zip, files) {
                    (Some(url), ..) if !url.is_empty() => ArchiveSource::Url(url),
                    (_, Some(date), ..) if !date.is_empty() => ArchiveSource::DateRange(date),
                    (_, _, Some(dir), ..) if !dir.as_os_str().is_empty() => {
                        ArchiveSource::Directory(dir)
                    }
                    (_, _, _, Some(zip), _) if !zip.as_os_str().is_empty() => {
                        ArchiveSource::ZipFile(zip)
                    }
                    (.., Some(files)) if !files.is_empty() => ArchiveSource::FileList(files),
                    _ => return Err(ArgumentError::EmptyValue { flag }),
                };
                Ok(source)
            }
            _ => Err(ArgumentError::MultipleSources { flags: supplied }),
        }
    }
}

/// Working directory produced by resolving a source for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workdir {
    pub path: PathBuf,
    /// Directory-mode paths belong to the caller and are never deleted.
    pub user_owned: bool,
}

/// Resolve `source` into a directory of archive files.
pub async fn resolve<D>(
    source: &ArchiveSource,
    workdir: &Path,
    url_template: &str,
    downloader: &D,
) -> Result<Workdir, IngestError>
where
    D: Download + ?Sized,
{
    let run_owned = |path: &Path| Workdir {
        path: path.to_owned(),
        user_owned: false,
    };
    match source {
        ArchiveSource::Url(url) => {
            reset_directory(workdir)?;
            downloader
                .fetch(url, workdir)
                .await
                .map_err(IngestError::Download)?;
            Ok(run_owned(workdir))
        }
        ArchiveSource::DateRange(expr) => {
            let validated = date_expr::validate(expr)?;
            let url = url_template.replace("{date}", validated);
            info!(expr = validated, url = %url, "resolved date expression to archive URL");
            reset_directory(workdir)?;
            downloader
                .fetch(&url, workdir)
                .await
                .map_err(IngestError::Download)?;
            Ok(run_owned(workdir))
        }
        ArchiveSource::Directory(dir) => Ok(Workdir {
            path: dir.clone(),
            user_owned: true,
        }),
        ArchiveSource::ZipFile(path) => {
            extract_zip(path, workdir)?;
            Ok(run_owned(workdir))
        }
        ArchiveSource::FileList(entries) => {
            reset_directory(workdir)?;
            copy_listed_files(entries, workdir)?;
            Ok(run_owned(workdir))
        }
    }
}

/// Delete and recreate a run-owned working directory.
pub fn reset_directory(dir: &Path) -> io::Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    fs::create_dir_all(dir)
}

/// Extract a ZIP container into `dest`, creating the directory tree.
fn extract_zip(zip_path: &Path, dest: &Path) -> Result<(), IngestError> {
    let file = File::open(zip_path)?;
    let mut container =
        zip::ZipArchive::new(file).map_err(|source| ArchiveFormatError::BadZip {
            path: zip_path.to_owned(),
            source,
        })?;
    fs::create_dir_all(dest)?;
    container
        .extract(dest)
        .map_err(|source| ArchiveFormatError::BadZip {
            path: zip_path.to_owned(),
            source,
        })?;
    info!(
        zip = %zip_path.display(),
        dest = %dest.display(),
        entries = container.len(),
        "extracted archive container"
    );
    Ok(())
}

/// Resolve every file-list entry, copying existing files into `dest`.
///
/// Unresolved names are collected across the entire list; only after every
/// entry has been tried does a single resolution error listing all of them
/// come back.
fn copy_listed_files(entries: &[String], dest: &Path) -> Result<(), IngestError> {
    let mut invalid: Vec<String> = Vec::new();
    for entry in entries {
        let mut parts = entry.split(',').filter(|part| !part.is_empty());
        let Some(first) = parts.next() else {
            invalid.push(entry.clone());
            continue;
        };
        let mut base = PathBuf::from(first);
        let mut names: Vec<String> = parts.map(str::to_owned).collect();
        if base.is_file() {
            // A bare file path: treat its parent as the base directory.
            if let (Some(parent), Some(name)) = (base.parent(), base.file_name()) {
                names.push(name.to_string_lossy().into_owned());
                base = parent.to_owned();
            }
        }
        if !base.is_dir() || names.is_empty() {
            invalid.push(first.to_owned());
            continue;
        }
        let mut seen: Vec<String> = Vec::new();
        for name in names {
            if seen.contains(&name) {
                continue;
            }
            seen.push(name.clone());
            let source = base.join(&name);
            if source.is_file() {
                fs::copy(&source, dest.join(&name))?;
            } else {
                invalid.push(name);
            }
        }
    }
    if invalid.is_empty() {
        Ok(())
    } else {
        error!(invalid = ?invalid, "file-list names could not be resolved");
        Err(IngestError::FileResolution { invalid })
    }
}
