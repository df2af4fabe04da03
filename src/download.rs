//! Download capability for fetching remote archives into the working
//! directory. The ingestion core treats failures from here as opaque: they
//! propagate without being reclassified.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mockall::automock;
use tracing::info;

pub type DownloadError = Box<dyn std::error::Error + Send + Sync>;

/// Trait for retrieving a URL's payload into a destination directory.
/// Allows plugging in real, test, or mockable downloaders.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Download: Send + Sync {
    /// Retrieve `url` and store its payload inside `dest`, returning the
    /// path of the stored file.
    async fn fetch(&self, url: &str, dest: &Path) -> Result<PathBuf, DownloadError>;
}

/// HTTP downloader over a shared `reqwest` client.
pub struct HttpDownload {
    client: reqwest::Client,
}

impl HttpDownload {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpDownload {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Download for HttpDownload {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<PathBuf, DownloadError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let file_name = url
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty())
            .unwrap_or("archive.json.gz");
        let target = dest.join(file_name);
        let payload = response.bytes().await?;
        std::fs::write(&target, &payload)?;
        info!(
            url,
            path = %target.display(),
            bytes = payload.len(),
            "stored remote archive payload"
        );
        Ok(target)
    }
}
