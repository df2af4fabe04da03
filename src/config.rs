//! Run configuration for the ingestion pipeline.
//!
//! One `IngestConfig` is constructed per run and passed into each component;
//! nothing here is process-global.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::populate::POPULARITY_EVENTS;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Document-store connection string.
    #[serde(default = "default_store_uri")]
    pub store_uri: String,
    /// Database the event collections live in.
    #[serde(default = "default_database")]
    pub database: String,
    /// Template the validated date expression is substituted into.
    #[serde(default = "default_url_template")]
    pub url_template: String,
    /// Default working directory for resolved archives.
    #[serde(default = "default_workdir")]
    pub workdir: PathBuf,
    /// Event types retained by the classifier.
    #[serde(default = "default_events")]
    pub events: Vec<String>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            store_uri: default_store_uri(),
            database: default_database(),
            url_template: default_url_template(),
            workdir: default_workdir(),
            events: default_events(),
        }
    }
}

impl IngestConfig {
    pub fn trace_loaded(&self) {
        info!(
            database = %self.database,
            workdir = %self.workdir.display(),
            events = self.events.len(),
            "Loaded IngestConfig"
        );
    }
}

fn default_store_uri() -> String {
    "mongodb://localhost:27017".to_owned()
}

fn default_database() -> String {
    "timeline".to_owned()
}

fn default_url_template() -> String {
    "http://data.githubarchive.org/{date}.json.gz".to_owned()
}

fn default_workdir() -> PathBuf {
    std::env::temp_dir().join("timeline_archives")
}

fn default_events() -> Vec<String> {
    POPULARITY_EVENTS.iter().map(|kind| kind.to_string()).collect()
}
