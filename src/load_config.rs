use std::fs;
use std::path::Path;

use anyhow::Result;
use tracing::{error, info};

use crate::config::IngestConfig;

/// Loads the optional YAML config file and applies env-var overrides for
/// connection settings. With no file, built-in defaults apply.
pub fn load_config<P: AsRef<Path>>(path: Option<P>) -> Result<IngestConfig> {
    let mut config = match path {
        Some(path) => {
            let path_ref = path.as_ref();
            info!(config_path = ?path_ref, "Loading configuration from file");
            let content = match fs::read_to_string(path_ref) {
                Ok(content) => content,
                Err(e) => {
                    error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
                    return Err(anyhow::anyhow!(
                        "Failed to read config file {:?}: {}",
                        path_ref,
                        e
                    ));
                }
            };
            match serde_yaml::from_str::<IngestConfig>(&content) {
                Ok(config) => config,
                Err(e) => {
                    error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
                    return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
                }
            }
        }
        None => IngestConfig::default(),
    };

    if let Ok(uri) = std::env::var("EVENT_STORE_URI") {
        config.store_uri = uri;
    }
    if let Ok(database) = std::env::var("EVENT_STORE_DATABASE") {
        config.database = database;
    }

    config.trace_loaded();
    Ok(config)
}
