/// `load_config` module: reads a YAML batch file listing aggregation jobs.
///
/// Each job is tagged by `type` (`local`, `github`, `go` or `rust`) and carries
/// the same fields as the matching subcommand. Example:
///
/// ```yaml
/// jobs:
///   - type: local
///     paths: [./docs]
///     output: docs.md
///   - type: rust
///     crate: serde
///     version: "1.0.200"
/// ```
///
/// # Errors
/// Read and parse failures are logged and returned as `anyhow::Error` for the
/// CLI boundary.
use anyhow::Result;
use docs_scraper_core::config::Job;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{error, info};

#[derive(Debug, Deserialize)]
pub struct BatchConfig {
    #[serde(default)]
    pub jobs: Vec<Job>,
}

/// Loads and parses the batch file at `path`.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BatchConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let config: BatchConfig = match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            conf
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
        }
    };

    info!(jobs = config.jobs.len(), "Loaded batch configuration");
    Ok(config)
}
