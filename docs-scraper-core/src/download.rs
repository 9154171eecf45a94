use std::io::Read;
use std::process::Command;

use async_trait::async_trait;
use flate2::read::GzDecoder;
use reqwest::Client;
use tracing::{error, info};

use crate::contract::{ArchiveFetcher, CloneRequest, PipelineError, RepositoryMaterializer};

pub const DOCS_RS_BASE_URL: &str = "https://docs.rs";

/// Clones repositories with the `git` command-line client.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl GitCli {
    pub fn new() -> Self {
        Self {
            program: "git".to_string(),
        }
    }

    fn clone_args(request: &CloneRequest) -> Vec<String> {
        let mut args = vec!["clone".to_string()];
        if request.shallow {
            args.extend(["--depth".to_string(), "1".to_string()]);
        }
        if request.recurse_submodules {
            args.push("--recurse-submodules".to_string());
            if request.shallow {
                args.push("--shallow-submodules".to_string());
            }
        }
        args.push("--quiet".to_string());
        args.push(request.url.clone());
        args.push(request.target.to_string_lossy().into_owned());
        args
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RepositoryMaterializer for GitCli {
    async fn materialize(&self, request: &CloneRequest) -> Result<(), PipelineError> {
        // `git clone [--depth 1] [--recurse-submodules] <url> <target>`
        let output = Command::new(&self.program)
            .args(Self::clone_args(request))
            .output()
            .map_err(|source| {
                error!(error = ?source, url = %request.url, "Failed to launch git process");
                PipelineError::Spawn {
                    program: self.program.clone(),
                    source,
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!(
                url = %request.url,
                path = %request.target.display(),
                status = ?output.status,
                "Git exited with non-zero code"
            );
            return Err(PipelineError::Clone {
                url: request.url.clone(),
                detail: if stderr.is_empty() {
                    output.status.to_string()
                } else {
                    stderr
                },
            });
        }

        info!(
            url = %request.url,
            path = %request.target.display(),
            "Successfully cloned git repository"
        );
        Ok(())
    }
}

/// Downloads rustdoc JSON archives from docs.rs (or a compatible mirror).
#[derive(Debug, Clone)]
pub struct DocsRsFetcher {
    client: Client,
    base_url: String,
}

impl DocsRsFetcher {
    pub fn new() -> Self {
        Self::with_base_url(DOCS_RS_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for DocsRsFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArchiveFetcher for DocsRsFetcher {
    fn archive_url(&self, crate_name: &str, version: &str) -> String {
        format!(
            "{}/crate/{}/{}/json.gz",
            self.base_url.trim_end_matches('/'),
            crate_name,
            version
        )
    }

    async fn fetch(&self, crate_name: &str, version: &str) -> Result<Vec<u8>, PipelineError> {
        let url = self.archive_url(crate_name, version);
        info!(url = %url, "Downloading documentation archive");

        let response = self.client.get(&url).send().await.map_err(|e| {
            error!(error = ?e, url = %url, "Failed to request documentation archive");
            PipelineError::Http(e)
        })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            error!(status = %status, url = %url, "Documentation archive request returned error");
            return Err(PipelineError::FetchStatus {
                url,
                status: status.as_u16(),
            });
        }

        let compressed = response.bytes().await?;
        let mut json = Vec::new();
        GzDecoder::new(&compressed[..])
            .read_to_end(&mut json)
            .map_err(|e| {
                error!(error = ?e, url = %url, "Failed to decompress documentation archive");
                PipelineError::Decompress(e)
            })?;

        info!(
            compressed = compressed.len(),
            size = json.len(),
            "Downloaded and decompressed documentation archive"
        );
        Ok(json)
    }
}
