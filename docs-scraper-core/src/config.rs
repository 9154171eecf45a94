use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

use crate::extensions::{ExtensionSet, DEFAULT_EXTENSIONS};

pub const DEFAULT_OUTPUT: &str = "output.md";
pub const DEFAULT_CRATE_VERSION: &str = "latest";
pub const DEFAULT_CONVERTER: &str = "./cargo-doc-md/target/release/cargo-doc-md";

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

fn default_repo_paths() -> Vec<String> {
    vec![".".to_string()]
}

fn default_crate_version() -> String {
    DEFAULT_CRATE_VERSION.to_string()
}

fn default_converter() -> PathBuf {
    PathBuf::from(DEFAULT_CONVERTER)
}

/// Aggregate local directory trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalConfig {
    pub paths: Vec<PathBuf>,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl LocalConfig {
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
    }

    pub fn extension_set(&self) -> ExtensionSet {
        ExtensionSet::or_default(&self.extensions)
    }

    pub fn trace_loaded(&self) {
        info!(
            paths = self.paths.len(),
            extensions = ?self.extensions,
            output = %self.output_path().display(),
            "Loaded local config"
        );
        debug!(?self, "Local config (full debug)");
    }
}

/// Clone a repository and aggregate selected paths inside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    pub repo_url: String,
    /// Paths relative to the repository root.
    #[serde(default = "default_repo_paths")]
    pub paths: Vec<String>,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub follow_symlinks: bool,
}

impl GithubConfig {
    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
    }

    pub fn extension_set(&self) -> ExtensionSet {
        ExtensionSet::or_default(&self.extensions)
    }

    /// Configured paths, or the repository root when none are given.
    pub fn effective_paths(&self) -> Vec<String> {
        if self.paths.is_empty() {
            default_repo_paths()
        } else {
            self.paths.clone()
        }
    }

    pub fn trace_loaded(&self) {
        info!(
            repo_url = %self.repo_url,
            paths = ?self.effective_paths(),
            output = %self.output_path().display(),
            "Loaded github config"
        );
        debug!(?self, "Github config (full debug)");
    }
}

/// Clone a Go module and capture its README and `go doc` output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoConfig {
    pub package: String,
    /// Repository root, when it cannot be derived from `package`.
    #[serde(default)]
    pub root: Option<String>,
    #[serde(default)]
    pub output: Option<PathBuf>,
}

impl GoConfig {
    /// `docs_<unix seconds>.txt` unless an output was configured.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("docs_{}.txt", chrono::Utc::now().timestamp())))
    }

    pub fn trace_loaded(&self) {
        info!(
            package = %self.package,
            root = self.root.as_deref().unwrap_or("<derived>"),
            "Loaded go config"
        );
        debug!(?self, "Go config (full debug)");
    }
}

/// Download a crate's rustdoc JSON and convert it to Markdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RustConfig {
    #[serde(rename = "crate")]
    pub crate_name: String,
    #[serde(default = "default_crate_version")]
    pub version: String,
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default = "default_converter")]
    pub converter: PathBuf,
}

impl RustConfig {
    /// `<crate>.md` unless an output was configured.
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.md", self.crate_name)))
    }

    pub fn trace_loaded(&self) {
        info!(
            crate_name = %self.crate_name,
            version = %self.version,
            converter = %self.converter.display(),
            "Loaded rust config"
        );
        debug!(?self, "Rust config (full debug)");
    }
}

/// One aggregation run, as listed in a batch file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Job {
    Local(LocalConfig),
    Github(GithubConfig),
    Go(GoConfig),
    Rust(RustConfig),
}

impl Job {
    pub fn trace_loaded(&self) {
        match self {
            Job::Local(c) => c.trace_loaded(),
            Job::Github(c) => c.trace_loaded(),
            Job::Go(c) => c.trace_loaded(),
            Job::Rust(c) => c.trace_loaded(),
        }
    }
}
