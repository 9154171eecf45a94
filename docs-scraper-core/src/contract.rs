//! # contract: seams to the external collaborators of a run
//!
//! Pipelines never shell out or touch the network directly. They go through
//! the traits below, which have one real implementation each
//! ([`crate::download`], [`crate::command`]) and `mockall` mocks for tests.
//!
//! ## Mocking & Testing
//! - Every trait is annotated with `automock`; with the default
//!   `test-export-mocks` feature the `Mock*` types are public so integration
//!   tests can script collaborator behaviour.
//!
//! ## Errors
//! - All fatal failures surface as [`PipelineError`].
//! - A documentation command that runs but finds nothing is *not* an error:
//!   it returns [`DocOutcome::NotFound`].

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mockall::automock;

use crate::aggregate::AggregateError;
use crate::walk::WalkError;

/// What to clone and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneRequest {
    pub url: String,
    pub target: PathBuf,
    /// Clone with `--depth 1`.
    pub shallow: bool,
    /// Also initialise submodules (shallowly when `shallow` is set).
    pub recurse_submodules: bool,
}

/// Result of running a documentation command that started successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocOutcome {
    /// The command printed documentation.
    Found(Vec<u8>),
    /// The command exited unsuccessfully; `detail` holds its stderr.
    NotFound { detail: String },
}

#[derive(Debug)]
pub enum PipelineError {
    /// A required identifying input was not supplied.
    MissingInput(&'static str),
    /// Cloning a repository failed.
    Clone { url: String, detail: String },
    /// The remote archive request returned a non-success status.
    FetchStatus { url: String, status: u16 },
    /// The remote archive request could not be made.
    Http(reqwest::Error),
    /// The downloaded archive was not valid gzip.
    Decompress(io::Error),
    /// The converter executable does not exist.
    ConverterMissing(PathBuf),
    /// The converter ran and exited unsuccessfully.
    Convert { detail: String },
    /// An external program could not be started.
    Spawn { program: String, source: io::Error },
    /// The output document could not be created.
    Output { path: PathBuf, source: io::Error },
    Walk(WalkError),
    Aggregate(AggregateError),
    Io(io::Error),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::MissingInput(what) => write!(f, "{what} is required"),
            PipelineError::Clone { url, detail } => {
                write!(f, "git clone of {url} failed: {detail}")
            }
            PipelineError::FetchStatus { url, status } => {
                write!(f, "bad status downloading {url}: {status}")
            }
            PipelineError::Http(e) => write!(f, "failed to download: {e}"),
            PipelineError::Decompress(e) => write!(f, "failed to decompress: {e}"),
            PipelineError::ConverterMissing(path) => {
                write!(f, "converter binary not found at {}", path.display())
            }
            PipelineError::Convert { detail } => write!(f, "converter failed: {detail}"),
            PipelineError::Spawn { program, source } => {
                write!(f, "failed to launch {program}: {source}")
            }
            PipelineError::Output { path, source } => {
                write!(f, "cannot create output {}: {}", path.display(), source)
            }
            PipelineError::Walk(e) => write!(f, "{e}"),
            PipelineError::Aggregate(e) => write!(f, "{e}"),
            PipelineError::Io(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Http(e) => Some(e),
            PipelineError::Decompress(e) | PipelineError::Io(e) => Some(e),
            PipelineError::Spawn { source, .. } | PipelineError::Output { source, .. } => {
                Some(source)
            }
            PipelineError::Walk(e) => Some(e),
            PipelineError::Aggregate(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for PipelineError {
    fn from(e: io::Error) -> Self {
        PipelineError::Io(e)
    }
}

impl From<reqwest::Error> for PipelineError {
    fn from(e: reqwest::Error) -> Self {
        PipelineError::Http(e)
    }
}

impl From<WalkError> for PipelineError {
    fn from(e: WalkError) -> Self {
        PipelineError::Walk(e)
    }
}

impl From<AggregateError> for PipelineError {
    fn from(e: AggregateError) -> Self {
        PipelineError::Aggregate(e)
    }
}

/// Populates a directory with a repository's default branch.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait RepositoryMaterializer: Send + Sync {
    async fn materialize(&self, request: &CloneRequest) -> Result<(), PipelineError>;
}

/// Generates package documentation inside a materialized repository.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DocGenerator: Send + Sync {
    /// Runs in `workdir` against `doc_path` (`.` or `./sub/pkg`).
    ///
    /// `Err` means the command could not be started at all.
    async fn generate(&self, workdir: &Path, doc_path: &str) -> Result<DocOutcome, PipelineError>;
}

/// Downloads and decompresses a crate's generated documentation archive.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ArchiveFetcher: Send + Sync {
    /// Where the archive for `crate_name` at `version` is downloaded from.
    fn archive_url(&self, crate_name: &str, version: &str) -> String;

    async fn fetch(&self, crate_name: &str, version: &str) -> Result<Vec<u8>, PipelineError>;
}

/// Converts a structured documentation file into Markdown files.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Converter: Send + Sync {
    /// Location of the converter executable, checked before downloading.
    fn program(&self) -> PathBuf;

    async fn convert(&self, input: &Path, output_dir: &Path) -> Result<(), PipelineError>;
}
