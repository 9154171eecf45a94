/// # docs-scraper CLI Interface (Module)
///
/// Command parsing and dispatch for the `docs-scraper` binary. All aggregation
/// logic lives in [`docs_scraper_core`]; this module only maps flags onto
/// config structs and picks the real collaborators.
///
/// ## How To Use
/// - From the shell: `docs-scraper <local|github|go|rust|sync> --help`.
/// - Programmatically: build a [`Cli`] and call [`run`].
use crate::load_config::load_config;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docs_scraper_core::command::{ExternalConverter, GoDoc};
use docs_scraper_core::config::{GithubConfig, GoConfig, LocalConfig, RustConfig, DEFAULT_CONVERTER};
use docs_scraper_core::download::{DocsRsFetcher, GitCli};
use docs_scraper_core::pipeline::{self, RunReport};
use std::path::PathBuf;

/// CLI for docs-scraper: collect documentation into one file for LLM context.
#[derive(Parser)]
#[clap(
    name = "docs-scraper",
    version,
    about = "Scrape documentation from local folders, git repositories, Go modules and Rust crates into a single file"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Aggregate documentation files from local directories
    Local {
        /// Comma-separated source directories
        #[clap(long, value_delimiter = ',', required = true)]
        paths: Vec<PathBuf>,
        /// Comma-separated file extensions [default: mdx,md]
        #[clap(long, value_delimiter = ',')]
        exts: Vec<String>,
        /// Output file [default: output.md]
        #[clap(short, long)]
        output: Option<PathBuf>,
        /// Follow symbolic links while walking
        #[clap(long)]
        follow_symlinks: bool,
    },
    /// Clone a repository and aggregate documentation files inside it
    Github {
        /// Repository URL
        #[clap(long)]
        url: String,
        /// Comma-separated paths inside the repository
        #[clap(long, value_delimiter = ',', default_value = ".")]
        paths: Vec<String>,
        /// Comma-separated file extensions [default: mdx,md]
        #[clap(long, value_delimiter = ',')]
        exts: Vec<String>,
        /// Output file [default: output.md]
        #[clap(short, long)]
        output: Option<PathBuf>,
        /// Follow symbolic links while walking
        #[clap(long)]
        follow_symlinks: bool,
    },
    /// Capture a Go package's README and `go doc -all` output
    Go {
        /// Go package path, e.g. github.com/spf13/cobra
        #[clap(short, long)]
        package: String,
        /// Repository root, when it differs from the first three path segments
        #[clap(short, long)]
        root: Option<String>,
        /// Output file [default: docs_<unix time>.txt]
        #[clap(short, long)]
        output: Option<PathBuf>,
    },
    /// Download a crate's rustdoc JSON from docs.rs and convert it to Markdown
    Rust {
        /// Crate name
        #[clap(short = 'c', long = "crate")]
        crate_name: String,
        /// Crate version
        #[clap(short = 'v', long, default_value = "latest")]
        version: String,
        /// Output file [default: <crate>.md]
        #[clap(short, long)]
        output: Option<PathBuf>,
        /// Path to the rustdoc JSON to Markdown converter
        #[clap(long, env = "DOCS_SCRAPER_CONVERTER", default_value = DEFAULT_CONVERTER)]
        converter: PathBuf,
    },
    /// Run every job listed in a YAML batch file, in order
    Sync {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
}

/// Async CLI entrypoint for main() and integration tests.
pub async fn run(cli: Cli) -> Result<()> {
    let git = GitCli::new();
    let go_doc = GoDoc::new();
    let fetcher = DocsRsFetcher::new();

    let report = match cli.command {
        Commands::Local {
            paths,
            exts,
            output,
            follow_symlinks,
        } => {
            let config = LocalConfig {
                paths,
                extensions: exts,
                output,
                follow_symlinks,
            };
            config.trace_loaded();
            pipeline::run_local(&config).await?
        }
        Commands::Github {
            url,
            paths,
            exts,
            output,
            follow_symlinks,
        } => {
            let config = GithubConfig {
                repo_url: url,
                paths,
                extensions: exts,
                output,
                follow_symlinks,
            };
            config.trace_loaded();
            pipeline::run_github(&config, &git).await?
        }
        Commands::Go {
            package,
            root,
            output,
        } => {
            let config = GoConfig {
                package,
                root,
                output,
            };
            config.trace_loaded();
            pipeline::run_go(&config, &git, &go_doc).await?
        }
        Commands::Rust {
            crate_name,
            version,
            output,
            converter,
        } => {
            let config = RustConfig {
                crate_name,
                version,
                output,
                converter,
            };
            config.trace_loaded();
            let converter = ExternalConverter::new(&config.converter);
            pipeline::run_rust(&config, &fetcher, &converter).await?
        }
        Commands::Sync { config } => {
            let batch = load_config(config)?;
            tracing::info!(command = "sync", jobs = batch.jobs.len(), "Starting batch run");
            let mut reports = Vec::with_capacity(batch.jobs.len());
            for (index, job) in batch.jobs.iter().enumerate() {
                let report = pipeline::run_job(job, &git, &go_doc, &fetcher)
                    .await
                    .with_context(|| format!("job {} failed", index + 1))?;
                reports.push(report);
            }
            log_batch(&reports);
            return Ok(());
        }
    };

    tracing::info!(?report, "Run finished");
    Ok(())
}

fn log_batch(reports: &[RunReport]) {
    let files: usize = reports.iter().map(|r| r.files_written).sum();
    tracing::info!(
        command = "sync",
        jobs = reports.len(),
        files,
        "Batch run complete"
    );
}
