//! Top-level flows: local trees, repository trees, Go module docs and crate docs.
//!
//! Every flow writes exactly one output document and returns a [`RunReport`].
//! Flows await each step in turn; nothing runs concurrently. Temporary clone,
//! archive and conversion locations are removed when the flow returns, whether
//! it succeeded or not.
//!
//! # Errors
//! Fatal conditions return [`PipelineError`]. A missing or failing source root
//! only logs a warning and is counted in [`RunReport::skipped_roots`].

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::aggregate::{AggregateError, Aggregator};
use crate::command::ExternalConverter;
use crate::config::{GithubConfig, GoConfig, Job, LocalConfig, RustConfig};
use crate::contract::{
    ArchiveFetcher, CloneRequest, Converter, DocGenerator, DocOutcome, PipelineError,
    RepositoryMaterializer,
};
use crate::extensions::ExtensionSet;
use crate::resolve::resolve;
use crate::walk::TreeWalker;

pub const GO_DOC_SEPARATOR: &[u8] = b"\n\n--- GO DOC OUTPUT ---\n\n";
pub const NO_DOCS_PLACEHOLDER: &str = "No documentation found for this package.";

/// Outcome of one flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub output: PathBuf,
    pub files_written: usize,
    /// Source roots that were missing, unresolvable or aborted part-way.
    pub skipped_roots: usize,
}

/// A root to walk and the base its headers are relative to.
struct SourceRoot {
    root: PathBuf,
    base: PathBuf,
}

type Sink = BufWriter<File>;

fn create_output(path: &Path) -> Result<Sink, PipelineError> {
    let file = File::create(path).map_err(|source| {
        error!(path = %path.display(), error = ?source, "Failed to create output file");
        PipelineError::Output {
            path: path.to_path_buf(),
            source,
        }
    })?;
    debug!(path = %path.display(), "Created output file");
    Ok(BufWriter::new(file))
}

fn require(value: &str, what: &'static str) -> Result<(), PipelineError> {
    if value.trim().is_empty() {
        error!(input = what, "Missing required input");
        return Err(PipelineError::MissingInput(what));
    }
    Ok(())
}

/// Walks each root in order and appends its files.
///
/// Returns the number of roots whose contribution was skipped or cut short.
fn aggregate_roots<W: Write>(
    aggregator: &mut Aggregator<W>,
    walker: &TreeWalker,
    roots: &[SourceRoot],
) -> Result<usize, PipelineError> {
    let mut skipped = 0;
    for SourceRoot { root, base } in roots {
        // The walker itself warns about a missing root.
        let missing = !root.exists();
        let mut aborted = false;

        for item in walker.walk_relative_to(root, base) {
            let record = match item {
                Ok(record) => record,
                Err(e) => {
                    warn!(root = %root.display(), error = %e, "Traversal failed, omitting rest of source root");
                    aborted = true;
                    break;
                }
            };
            match aggregator.write_file(&record) {
                Ok(()) => {}
                Err(AggregateError::Read { path, source }) => {
                    warn!(
                        root = %root.display(),
                        path = %path.display(),
                        error = %source,
                        "Failed to read file, omitting rest of source root"
                    );
                    aborted = true;
                    break;
                }
                Err(e) => {
                    error!(error = %e, "Failed to write to output");
                    return Err(e.into());
                }
            }
        }

        if missing || aborted {
            skipped += 1;
        }
    }
    Ok(skipped)
}

fn finish(
    mut aggregator: Aggregator<Sink>,
    output: PathBuf,
    skipped_roots: usize,
) -> Result<RunReport, PipelineError> {
    aggregator.flush()?;
    let report = RunReport {
        output,
        files_written: aggregator.files_written(),
        skipped_roots,
    };
    info!(
        output = %report.output.display(),
        files = report.files_written,
        skipped_roots = report.skipped_roots,
        "Run complete"
    );
    println!("Done! Saved to {}", report.output.display());
    Ok(report)
}

/// Aggregates matching files under local directories.
///
/// The output is created before any root is inspected. Each root is made
/// absolute and headers are relative to it.
pub async fn run_local(config: &LocalConfig) -> Result<RunReport, PipelineError> {
    if config.paths.is_empty() {
        error!("No source paths given");
        return Err(PipelineError::MissingInput("at least one source path"));
    }
    let output = config.output_path();
    let mut aggregator = Aggregator::new(create_output(&output)?);

    let mut unresolved = 0;
    let mut roots = Vec::with_capacity(config.paths.len());
    for path in &config.paths {
        match std::path::absolute(path) {
            Ok(abs) => roots.push(SourceRoot {
                root: abs.clone(),
                base: abs,
            }),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot resolve path, skipping source root");
                unresolved += 1;
            }
        }
    }

    let walker = TreeWalker::new(config.extension_set()).follow_symlinks(config.follow_symlinks);
    let skipped = aggregate_roots(&mut aggregator, &walker, &roots)?;
    finish(aggregator, output, skipped + unresolved)
}

/// Clones a repository and aggregates the configured paths inside it.
///
/// Headers are relative to the clone directory, so they read as repository
/// paths.
pub async fn run_github<M>(config: &GithubConfig, materializer: &M) -> Result<RunReport, PipelineError>
where
    M: RepositoryMaterializer + ?Sized,
{
    require(&config.repo_url, "repository URL")?;

    let clone_dir = tempfile::Builder::new().prefix("gh-docs").tempdir()?;
    println!("Cloning {}...", config.repo_url);
    materializer
        .materialize(&CloneRequest {
            url: config.repo_url.clone(),
            target: clone_dir.path().to_path_buf(),
            shallow: true,
            recurse_submodules: true,
        })
        .await?;

    let output = config.output_path();
    let mut aggregator = Aggregator::new(create_output(&output)?);

    let mut outside = 0;
    let mut roots = Vec::new();
    for rel in config.effective_paths() {
        match path_in_clone(clone_dir.path(), &rel) {
            Some(root) => roots.push(SourceRoot {
                root,
                base: clone_dir.path().to_path_buf(),
            }),
            None => {
                warn!(path = %rel, "Path leaves the repository, skipping source root");
                outside += 1;
            }
        }
    }

    let walker = TreeWalker::new(config.extension_set()).follow_symlinks(config.follow_symlinks);
    let skipped = aggregate_roots(&mut aggregator, &walker, &roots)?;
    finish(aggregator, output, skipped + outside)
}

/// Joins a repository path onto the clone directory.
///
/// Root and prefix components are dropped, so `/docs` means `<clone>/docs`.
/// Returns `None` for paths with `..` components.
fn path_in_clone(clone: &Path, rel: &str) -> Option<PathBuf> {
    let mut joined = clone.to_path_buf();
    for component in Path::new(rel).components() {
        match component {
            Component::Normal(part) => joined.push(part),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            Component::ParentDir => return None,
        }
    }
    Some(joined)
}

/// First root-level file whose lower-cased name starts with "readme",
/// taking directory entries in name order.
fn find_readme(dir: &Path) -> Option<PathBuf> {
    let mut names: Vec<_> = match fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(Result::ok)
            // follows links, so a symlinked README counts
            .filter(|e| e.path().is_file())
            .map(|e| e.file_name())
            .collect(),
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Cannot list clone directory");
            return None;
        }
    };
    names.sort();
    names
        .into_iter()
        .find(|name| name.to_string_lossy().to_lowercase().starts_with("readme"))
        .map(|name| dir.join(name))
}

/// Clones the repository hosting a Go package and records its README and
/// `go doc` output.
///
/// When the documentation command finds nothing, or cannot be started, a
/// placeholder line is written instead and the run still succeeds.
pub async fn run_go<M, D>(
    config: &GoConfig,
    materializer: &M,
    generator: &D,
) -> Result<RunReport, PipelineError>
where
    M: RepositoryMaterializer + ?Sized,
    D: DocGenerator + ?Sized,
{
    require(&config.package, "package path")?;
    let resolved = resolve(&config.package, config.root.as_deref());
    info!(
        repo_root = %resolved.repo_root,
        version = resolved.version.as_deref().unwrap_or("-"),
        doc_path = %resolved.doc_path,
        "Resolved package path"
    );

    let clone_dir = tempfile::Builder::new().prefix("go-docs").tempdir()?;
    println!("Cloning {}...", resolved.clone_url);
    materializer
        .materialize(&CloneRequest {
            url: resolved.clone_url.clone(),
            target: clone_dir.path().to_path_buf(),
            shallow: true,
            recurse_submodules: false,
        })
        .await?;

    let output = config.output_path();
    let mut aggregator = Aggregator::new(create_output(&output)?);
    let sink = aggregator.sink_mut();

    if let Some(readme) = find_readme(clone_dir.path()) {
        match fs::read(&readme) {
            Ok(content) => {
                debug!(readme = %readme.display(), "Prepending README");
                sink.write_all(&content)
                    .map_err(|e| PipelineError::Aggregate(AggregateError::Write(e)))?;
            }
            Err(e) => warn!(readme = %readme.display(), error = %e, "Failed to read README"),
        }
    }
    sink.write_all(GO_DOC_SEPARATOR)
        .map_err(|e| PipelineError::Aggregate(AggregateError::Write(e)))?;

    let docs = match generator.generate(clone_dir.path(), &resolved.doc_path).await {
        Ok(DocOutcome::Found(bytes)) => bytes,
        Ok(DocOutcome::NotFound { detail }) => {
            warn!(doc_path = %resolved.doc_path, detail = %detail, "No documentation found");
            placeholder()
        }
        Err(e) => {
            error!(doc_path = %resolved.doc_path, error = %e, "Documentation command failed to run");
            placeholder()
        }
    };
    sink.write_all(&docs)
        .map_err(|e| PipelineError::Aggregate(AggregateError::Write(e)))?;

    finish(aggregator, output, 0)
}

fn placeholder() -> Vec<u8> {
    format!("{NO_DOCS_PLACEHOLDER}\n").into_bytes()
}

/// Downloads a crate's rustdoc JSON, converts it to Markdown and aggregates
/// the result in path order.
///
/// The converter must exist before anything is downloaded.
pub async fn run_rust<F, C>(
    config: &RustConfig,
    fetcher: &F,
    converter: &C,
) -> Result<RunReport, PipelineError>
where
    F: ArchiveFetcher + ?Sized,
    C: Converter + ?Sized,
{
    require(&config.crate_name, "crate name")?;
    let program = converter.program();
    if !program.exists() {
        error!(converter = %program.display(), "Converter binary not found");
        return Err(PipelineError::ConverterMissing(program));
    }

    println!(
        "Downloading {}...",
        fetcher.archive_url(&config.crate_name, &config.version)
    );
    let json = fetcher.fetch(&config.crate_name, &config.version).await?;

    let mut json_file = tempfile::Builder::new()
        .prefix("crate-")
        .suffix(".json")
        .tempfile()?;
    json_file.write_all(&json)?;
    json_file.flush()?;

    let converted = tempfile::Builder::new().prefix("crate-docs").tempdir()?;
    println!("Converting...");
    converter.convert(json_file.path(), converted.path()).await?;

    let output = config.output_path();
    let mut aggregator = Aggregator::new(create_output(&output)?);
    let files = TreeWalker::new(ExtensionSet::new(["md"])).collect_sorted(converted.path())?;
    info!(files = files.len(), "Aggregating converted Markdown");
    aggregator.aggregate(files)?;

    finish(aggregator, output, 0)
}

/// Runs one batch job with the given collaborators. Rust jobs use the
/// converter named in their own config.
pub async fn run_job<M, D, F>(
    job: &Job,
    materializer: &M,
    generator: &D,
    fetcher: &F,
) -> Result<RunReport, PipelineError>
where
    M: RepositoryMaterializer + ?Sized,
    D: DocGenerator + ?Sized,
    F: ArchiveFetcher + ?Sized,
{
    job.trace_loaded();
    match job {
        Job::Local(config) => run_local(config).await,
        Job::Github(config) => run_github(config, materializer).await,
        Job::Go(config) => run_go(config, materializer, generator).await,
        Job::Rust(config) => {
            let converter = ExternalConverter::new(&config.converter);
            run_rust(config, fetcher, &converter).await
        }
    }
}
