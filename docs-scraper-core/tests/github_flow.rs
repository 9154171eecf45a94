use std::fs;

use docs_scraper_core::config::GithubConfig;
use docs_scraper_core::contract::{CloneRequest, MockRepositoryMaterializer, PipelineError};
use docs_scraper_core::pipeline::run_github;
use tempfile::tempdir;

fn populate(req: &CloneRequest) -> Result<(), PipelineError> {
    let root = &req.target;
    fs::create_dir_all(root.join("docs/guide")).unwrap();
    fs::write(root.join("README.md"), "# Repo\n").unwrap();
    fs::write(root.join("docs/index.md"), "import A from './a';\nWelcome\n").unwrap();
    fs::write(root.join("docs/guide/usage.mdx"), "Usage\n").unwrap();
    fs::write(root.join("docs/guide/main.go"), "package main\n").unwrap();
    Ok(())
}

fn config(paths: Vec<&str>, output: std::path::PathBuf) -> GithubConfig {
    GithubConfig {
        repo_url: "https://github.com/org/repo".into(),
        paths: paths.into_iter().map(String::from).collect(),
        extensions: vec!["md".into(), "mdx".into()],
        output: Some(output),
        follow_symlinks: false,
    }
}

#[tokio::test]
async fn selected_paths_are_aggregated_relative_to_the_clone() {
    let tmp = tempdir().unwrap();
    let output = tmp.path().join("out.md");

    let mut git = MockRepositoryMaterializer::new();
    git.expect_materialize()
        .withf(|req: &CloneRequest| {
            req.url == "https://github.com/org/repo" && req.shallow && req.recurse_submodules
        })
        .times(1)
        .returning(populate);

    let report = run_github(&config(vec!["docs", "missing"], output.clone()), &git)
        .await
        .expect("run should succeed");

    assert_eq!(report.files_written, 2);
    assert_eq!(report.skipped_roots, 1);

    let out = fs::read_to_string(output).unwrap();
    assert!(out.contains("<!-- FILE: docs/index.md -->\n\n### docs/index.md\n\nWelcome\n"));
    assert!(out.contains("### docs/guide/usage.mdx"));
    assert!(!out.contains("README.md"));
    assert!(!out.contains("main.go"));
    assert!(!out.contains("import A"));
}

#[tokio::test]
async fn default_path_covers_the_whole_repository() {
    let tmp = tempdir().unwrap();
    let output = tmp.path().join("out.md");

    let mut git = MockRepositoryMaterializer::new();
    git.expect_materialize().times(1).returning(populate);

    let report = run_github(&config(vec!["."], output.clone()), &git)
        .await
        .unwrap();

    assert_eq!(report.files_written, 3);
    let out = fs::read_to_string(output).unwrap();
    assert!(out.contains("### README.md"));
    assert!(out.contains("### docs/index.md"));
}

#[tokio::test]
async fn clone_failure_is_fatal_and_writes_nothing() {
    let tmp = tempdir().unwrap();
    let output = tmp.path().join("out.md");

    let mut git = MockRepositoryMaterializer::new();
    git.expect_materialize().returning(|req: &CloneRequest| {
        Err(PipelineError::Clone {
            url: req.url.clone(),
            detail: "repository not found".into(),
        })
    });

    let err = run_github(&config(vec!["docs"], output.clone()), &git)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("repository not found"));
    assert!(!output.exists());
}

#[tokio::test]
async fn empty_url_is_rejected_before_cloning() {
    let tmp = tempdir().unwrap();
    let mut cfg = config(vec!["docs"], tmp.path().join("out.md"));
    cfg.repo_url = String::new();

    let mut git = MockRepositoryMaterializer::new();
    git.expect_materialize().never();

    let err = run_github(&cfg, &git).await.unwrap_err();
    assert!(matches!(err, PipelineError::MissingInput(_)));
}

#[tokio::test]
async fn paths_never_leave_the_clone() {
    let host = tempdir().unwrap();
    fs::write(host.path().join("host_secret.md"), "HOST FILE\n").unwrap();
    let tmp = tempdir().unwrap();
    let output = tmp.path().join("out.md");
    let absolute = host.path().to_string_lossy().into_owned();

    let mut git = MockRepositoryMaterializer::new();
    git.expect_materialize().times(1).returning(populate);

    let report = run_github(
        &config(vec![absolute.as_str(), "../outside", "/docs"], output.clone()),
        &git,
    )
    .await
    .unwrap();

    // "/docs" is the repository's docs directory; the other two are skipped
    assert_eq!(report.files_written, 2);
    assert_eq!(report.skipped_roots, 2);
    let out = fs::read_to_string(output).unwrap();
    assert!(!out.contains("HOST FILE"));
    assert!(!out.contains("host_secret.md"));
    assert!(out.contains("### docs/index.md"));
}
