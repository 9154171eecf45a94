use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use docs_scraper_core::config::GoConfig;
use docs_scraper_core::contract::{
    CloneRequest, DocOutcome, MockDocGenerator, MockRepositoryMaterializer, PipelineError,
};
use docs_scraper_core::pipeline::run_go;
use tempfile::tempdir;

fn go_config(package: &str, output: PathBuf) -> GoConfig {
    GoConfig {
        package: package.into(),
        root: None,
        output: Some(output),
    }
}

fn git_expecting(url: &'static str) -> MockRepositoryMaterializer {
    let mut git = MockRepositoryMaterializer::new();
    git.expect_materialize()
        .withf(move |req: &CloneRequest| req.url == url && req.shallow && !req.recurse_submodules)
        .times(1)
        .returning(|req: &CloneRequest| {
            fs::write(req.target.join("README.md"), "# Project\n").unwrap();
            fs::write(req.target.join("go.mod"), "module host.com/org/project\n").unwrap();
            Ok(())
        });
    git
}

#[tokio::test]
async fn readme_then_separator_then_docs() {
    let tmp = tempdir().unwrap();
    let output = tmp.path().join("docs.txt");

    let git = git_expecting("https://host.com/org/project");
    let mut docs = MockDocGenerator::new();
    docs.expect_generate()
        .withf(|workdir: &Path, doc_path: &str| {
            doc_path == "./sub/dir" && workdir.join("go.mod").exists()
        })
        .times(1)
        .returning(|_, _| Ok(DocOutcome::Found(b"package dir // import \"x\"\n".to_vec())));

    let report = run_go(
        &go_config("host.com/org/project/sub/dir", output.clone()),
        &git,
        &docs,
    )
    .await
    .expect("run should succeed");

    assert_eq!(report.output, output);
    assert_eq!(
        fs::read_to_string(output).unwrap(),
        "# Project\n\n\n--- GO DOC OUTPUT ---\n\npackage dir // import \"x\"\n"
    );
}

#[tokio::test]
async fn major_version_is_dropped_from_clone_url_and_doc_path() {
    let tmp = tempdir().unwrap();
    let output = tmp.path().join("docs.txt");

    let git = git_expecting("https://host.com/org/project");
    let mut docs = MockDocGenerator::new();
    docs.expect_generate()
        .withf(|_: &Path, doc_path: &str| doc_path == "./sub")
        .times(1)
        .returning(|_, _| Ok(DocOutcome::Found(b"package sub\n".to_vec())));

    run_go(&go_config("host.com/org/project/v2/sub", output.clone()), &git, &docs)
        .await
        .unwrap();

    assert!(fs::read_to_string(output).unwrap().ends_with("package sub\n"));
}

#[tokio::test]
async fn missing_documentation_writes_placeholder() {
    let tmp = tempdir().unwrap();
    let output = tmp.path().join("docs.txt");

    let git = git_expecting("https://host.com/org/project");
    let mut docs = MockDocGenerator::new();
    docs.expect_generate()
        .withf(|_: &Path, doc_path: &str| doc_path == ".")
        .returning(|_, _| {
            Ok(DocOutcome::NotFound {
                detail: "no Go files".into(),
            })
        });

    run_go(&go_config("host.com/org/project", output.clone()), &git, &docs)
        .await
        .expect("not found is not fatal");

    assert!(fs::read_to_string(output)
        .unwrap()
        .ends_with("--- GO DOC OUTPUT ---\n\nNo documentation found for this package.\n"));
}

#[tokio::test]
async fn unstartable_doc_command_writes_placeholder() {
    let tmp = tempdir().unwrap();
    let output = tmp.path().join("docs.txt");

    let git = git_expecting("https://host.com/org/project");
    let mut docs = MockDocGenerator::new();
    docs.expect_generate().returning(|_, _| {
        Err(PipelineError::Spawn {
            program: "go".into(),
            source: io::Error::new(io::ErrorKind::NotFound, "go: not found"),
        })
    });

    run_go(&go_config("host.com/org/project", output.clone()), &git, &docs)
        .await
        .expect("spawn failure is not fatal");

    assert!(fs::read_to_string(output)
        .unwrap()
        .ends_with("No documentation found for this package.\n"));
}

#[tokio::test]
async fn explicit_root_overrides_derivation() {
    let tmp = tempdir().unwrap();
    let output = tmp.path().join("docs.txt");

    let mut git = MockRepositoryMaterializer::new();
    git.expect_materialize()
        .withf(|req: &CloneRequest| req.url == "https://go.example.org/tools")
        .times(1)
        .returning(|_| Ok(()));
    let mut docs = MockDocGenerator::new();
    docs.expect_generate()
        .returning(|_, _| Ok(DocOutcome::Found(b"doc\n".to_vec())));

    let mut cfg = go_config("go.example.org/tools/cmd/x", output.clone());
    cfg.root = Some("go.example.org/tools".into());
    run_go(&cfg, &git, &docs).await.unwrap();

    // no README in the clone: output starts with the separator
    assert_eq!(
        fs::read_to_string(output).unwrap(),
        "\n\n--- GO DOC OUTPUT ---\n\ndoc\n"
    );
}

#[tokio::test]
async fn clone_failure_is_fatal() {
    let tmp = tempdir().unwrap();
    let output = tmp.path().join("docs.txt");

    let mut git = MockRepositoryMaterializer::new();
    git.expect_materialize().returning(|req: &CloneRequest| {
        Err(PipelineError::Clone {
            url: req.url.clone(),
            detail: "exit status: 128".into(),
        })
    });
    let mut docs = MockDocGenerator::new();
    docs.expect_generate().never();

    let err = run_go(&go_config("host.com/org/project", output.clone()), &git, &docs)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Clone { .. }));
    assert!(!output.exists());
}
