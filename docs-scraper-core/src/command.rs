//! External programs the pipelines run: the Go documentation tool and the
//! rustdoc-JSON to Markdown converter.

use std::path::{Path, PathBuf};
use std::process::Command;

use async_trait::async_trait;
use tracing::{error, info, warn};

use crate::contract::{Converter, DocGenerator, DocOutcome, PipelineError};

/// `go doc -all <path>`, run inside the cloned module.
#[derive(Debug, Clone)]
pub struct GoDoc {
    program: String,
}

impl GoDoc {
    pub fn new() -> Self {
        Self {
            program: "go".to_string(),
        }
    }
}

impl Default for GoDoc {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocGenerator for GoDoc {
    async fn generate(&self, workdir: &Path, doc_path: &str) -> Result<DocOutcome, PipelineError> {
        info!(doc_path, workdir = %workdir.display(), "Running go doc");
        let output = Command::new(&self.program)
            .args(["doc", "-all", doc_path])
            .current_dir(workdir)
            .output()
            .map_err(|source| {
                error!(error = ?source, "Failed to launch go doc");
                PipelineError::Spawn {
                    program: self.program.clone(),
                    source,
                }
            })?;

        if output.status.success() {
            Ok(DocOutcome::Found(output.stdout))
        } else {
            let detail = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(status = ?output.status, detail = %detail, "go doc found no documentation");
            Ok(DocOutcome::NotFound { detail })
        }
    }
}

/// A `cargo-doc-md` style converter: `<program> --json <file> --output <dir>`.
#[derive(Debug, Clone)]
pub struct ExternalConverter {
    program: PathBuf,
}

impl ExternalConverter {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl Converter for ExternalConverter {
    fn program(&self) -> PathBuf {
        self.program.clone()
    }

    async fn convert(&self, input: &Path, output_dir: &Path) -> Result<(), PipelineError> {
        let output = Command::new(&self.program)
            .arg("--json")
            .arg(input)
            .arg("--output")
            .arg(output_dir)
            .output()
            .map_err(|source| {
                error!(error = ?source, program = %self.program.display(), "Failed to launch converter");
                PipelineError::Spawn {
                    program: self.program.display().to_string(),
                    source,
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            error!(status = ?output.status, stderr = %stderr, "Converter exited with non-zero code");
            return Err(PipelineError::Convert {
                detail: if stderr.is_empty() {
                    output.status.to_string()
                } else {
                    stderr
                },
            });
        }

        info!(output_dir = %output_dir.display(), "Converted documentation to Markdown");
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::tempdir;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[tokio::test]
    async fn converter_receives_json_and_output_arguments() {
        let tmp = tempdir().unwrap();
        let program = script(
            tmp.path(),
            "fake-converter",
            r##"[ "$1" = "--json" ] && [ "$3" = "--output" ] && echo "# $(basename "$2")" > "$4/index.md""##,
        );
        let out = tmp.path().join("out");
        fs::create_dir(&out).unwrap();
        let input = tmp.path().join("serde.json");
        fs::write(&input, "{}").unwrap();

        ExternalConverter::new(&program)
            .convert(&input, &out)
            .await
            .expect("converter should succeed");

        assert_eq!(fs::read_to_string(out.join("index.md")).unwrap(), "# serde.json\n");
    }

    #[tokio::test]
    async fn failing_converter_reports_stderr() {
        let tmp = tempdir().unwrap();
        let program = script(tmp.path(), "broken", "echo 'bad input' >&2; exit 3");

        let err = ExternalConverter::new(&program)
            .convert(&tmp.path().join("x.json"), tmp.path())
            .await
            .unwrap_err();
        match err {
            PipelineError::Convert { detail } => assert_eq!(detail, "bad input"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn missing_program_is_a_spawn_error() {
        let tmp = tempdir().unwrap();
        let err = ExternalConverter::new(tmp.path().join("does-not-exist"))
            .convert(&tmp.path().join("x.json"), tmp.path())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Spawn { .. }));
    }
}
