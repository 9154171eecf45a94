//! Decomposition of a module path into a cloneable repository and the
//! package location inside it.
//!
//! `github.com/org/project/v2/sub` resolves to the repository root
//! `github.com/org/project/v2`, clone URL `https://github.com/org/project`
//! and relative path `sub`. A major-version segment is part of the import
//! path but not of the repository location.
//!
//! Resolution never fails; inputs with fewer than three segments are treated
//! as a repository root in their entirety.

/// Number of leading segments that identify a repository (host/org/project).
const REPO_SEGMENTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// Repository root used for resolution, version segment included.
    pub repo_root: String,
    /// Trailing major-version segment of `repo_root`, if any.
    pub version: Option<String>,
    /// Package location inside the repository; empty for the root.
    pub relative_path: String,
    pub clone_url: String,
    /// Argument for the doc command: `./<relative_path>` or `.`.
    pub doc_path: String,
}

/// Returns true for `v` followed by one or more ASCII digits.
pub fn is_version_segment(segment: &str) -> bool {
    match segment.strip_prefix('v') {
        Some(digits) => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

pub fn resolve(module_path: &str, explicit_root: Option<&str>) -> ResolvedPath {
    let segments: Vec<&str> = module_path.split('/').collect();

    let repo_root = match explicit_root {
        Some(root) => root.to_string(),
        None => derive_repo_root(module_path, &segments),
    };

    let root_segments: Vec<&str> = repo_root.split('/').collect();
    let version = root_segments
        .last()
        .filter(|last| root_segments.len() > 1 && is_version_segment(last))
        .map(|last| last.to_string());
    let clone_target = match version {
        Some(_) => root_segments[..root_segments.len() - 1].join("/"),
        None => repo_root.clone(),
    };

    let relative_path = relative_segments(module_path, &segments, &repo_root).join("/");
    let doc_path = if relative_path.is_empty() {
        ".".to_string()
    } else {
        format!("./{relative_path}")
    };

    ResolvedPath {
        clone_url: format!("https://{clone_target}"),
        repo_root,
        version,
        relative_path,
        doc_path,
    }
}

fn derive_repo_root(module_path: &str, segments: &[&str]) -> String {
    if segments.len() < REPO_SEGMENTS {
        return module_path.to_string();
    }
    let mut root = segments[..REPO_SEGMENTS].to_vec();
    if let Some(next) = segments.get(REPO_SEGMENTS) {
        if is_version_segment(next) {
            root.push(next);
        }
    }
    root.join("/")
}

/// Segments of `module_path` below the repository, version segment consumed.
fn relative_segments<'a>(module_path: &'a str, segments: &[&'a str], repo_root: &str) -> Vec<&'a str> {
    let remainder: Vec<&str> = if segments.len() >= REPO_SEGMENTS {
        segments[REPO_SEGMENTS..].to_vec()
    } else {
        module_path
            .strip_prefix(repo_root)
            .unwrap_or(module_path)
            .split('/')
            .collect()
    };

    let mut remainder = trim_empty(remainder);
    if remainder.first().is_some_and(|first| is_version_segment(first)) {
        remainder = trim_empty(remainder.split_off(1));
    }
    remainder
}

/// Drops empty segments left by leading or trailing separators.
fn trim_empty(mut segments: Vec<&str>) -> Vec<&str> {
    while segments.first().is_some_and(|s| s.is_empty()) {
        segments.remove(0);
    }
    while segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }
    segments
}
