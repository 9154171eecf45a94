//! Recursive discovery of documentation files under a source root.
//!
//! Walks are depth-first in the order the filesystem lists directory
//! entries. Nothing is sorted here except by [`TreeWalker::collect_sorted`].

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::extensions::ExtensionSet;

/// A matched file and the path its header is printed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    pub relative_path: PathBuf,
}

/// Traversal of `root` failed part-way through.
#[derive(Debug)]
pub struct WalkError {
    pub root: PathBuf,
    pub source: walkdir::Error,
}

impl fmt::Display for WalkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error walking {}: {}", self.root.display(), self.source)
    }
}

impl std::error::Error for WalkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

#[derive(Debug, Clone)]
pub struct TreeWalker {
    extensions: ExtensionSet,
    follow_symlinks: bool,
}

impl TreeWalker {
    pub fn new(extensions: ExtensionSet) -> Self {
        Self {
            extensions,
            follow_symlinks: false,
        }
    }

    /// Descend into symbolically linked directories. Off by default.
    ///
    /// Links to regular files are yielded either way.
    pub fn follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    /// Walks `root`, printing paths relative to `root` itself.
    pub fn walk(&self, root: &Path) -> Walk {
        self.walk_relative_to(root, root)
    }

    /// Walks `root`, printing paths relative to `base`.
    ///
    /// A missing `root` logs a single warning and yields nothing.
    pub fn walk_relative_to(&self, root: &Path, base: &Path) -> Walk {
        let entries = if root.exists() {
            debug!(root = %root.display(), "Walking source root");
            Some(
                WalkDir::new(root)
                    .follow_links(self.follow_symlinks)
                    .into_iter(),
            )
        } else {
            warn!(root = %root.display(), "Path not found, skipping source root");
            None
        };

        Walk {
            entries,
            root: root.to_path_buf(),
            base: base.to_path_buf(),
            extensions: self.extensions.clone(),
        }
    }

    /// Collects every match under `root`, sorted by full path byte order.
    pub fn collect_sorted(&self, root: &Path) -> Result<Vec<FileRecord>, WalkError> {
        let mut records = self.walk(root).collect::<Result<Vec<_>, _>>()?;
        records.sort_by(|a, b| a.path.as_os_str().cmp(b.path.as_os_str()));
        Ok(records)
    }
}

/// Lazy sequence of matched files. Stops after the first traversal error.
pub struct Walk {
    entries: Option<walkdir::IntoIter>,
    root: PathBuf,
    base: PathBuf,
    extensions: ExtensionSet,
}

impl Walk {
    fn record_for(&self, path: PathBuf) -> FileRecord {
        let relative_path = match path.strip_prefix(&self.base) {
            Ok(rel) if rel.as_os_str().is_empty() => {
                // root is the file itself
                path.file_name().map(PathBuf::from).unwrap_or_default()
            }
            Ok(rel) => rel.to_path_buf(),
            Err(_) => path.clone(),
        };
        FileRecord {
            path,
            relative_path,
        }
    }
}

impl Iterator for Walk {
    type Item = Result<FileRecord, WalkError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let next = self.entries.as_mut()?.next()?;
            match next {
                Ok(entry) => {
                    // A link to a file counts as a file; linked directories
                    // are only entered when following links.
                    let is_file = entry.file_type().is_file()
                        || (entry.path_is_symlink() && entry.path().is_file());
                    if !is_file {
                        continue;
                    }
                    if !self.extensions.matches(&entry.file_name().to_string_lossy()) {
                        continue;
                    }
                    return Some(Ok(self.record_for(entry.into_path())));
                }
                Err(source) => {
                    self.entries = None;
                    return Some(Err(WalkError {
                        root: self.root.clone(),
                        source,
                    }));
                }
            }
        }
    }
}
