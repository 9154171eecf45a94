//! Filename suffix matching for documentation files.

/// Extensions used when a run does not configure any.
pub const DEFAULT_EXTENSIONS: &[&str] = &["mdx", "md"];

/// A normalized, case-insensitive set of filename suffixes.
///
/// Each configured extension may carry a single leading `.`; `"md"` and
/// `".md"` are the same entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionSet {
    suffixes: Vec<String>,
}

impl ExtensionSet {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let suffixes = extensions
            .into_iter()
            .map(|ext| {
                let ext = ext.as_ref();
                format!(".{}", ext.strip_prefix('.').unwrap_or(ext).to_lowercase())
            })
            .collect();
        Self { suffixes }
    }

    /// Builds the set from configured extensions, falling back to
    /// [`DEFAULT_EXTENSIONS`] when none are configured.
    pub fn or_default<S: AsRef<str>>(extensions: &[S]) -> Self {
        if extensions.is_empty() {
            Self::new(DEFAULT_EXTENSIONS)
        } else {
            Self::new(extensions)
        }
    }

    pub fn matches(&self, filename: &str) -> bool {
        let filename = filename.to_lowercase();
        self.suffixes.iter().any(|suffix| filename.ends_with(suffix))
    }

    pub fn is_empty(&self) -> bool {
        self.suffixes.is_empty()
    }
}

impl Default for ExtensionSet {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENSIONS)
    }
}

/// Tests `filename` against `extensions` without building a set first.
pub fn matches<S: AsRef<str>>(filename: &str, extensions: &[S]) -> bool {
    ExtensionSet::new(extensions).matches(filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_dot_and_case_are_ignored() {
        assert_eq!(matches("a.MD", &["md"]), matches("a.md", &[".md"]));
        assert!(matches("a.MD", &["md"]));
        assert!(matches("guide.Mdx", &[".MDX"]));
    }

    #[test]
    fn requires_a_dot_before_the_suffix() {
        assert!(!matches("readmemd", &["md"]));
        assert!(!matches("notes.txt", &["md", "mdx"]));
        assert!(matches(".md", &["md"]));
    }

    #[test]
    fn only_a_single_leading_dot_is_stripped() {
        let set = ExtensionSet::new(["..md"]);
        assert!(set.matches("a..md"));
        assert!(!set.matches("a.md"));
    }

    #[test]
    fn empty_configuration_falls_back_to_markdown() {
        let none: [&str; 0] = [];
        let set = ExtensionSet::or_default(&none);
        assert!(set.matches("intro.md"));
        assert!(set.matches("intro.mdx"));
        assert!(!set.matches("intro.txt"));
        assert_eq!(set, ExtensionSet::default());
    }

    #[test]
    fn explicit_empty_set_matches_nothing() {
        let none: [&str; 0] = [];
        let set = ExtensionSet::new(none);
        assert!(set.is_empty());
        assert!(!set.matches("intro.md"));
    }
}
