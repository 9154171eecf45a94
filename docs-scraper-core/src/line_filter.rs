//! Line-level removal of MDX module statements.
//!
//! MDX sources mix Markdown with `import ... ;` and `export ...` statements
//! that are noise once the pages are concatenated. Matching is purely
//! syntactic: a statement inside a fenced code example is removed as well.

use once_cell::sync::Lazy;
use regex::Regex;

// Whitespace here is ASCII only; a no-break space before `export` keeps the line.
static IMPORT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\t\n\f\r ]*import[\t\n\f\r ].*;[\t\n\f\r ]*$")
        .expect("import pattern is valid")
});
static EXPORT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\t\n\f\r ]*export[\t\n\f\r ].*$").expect("export pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// Drop the line from the output.
    Elide,
    /// Copy the line verbatim.
    Pass,
}

pub fn classify(line: &str) -> LineClass {
    if IMPORT_LINE.is_match(line) || EXPORT_LINE.is_match(line) {
        LineClass::Elide
    } else {
        LineClass::Pass
    }
}
