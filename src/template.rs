//! Defines the [`Template`] and [`Bindings`] types. A template is a text blob
//! with embedded `{{{TOKEN}}}` markers; formatting replaces every marker whose
//! name appears in the bindings with the bound value. There is no other
//! template syntax: no conditionals, loops, includes, or escaping.
//!
//! The six-brace delimiter is the on-disk format of existing template files.
//! Changing its width is a breaking change.

use std::fmt;
use std::path::{Path, PathBuf};

/// The opening delimiter of a token marker.
pub const TOKEN_OPEN: &str = "{{{";

/// The closing delimiter of a token marker.
pub const TOKEN_CLOSE: &str = "}}}";

/// Returns the literal marker text for a token name (e.g., `TITLE` becomes
/// `{{{TITLE}}}`).
pub fn marker(name: &str) -> String {
    format!("{}{}{}", TOKEN_OPEN, name, TOKEN_CLOSE)
}

/// An ordered mapping from token names to values. Substitution happens in
/// insertion order. Because markers are matched literally this only matters
/// when a bound value itself contains the marker of a later binding, which
/// callers should avoid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bindings<'a> {
    entries: Vec<(&'a str, &'a str)>,
}

impl<'a> Bindings<'a> {
    /// Creates an empty set of bindings.
    pub fn new() -> Bindings<'a> {
        Bindings::default()
    }

    /// Binds `name` to `value` and returns `self` so calls can be chained.
    pub fn bind(mut self, name: &'a str, value: &'a str) -> Bindings<'a> {
        self.insert(name, value);
        self
    }

    /// Binds `name` to `value`. A name that is already bound is rebound in
    /// place, keeping its original position.
    pub fn insert(&mut self, name: &'a str, value: &'a str) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Returns the value bound to `name`, if any.
    pub fn get(&self, name: &str) -> Option<&'a str> {
        self.entries
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| *v)
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a str)> + '_ {
        self.entries.iter().copied()
    }
}

/// An immutable template. One loaded template can be formatted any number of
/// times; [`Template::format`] never modifies it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Template {
    text: String,
}

impl Template {
    /// Creates a template from its text.
    pub fn new<S: Into<String>>(text: S) -> Template {
        Template { text: text.into() }
    }

    /// Loads a template from a file on disk. Fails if the file is missing,
    /// unreadable, or not valid UTF-8.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Template> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => Ok(Template::new(text)),
            Err(err) => Err(Error::Read {
                path: path.to_owned(),
                err,
            }),
        }
    }

    /// Returns the raw template text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces every `{{{NAME}}}` marker for each bound `NAME` with its value
    /// and returns the result. Markers without a binding are left verbatim and
    /// bindings without a marker are ignored. Values are inserted as-is, with
    /// no HTML escaping.
    pub fn format(&self, bindings: &Bindings) -> String {
        let mut formatted = self.text.clone();
        for (name, value) in bindings.iter() {
            let token = marker(name);
            if formatted.contains(&token) {
                formatted = formatted.replace(&token, value);
            }
        }
        formatted
    }
}

/// The result of a fallible template operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading a [`Template`].
#[derive(Debug)]
pub enum Error {
    /// Returned when a template file can't be read.
    Read { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Read { path, err } => {
                write!(f, "Reading template file '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Read { path: _, err } => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_format_replaces_bound_tokens() {
        let template = Template::new("{{{TITLE}}} - {{{DATE}}}");
        let bindings = Bindings::new()
            .bind("TITLE", "Hello")
            .bind("DATE", "2025-01-01");
        assert_eq!("Hello - 2025-01-01", template.format(&bindings));
    }

    #[test]
    fn test_format_replaces_every_occurrence() {
        let template = Template::new("{{{SLUG}}}/{{{SLUG}}}/index.html");
        let bindings = Bindings::new().bind("SLUG", "hello");
        assert_eq!("hello/hello/index.html", template.format(&bindings));
    }

    #[test]
    fn test_format_leaves_unbound_tokens() {
        let template = Template::new("<h1>{{{TITLE}}}</h1>{{{BODY}}}");
        let bindings = Bindings::new().bind("TITLE", "Hi").bind("UNUSED", "x");
        assert_eq!("<h1>Hi</h1>{{{BODY}}}", template.format(&bindings));
    }

    #[test]
    fn test_format_does_not_escape_values() {
        let template = Template::new("<div>{{{BODY}}}</div>");
        let bindings = Bindings::new().bind("BODY", "<p>a & b</p>");
        assert_eq!("<div><p>a & b</p></div>", template.format(&bindings));
    }

    #[test]
    fn test_format_requires_exact_delimiters() {
        let template = Template::new("{{TITLE}} {{{{TITLE}}}}");
        let bindings = Bindings::new().bind("TITLE", "x");
        assert_eq!("{{TITLE}} {x}", template.format(&bindings));
    }

    #[test]
    fn test_format_is_repeatable() {
        let template = Template::new("{{{A}}}{{{B}}}");
        let bindings = Bindings::new().bind("A", "1").bind("B", "2");
        let first = template.format(&bindings);
        let second = template.format(&bindings);
        assert_eq!(first, second);
        assert_eq!("{{{A}}}{{{B}}}", template.text());
    }

    #[test]
    fn test_insert_rebinds_in_place() {
        let mut bindings = Bindings::new().bind("A", "1").bind("B", "2");
        bindings.insert("A", "3");
        let pairs: Vec<_> = bindings.iter().collect();
        assert_eq!(vec![("A", "3"), ("B", "2")], pairs);
        assert_eq!(Some("3"), bindings.get("A"));
        assert_eq!(None, bindings.get("C"));
    }

    #[test]
    fn test_marker() {
        assert_eq!("{{{ENTRIES}}}", marker("ENTRIES"));
    }

    #[test]
    fn test_from_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.html");
        match Template::from_file(&path) {
            Err(Error::Read { path: p, .. }) => assert_eq!(path, p),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("post.html");
        std::fs::write(&path, "<title>{{{TITLE}}}</title>").unwrap();
        let template = Template::from_file(&path).unwrap();
        assert_eq!("<title>{{{TITLE}}}</title>", template.text());
    }
}
