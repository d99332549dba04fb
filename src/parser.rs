//! Defines the [`Parser`], [`Bundle`], and [`Error`] types, and the logic for
//! parsing a post directory from the file system into a [`Post`].
//!
//! A post directory looks like this:
//!
//! ```text
//! hello-world/
//! ├── post.cfg    # title, date, tag, and an optional description
//! ├── post.txt    # the markdown body
//! └── logo.png    # anything else is an attachment
//! ```
//!
//! `post.cfg` holds one field per line, in order:
//!
//! ```text
//! Hello, world!
//! 2024-06-15
//! news
//! An optional one-line description
//! ```

use std::{
    fmt,
    path::{Path, PathBuf},
};

use pulldown_cmark::{html, Parser as MarkdownParser};
use walkdir::WalkDir;

use crate::{date, post::Post};

/// The name of the file holding a post's title, date, tag, and description.
pub const CONFIG_FILE_NAME: &str = "post.cfg";

/// The name of the file holding a post's markdown body.
pub const BODY_FILE_NAME: &str = "post.txt";

/// Parses [`Post`] objects from post directories.
pub struct Parser {
    /// `output_name` is the final component of the output directory. It
    /// prefixes post paths (i.e., the path for a post is
    /// `{output_name}/{slug}`).
    output_name: String,
}

/// A parsed [`Post`] plus the entries of its directory that were neither
/// parsed nor collected as attachments (i.e., subdirectories).
#[derive(Debug)]
pub struct Bundle {
    pub post: Post,
    pub ignored: Vec<PathBuf>,
}

impl Parser {
    /// Constructs a new parser for posts that will be rendered into
    /// `output_directory`. Post paths are prefixed with the directory's final
    /// component; a trailing separator is ignored, so `out/site/` and
    /// `out/site` both give `site/<slug>`.
    pub fn new(output_directory: &Path) -> Parser {
        Parser {
            output_name: output_directory
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }

    /// Parses the post directory at `root`, identified by `slug`. See
    /// [`Parser::parse_bundle`].
    pub fn parse_post(&self, root: &Path, slug: &str) -> Result<Post> {
        self.parse_bundle(root, slug).map(|bundle| bundle.post)
    }

    /// Parses the post directory at `root`, identified by `slug`, and
    /// collects its attachments. Fails if `post.cfg` is missing or doesn't
    /// have 3 or 4 lines, if a mandatory field is empty, if `post.txt` is
    /// missing, or if the date can't be parsed.
    pub fn parse_bundle(&self, root: &Path, slug: &str) -> Result<Bundle> {
        let config_path = root.join(CONFIG_FILE_NAME);
        if !config_path.is_file() {
            return Err(Error::MissingConfig(root.to_owned()));
        }
        let fields = Fields::parse(&config_path, &std::fs::read_to_string(&config_path)?)?;

        let body_path = root.join(BODY_FILE_NAME);
        if !body_path.is_file() {
            return Err(Error::MissingBody(root.to_owned()));
        }
        let markdown = std::fs::read_to_string(&body_path)?;
        let mut body = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut body, MarkdownParser::new(&markdown));

        let (attachments, ignored) = Self::attachments(root)?;

        let parsed_date = date::parse(&fields.date).map_err(|err| Error::InvalidDate {
            path: config_path.clone(),
            err,
        })?;

        Ok(Bundle {
            post: Post {
                path: self.post_path(slug),
                slug: slug.to_owned(),
                title: fields.title,
                date: fields.date,
                parsed_date,
                description: fields.description,
                tag: fields.tag,
                body,
                attachments,
            },
            ignored,
        })
    }

    fn post_path(&self, slug: &str) -> String {
        match self.output_name.is_empty() {
            true => slug.to_owned(),
            false => format!("{}/{}", self.output_name, slug),
        }
    }

    // Returns the files in `root` other than the config and body files, in
    // directory-listing order, and separately any subdirectories.
    fn attachments(root: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
        let mut attachments = Vec::new();
        let mut ignored = Vec::new();
        for result in WalkDir::new(root).min_depth(1).max_depth(1) {
            let entry = result?;
            if entry.file_name() == CONFIG_FILE_NAME || entry.file_name() == BODY_FILE_NAME {
                continue;
            }
            if entry.path().is_dir() {
                ignored.push(entry.into_path());
            } else {
                attachments.push(entry.into_path());
            }
        }
        Ok((attachments, ignored))
    }
}

/// The fields of a `post.cfg` file.
struct Fields {
    title: String,
    date: String,
    tag: String,
    description: String,
}

impl Fields {
    fn parse(path: &Path, contents: &str) -> Result<Fields> {
        let lines: Vec<&str> = contents.lines().map(str::trim_end).collect();
        if lines.len() < 3 || lines.len() > 4 {
            return Err(Error::ConfigLineCount {
                path: path.to_owned(),
                lines: lines.len(),
            });
        }

        for (field, value) in [("title", lines[0]), ("date", lines[1]), ("tag", lines[2])] {
            if value.trim().is_empty() {
                return Err(Error::EmptyField {
                    path: path.to_owned(),
                    field,
                });
            }
        }

        Ok(Fields {
            title: lines[0].to_owned(),
            date: lines[1].to_owned(),
            tag: lines[2].to_owned(),
            description: lines.get(3).copied().unwrap_or_default().to_owned(),
        })
    }
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] object.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post directory has no `post.cfg` file.
    MissingConfig(PathBuf),

    /// Returned when `post.cfg` has fewer than 3 or more than 4 lines.
    ConfigLineCount { path: PathBuf, lines: usize },

    /// Returned when the title, date, or tag line of `post.cfg` is blank.
    EmptyField { path: PathBuf, field: &'static str },

    /// Returned when a post directory has no `post.txt` file.
    MissingBody(PathBuf),

    /// Returned when the date in `post.cfg` can't be parsed.
    InvalidDate { path: PathBuf, err: date::Error },

    /// Returned for other I/O errors.
    Io(std::io::Error),

    /// Returned for WalkDir I/O errors.
    WalkDir(walkdir::Error),
}

impl Error {
    /// Whether the error means the post is malformed, as opposed to an I/O
    /// failure. Malformed posts are skipped; I/O failures abort the build.
    pub fn is_malformed_post(&self) -> bool {
        !matches!(self, Error::Io(_) | Error::WalkDir(_))
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::MissingConfig(root) => write!(
                f,
                "Post dir '{}' is missing a '{}' file",
                root.display(),
                CONFIG_FILE_NAME
            ),
            Error::ConfigLineCount { path, lines } => write!(
                f,
                "Config '{}' must have 3 or 4 lines, found {}",
                path.display(),
                lines
            ),
            Error::EmptyField { path, field } => {
                write!(f, "Config '{}' has an empty {} line", path.display(), field)
            }
            Error::MissingBody(root) => write!(
                f,
                "Post dir '{}' is missing a '{}' file",
                root.display(),
                BODY_FILE_NAME
            ),
            Error::InvalidDate { path, err } => {
                write!(f, "Config '{}': {}", path.display(), err)
            }
            Error::Io(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::MissingConfig(_) => None,
            Error::ConfigLineCount { .. } => None,
            Error::EmptyField { .. } => None,
            Error::MissingBody(_) => None,
            Error::InvalidDate { path: _, err } => Some(err),
            Error::Io(err) => Some(err),
            Error::WalkDir(err) => Some(err),
        }
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for directory listings.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn post_dir(config: &str, body: Option<&str>) -> (TempDir, PathBuf) {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("hello");
        fs::create_dir(&root).unwrap();
        fs::write(root.join(CONFIG_FILE_NAME), config).unwrap();
        if let Some(body) = body {
            fs::write(root.join(BODY_FILE_NAME), body).unwrap();
        }
        (temp, root)
    }

    #[test]
    fn test_parse_post() -> Result<()> {
        let (_temp, root) = post_dir(
            "Hello, world!  \n2024-06-15\nnews\nFirst post\n",
            Some("# Hello\n\n*World*\n"),
        );
        let post = Parser::new(Path::new("/tmp/site")).parse_post(&root, "hello")?;

        assert_eq!("site/hello", post.path);
        assert_eq!("hello", post.slug);
        assert_eq!("Hello, world!", post.title);
        assert_eq!("2024-06-15", post.date);
        assert_eq!(date::parse("2024-06-15").unwrap(), post.parsed_date);
        assert_eq!("news", post.tag);
        assert_eq!("First post", post.description);
        assert_eq!("<h1>Hello</h1>\n<p><em>World</em></p>\n", post.body);
        assert!(post.attachments.is_empty());
        Ok(())
    }

    #[test]
    fn test_description_is_optional() -> Result<()> {
        let (_temp, root) = post_dir("Title\r\n2024-06-15\r\nnews\r\n", Some(""));
        let post = Parser::new(Path::new("site")).parse_post(&root, "hello")?;
        assert_eq!("Title", post.title);
        assert_eq!("news", post.tag);
        assert_eq!("", post.description);
        Ok(())
    }

    #[test]
    fn test_post_path_uses_final_output_component() -> Result<()> {
        let (_temp, root) = post_dir("Title\n2024-06-15\nnews\n", Some(""));
        let path = |output: &str| -> Result<String> {
            Ok(Parser::new(Path::new(output)).parse_post(&root, "hello")?.path)
        };
        assert_eq!("site/hello", path("out/site/")?);
        assert_eq!("site/hello", path("out/site")?);
        assert_eq!("hello", path("/")?);
        assert_eq!("hello", path(".")?);
        Ok(())
    }

    #[test]
    fn test_missing_config() {
        let temp = TempDir::new().unwrap();
        let err = Parser::new(Path::new("site"))
            .parse_post(temp.path(), "empty")
            .unwrap_err();
        assert!(matches!(err, Error::MissingConfig(_)));
        assert!(err.is_malformed_post());
    }

    #[test]
    fn test_too_few_lines() {
        let (_temp, root) = post_dir("Title\n2024-06-15\n", Some("body"));
        let err = Parser::new(Path::new("site")).parse_post(&root, "hello").unwrap_err();
        assert!(matches!(err, Error::ConfigLineCount { lines: 2, .. }));
    }

    #[test]
    fn test_too_many_lines() {
        let (_temp, root) = post_dir("Title\n2024-06-15\nnews\ndesc\nextra\n", Some("body"));
        let err = Parser::new(Path::new("site")).parse_post(&root, "hello").unwrap_err();
        assert!(matches!(err, Error::ConfigLineCount { lines: 5, .. }));
    }

    #[test]
    fn test_blank_lines_count() {
        let (_temp, root) = post_dir("Title\n2024-06-15\nnews\n\n\n", Some("body"));
        let err = Parser::new(Path::new("site")).parse_post(&root, "hello").unwrap_err();
        assert!(matches!(err, Error::ConfigLineCount { lines: 5, .. }));
    }

    #[test]
    fn test_empty_tag() {
        let (_temp, root) = post_dir("Title\n2024-06-15\n   \n", Some("body"));
        let err = Parser::new(Path::new("site")).parse_post(&root, "hello").unwrap_err();
        assert!(matches!(err, Error::EmptyField { field: "tag", .. }));
    }

    #[test]
    fn test_missing_body() {
        let (_temp, root) = post_dir("Title\n2024-06-15\nnews\n", None);
        let err = Parser::new(Path::new("site")).parse_post(&root, "hello").unwrap_err();
        assert!(matches!(err, Error::MissingBody(_)));
    }

    #[test]
    fn test_invalid_date() {
        let (_temp, root) = post_dir("Title\nsometime soon\nnews\n", Some("body"));
        let err = Parser::new(Path::new("site")).parse_post(&root, "hello").unwrap_err();
        match &err {
            Error::InvalidDate { err, .. } => assert_eq!("sometime soon", err.input()),
            _ => panic!("unexpected error: {}", err),
        }
        assert!(err.is_malformed_post());
    }

    #[test]
    fn test_attachments() -> Result<()> {
        let (_temp, root) = post_dir("Title\n2024-06-15\nnews\n", Some("body"));
        fs::write(root.join("logo.png"), [0x89, b'P', b'N', b'G']).unwrap();
        fs::write(root.join("notes.txt"), "notes").unwrap();
        fs::create_dir(root.join("drafts")).unwrap();

        let bundle = Parser::new(Path::new("site")).parse_bundle(&root, "hello")?;
        let mut attachments = bundle.post.attachments.clone();
        attachments.sort();
        assert_eq!(vec![root.join("logo.png"), root.join("notes.txt")], attachments);
        assert_eq!(vec![root.join("drafts")], bundle.ignored);
        Ok(())
    }
}
