//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: parsing each post directory
//! ([`crate::parser`]), rendering and writing post pages and their
//! attachments ([`crate::write`]), and rendering the index page listing every
//! post newest first.

use crate::config::Config;
use crate::parser::{Error as ParseError, Parser as PostParser};
use crate::post::{sort_newest_first, Post};
use crate::report::{Diagnostic, Reporter};
use crate::template::{Error as TemplateError, Template};
use crate::write::{self, Error as WriteError, Writer};
use std::fmt;
use std::path::{Path, PathBuf};

/// What a completed build produced.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// The slugs of the posts written, in index order (newest first).
    pub posts: Vec<String>,

    /// The input entries that were skipped, in the order they were found.
    pub skipped: Vec<PathBuf>,

    /// The path of the index page.
    pub index: PathBuf,
}

/// Builds the site from a [`Config`] object. Every entry of the posts
/// directory is processed in directory-listing order. Entries that aren't
/// directories and directories that aren't valid posts are reported to
/// `reporter` and skipped. Missing templates and I/O failures abort the
/// build.
pub fn build_site(config: &Config, reporter: &mut dyn Reporter) -> Result<Summary> {
    // Ensure the output directory always exists
    write::create_dir_all(&config.output_directory)?;

    let post_template = Template::from_file(&config.post_template)?;
    let post_parser = PostParser::new(&config.output_directory);
    let writer = Writer {
        output_directory: &config.output_directory,
    };

    let mut posts: Vec<Post> = Vec::new();
    let mut skipped = Vec::new();
    for input_root in list_directory(&config.posts_directory)? {
        reporter.report(Diagnostic::progress(&input_root, "processing"));

        if !input_root.is_dir() {
            reporter.report(Diagnostic::skipped(&input_root, "not a post directory"));
            skipped.push(input_root);
            continue;
        }

        let slug = match input_root.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => continue,
        };
        let bundle = match post_parser.parse_bundle(&input_root, &slug) {
            Ok(bundle) => bundle,
            Err(err) if err.is_malformed_post() => {
                reporter.report(Diagnostic::skipped(
                    &input_root,
                    format!("invalid post: {}", err),
                ));
                skipped.push(input_root);
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        for ignored in &bundle.ignored {
            reporter.report(Diagnostic::skipped(ignored, "not an attachment"));
        }

        writer.write_post(&bundle.post, &post_template, reporter)?;
        posts.push(bundle.post);
    }

    sort_newest_first(&mut posts);

    let entry_template = Template::from_file(&config.index_entry_template)?;
    let index_template = Template::from_file(&config.index_template)?;
    let index = writer.write_index(&posts, &index_template, &entry_template)?;
    reporter.report(Diagnostic::progress(&index, "wrote index"));

    Ok(Summary {
        posts: posts.into_iter().map(|post| post.slug).collect(),
        skipped,
        index,
    })
}

// Lists the entries of `dir` in the order the file system returns them.
fn list_directory(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_dir = |err| Error::ReadDirectory {
        path: dir.to_owned(),
        err,
    };
    let mut entries = Vec::new();
    for result in std::fs::read_dir(dir).map_err(read_dir)? {
        entries.push(result.map_err(read_dir)?.path());
    }
    Ok(entries)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Only failures that abort the whole
/// build are returned; malformed posts are reported and skipped instead.
#[derive(Debug)]
pub enum Error {
    /// Returned when a template file can't be loaded.
    Template(TemplateError),

    /// Returned for I/O errors while parsing a post directory.
    Parse(ParseError),

    /// Returned for errors writing pages or copying attachments.
    Write(WriteError),

    /// Returned when the posts directory can't be listed.
    ReadDirectory { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::Parse(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::ReadDirectory { path, err } => {
                write!(f, "Reading posts directory '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(err) => Some(err),
            Error::Parse(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::ReadDirectory { path: _, err } => Some(err),
        }
    }
}

impl From<TemplateError> for Error {
    /// Converts [`TemplateError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: TemplateError) -> Error {
        Error::Template(err)
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}
