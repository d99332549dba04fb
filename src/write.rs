use crate::post::Post;
use crate::report::{Diagnostic, Reporter};
use crate::template::{Bindings, Template};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// The file name of every rendered page.
pub const PAGE_FILE_NAME: &str = "index.html";

/// The token in the index template that receives the concatenated entries.
pub const ENTRIES: &str = "ENTRIES";

/// Responsible for templating and writing HTML pages to disk from [`Post`]
/// sources.
pub struct Writer<'a> {
    /// The root output directory. Each post is written to
    /// `{output_directory}/{slug}/index.html` and the index to
    /// `{output_directory}/index.html`.
    pub output_directory: &'a Path,
}

impl Writer<'_> {
    /// Returns the output directory for a post.
    pub fn post_directory(&self, post: &Post) -> PathBuf {
        self.output_directory.join(&post.slug)
    }

    /// Renders `post` with `template`, writes the page into the post's output
    /// directory (creating it if needed), and copies the post's attachments
    /// next to it. Returns the path of the written page.
    pub fn write_post(
        &self,
        post: &Post,
        template: &Template,
        reporter: &mut dyn Reporter,
    ) -> Result<PathBuf> {
        let directory = self.post_directory(post);
        create_dir_all(&directory)?;
        reporter.report(Diagnostic::progress(&directory, "generating post"));

        let page = directory.join(PAGE_FILE_NAME);
        reporter.report(Diagnostic::progress(&page, "writing post"));
        write_file(&page, &post.render(template))?;

        self.copy_attachments(post, &directory, reporter)?;
        Ok(page)
    }

    // Copies each attachment into `directory` under its base file name. The
    // attachment's source directory structure is not kept.
    fn copy_attachments(
        &self,
        post: &Post,
        directory: &Path,
        reporter: &mut dyn Reporter,
    ) -> Result<()> {
        for attachment in &post.attachments {
            let file_name = match attachment.file_name() {
                Some(file_name) => file_name,
                None => continue,
            };
            let destination = directory.join(file_name);
            reporter.report(Diagnostic::progress(attachment, "copying attachment"));
            if let Err(err) = std::fs::copy(attachment, &destination) {
                return Err(Error::CopyAttachment {
                    source: attachment.to_owned(),
                    destination,
                    err,
                });
            }
        }
        Ok(())
    }

    /// Writes the index page for `posts`, which must already be ordered the
    /// way they should be listed. Returns the path of the written page.
    pub fn write_index(
        &self,
        posts: &[Post],
        index_template: &Template,
        entry_template: &Template,
    ) -> Result<PathBuf> {
        let page = self.output_directory.join(PAGE_FILE_NAME);
        write_file(&page, &render_index(posts, index_template, entry_template))?;
        Ok(page)
    }
}

/// Renders every post with `entry_template`, concatenates the fragments in
/// the order of `posts`, and binds the result to `ENTRIES` in
/// `index_template`.
pub fn render_index(posts: &[Post], index_template: &Template, entry_template: &Template) -> String {
    let entries: String = posts
        .iter()
        .map(|post| post.render_index_entry(entry_template))
        .collect();
    index_template.format(&Bindings::new().bind(ENTRIES, &entries))
}

/// Creates `dir` and its parents. Succeeds if it already exists.
pub fn create_dir_all(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|err| Error::CreateDirectory {
        path: dir.to_owned(),
        err,
    })
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|err| Error::WriteFile {
        path: path.to_owned(),
        err,
    })
}

/// The result of a fallible page-writing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// Returned when an output directory can't be created.
    CreateDirectory { path: PathBuf, err: io::Error },

    /// Returned when a page can't be written.
    WriteFile { path: PathBuf, err: io::Error },

    /// Returned when an attachment can't be copied.
    CopyAttachment {
        source: PathBuf,
        destination: PathBuf,
        err: io::Error,
    },
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::CreateDirectory { path, err } => {
                write!(f, "Creating directory '{}': {}", path.display(), err)
            }
            Error::WriteFile { path, err } => {
                write!(f, "Writing file '{}': {}", path.display(), err)
            }
            Error::CopyAttachment {
                source,
                destination,
                err,
            } => write!(
                f,
                "Copying '{}' to '{}': {}",
                source.display(),
                destination.display(),
                err
            ),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::CreateDirectory { err, .. } => Some(err),
            Error::WriteFile { err, .. } => Some(err),
            Error::CopyAttachment { err, .. } => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::date;
    use crate::report::MemoryReporter;
    use std::fs;

    fn post(slug: &str, date: &str) -> Post {
        Post {
            path: format!("site/{}", slug),
            slug: slug.to_owned(),
            title: slug.to_uppercase(),
            date: date.to_owned(),
            parsed_date: date::parse(date).unwrap(),
            description: String::new(),
            tag: String::from("news"),
            body: format!("<p>{}</p>", slug),
            attachments: Vec::new(),
        }
    }

    #[test]
    fn test_render_index() {
        let posts = vec![post("b", "2025-01-01"), post("a", "2024-01-01")];
        let index = Template::new("<ul>{{{ENTRIES}}}</ul>");
        let entry = Template::new("<li>{{{TITLE}}} {{{DATE}}}</li>");
        assert_eq!(
            "<ul><li>B 2025-01-01</li><li>A 2024-01-01</li></ul>",
            render_index(&posts, &index, &entry)
        );
    }

    #[test]
    fn test_render_index_without_posts() {
        let index = Template::new("<ul>{{{ENTRIES}}}</ul>");
        let entry = Template::new("<li>{{{TITLE}}}</li>");
        assert_eq!("<ul></ul>", render_index(&[], &index, &entry));
    }

    #[test]
    fn test_write_post_copies_attachments() {
        let source = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let logo = source.path().join("logo.png");
        fs::write(&logo, [0u8, 1, 2, 255]).unwrap();

        let mut p = post("hello", "2024-06-15");
        p.attachments.push(logo);

        let writer = Writer {
            output_directory: output.path(),
        };
        let mut reporter = MemoryReporter::new();
        let page = writer
            .write_post(&p, &Template::new("{{{TITLE}}}{{{BODY}}}"), &mut reporter)
            .unwrap();

        assert_eq!(output.path().join("hello").join("index.html"), page);
        assert_eq!("HELLO<p>hello</p>", fs::read_to_string(&page).unwrap());
        assert_eq!(
            vec![0u8, 1, 2, 255],
            fs::read(output.path().join("hello").join("logo.png")).unwrap()
        );
        assert_eq!(0, reporter.skipped().count());
    }

    #[test]
    fn test_copy_missing_attachment_fails() {
        let output = tempfile::tempdir().unwrap();
        let mut p = post("hello", "2024-06-15");
        p.attachments.push(output.path().join("gone.png"));

        let writer = Writer {
            output_directory: output.path(),
        };
        let err = writer
            .write_post(&p, &Template::new(""), &mut MemoryReporter::new())
            .unwrap_err();
        assert!(matches!(err, Error::CopyAttachment { .. }));
    }
}
