//! Defines the [`Post`] type along with the token names it binds when it is
//! rendered into a page or an index entry, and the newest-first ordering used
//! for the index.

use crate::template::{Bindings, Template};
use chrono::NaiveDateTime;
use std::path::PathBuf;

pub const TITLE: &str = "TITLE";
pub const DESC: &str = "DESC";
pub const TAG: &str = "TAG";
pub const DATE: &str = "DATE";
pub const BODY: &str = "BODY";
pub const PATH: &str = "PATH";
pub const SLUG: &str = "SLUG";

/// Represents a single post, parsed from a post directory by
/// [`crate::parser::Parser`]. Posts are not modified after parsing.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    /// The relative path used to link to the post, `{output_name}/{slug}`.
    pub path: String,

    /// The name of the source directory. It is also the name of the output
    /// directory.
    pub slug: String,

    /// The title of the post.
    pub title: String,

    /// The date of the post, exactly as authored.
    pub date: String,

    /// The parsed form of `date`. Only used for ordering.
    pub parsed_date: NaiveDateTime,

    /// The description of the post. Empty if the config doesn't provide one.
    pub description: String,

    /// The tag of the post.
    pub tag: String,

    /// The post body rendered to HTML.
    pub body: String,

    /// Files to copy next to the rendered page, in directory-listing order.
    pub attachments: Vec<PathBuf>,
}

impl Post {
    /// The sort key for a post.
    pub fn key(&self) -> NaiveDateTime {
        self.parsed_date
    }

    /// Returns the bindings shared by the post page and the index entry:
    /// `TITLE`, `DESC`, `TAG`, `DATE`, `PATH`, and `SLUG`.
    pub fn bindings(&self) -> Bindings<'_> {
        Bindings::new()
            .bind(TITLE, &self.title)
            .bind(DESC, &self.description)
            .bind(TAG, &self.tag)
            .bind(DATE, &self.date)
            .bind(PATH, &self.path)
            .bind(SLUG, &self.slug)
    }

    /// Renders the post page. Binds `BODY` in addition to the tokens bound
    /// by [`Post::bindings`].
    pub fn render(&self, template: &Template) -> String {
        let mut bindings = self.bindings();
        bindings.insert(BODY, &self.body);
        template.format(&bindings)
    }

    /// Renders the post's fragment of the index page. `BODY` is not bound.
    pub fn render_index_entry(&self, template: &Template) -> String {
        template.format(&self.bindings())
    }
}

/// Sorts posts newest first. The sort is stable, so posts with the same date
/// keep the order in which they were discovered.
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.key().cmp(&a.key()));
}
