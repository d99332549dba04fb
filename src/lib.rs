//! The library code for the `quill` static site generator. A site is built
//! from a directory of post directories in two steps:
//!
//! 1. Parsing each post directory into a [`post::Post`] ([`crate::parser`])
//! 2. Rendering each post to its own page and all of them to an index page
//!    ([`crate::write`])
//!
//! Pages are rendered with [`template::Template`], which does nothing more
//! than replace `{{{TOKEN}}}` markers with bound values. [`build::build_site`]
//! ties the steps together; malformed posts are reported through a
//! [`report::Reporter`] and skipped.
//!
//! The `quill` binary takes its five paths as command-line flags.
//! [`config::Config::from_project_file`] is a library-only entry point for
//! embedders that keep those paths in a YAML project file instead.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod date;
pub mod parser;
pub mod post;
pub mod report;
pub mod template;
pub mod write;

mod util;

pub use build::{build_site, Summary};
pub use config::Config;
