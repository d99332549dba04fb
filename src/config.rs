use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The on-disk form of a project file. Every key is a path, relative to the
/// directory containing the project file unless it is absolute.
///
/// ```yaml
/// post_template: theme/post.html
/// index_template: theme/index.html
/// index_entry_template: theme/index-entry.html
/// posts: posts
/// output: site
/// ```
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Project {
    post_template: PathBuf,
    index_template: PathBuf,
    index_entry_template: PathBuf,
    posts: PathBuf,
    output: PathBuf,
}

/// The inputs and output of a build.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// The template for post pages.
    pub post_template: PathBuf,

    /// The template for the index page. It receives the `ENTRIES` token.
    pub index_template: PathBuf,

    /// The template for a single post's entry on the index page.
    pub index_entry_template: PathBuf,

    /// The directory containing one subdirectory per post.
    pub posts_directory: PathBuf,

    /// The directory the site is written to.
    pub output_directory: PathBuf,
}

impl Config {
    /// Loads a [`Config`] from a YAML project file. Relative paths are
    /// resolved against the project file's directory. The `quill` binary does
    /// not read project files; this is for library callers.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        use crate::util::open;
        let project: Project = serde_yaml::from_reader(open(path, "project")?)
            .map_err(|e| anyhow!("Loading project file `{}`: {}", path.display(), e))?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => Ok(Config {
                post_template: project_root.join(project.post_template),
                index_template: project_root.join(project.index_template),
                index_entry_template: project_root.join(project.index_entry_template),
                posts_directory: project_root.join(project.posts),
                output_directory: project_root.join(project.output),
            }),
        }
    }
}
