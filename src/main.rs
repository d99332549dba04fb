use anyhow::{Context, Result};
use clap::Parser;
use quill::report::LogReporter;
use quill::{build_site, Config};
use std::path::PathBuf;

/// Renders a directory of posts into HTML pages and a newest-first index.
#[derive(Parser, Debug)]
#[command(name = "quill", version, about, long_about = None)]
struct Cli {
    /// The path to the post page template file
    #[arg(long = "post-template")]
    post_template: PathBuf,

    /// The path to the index page template file
    #[arg(long = "index-template")]
    index_template: PathBuf,

    /// The path to the index page entry template file
    #[arg(long = "index-entry-template")]
    index_entry_template: PathBuf,

    /// The path to the folder that contains posts to parse
    #[arg(long)]
    posts: PathBuf,

    /// The path to the folder that receives the generated output
    #[arg(long)]
    output: PathBuf,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Config {
        Config {
            post_template: cli.post_template,
            index_template: cli.index_template,
            index_entry_template: cli.index_entry_template,
            posts_directory: cli.posts,
            output_directory: cli.output,
        }
    }
}

fn setup_logging() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

fn main() -> Result<()> {
    setup_logging();

    let config = Config::from(Cli::parse());
    let summary = build_site(&config, &mut LogReporter)
        .with_context(|| format!("Building site into '{}'", config.output_directory.display()))?;

    log::info!(
        "built {} posts, skipped {}",
        summary.posts.len(),
        summary.skipped.len()
    );
    Ok(())
}
