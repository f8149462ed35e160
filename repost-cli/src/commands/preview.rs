//! `repost preview --feed <file> <slug> [--config <file>]`

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use repost_sync::{MemoryStore, SyncEngine, SyncOptions};

use super::{load_config, load_feed};

/// Render what would be stored for one post without touching any store.
#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Url slug of the post to preview.
    pub slug: String,

    /// Path to the JSON feed.
    #[arg(long, short = 'f')]
    pub feed: PathBuf,

    /// Config file (defaults to ~/.repost/config.yaml).
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,
}

impl PreviewArgs {
    pub fn run(self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let posts = load_feed(&self.feed)?;
        let Some(post) = posts.iter().find(|p| p.url_slug.0 == self.slug) else {
            bail!("no post with slug '{}' in '{}'", self.slug, self.feed.display());
        };

        let engine = SyncEngine::new(MemoryStore::new(), config, SyncOptions { dry_run: true })
            .context("failed to build sync engine")?;
        let source_url = engine.source_url(post);
        let snippet = engine
            .layout_snippet(post, &source_url)
            .context("failed to render layout snippet")?;

        println!("{} {}", "Page:".bold(), post.page_name());
        println!("{} {}", "Title:".bold(), post.title);
        println!("{} {}", "Source URL:".bold(), source_url);
        let categories = post.category_names();
        if !categories.is_empty() {
            println!("{} {}", "Categories:".bold(), categories.join(", "));
        }
        match post.images.preferred() {
            Some(image) => println!("{} {}", "Banner:".bold(), image.url),
            None => println!("{} {}", "Banner:".bold(), "none".bright_black()),
        }
        println!("{}", "Layout snippet:".bold());
        println!("{snippet}");
        Ok(())
    }
}
