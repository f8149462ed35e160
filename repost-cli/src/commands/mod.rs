pub mod categories;
pub mod init;
pub mod preview;
pub mod sync;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use repost_core::{config, feed, AppConfig, Post};

/// `~/.repost`
pub(crate) fn repost_home() -> Result<PathBuf> {
    let home = dirs::home_dir().context("cannot determine home directory")?;
    Ok(home.join(".repost"))
}

/// Load and validate the config from `path`, or from `~/.repost/config.yaml`.
pub(crate) fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => config::load_from(path)
            .with_context(|| format!("failed to load config '{}'", path.display())),
        None => config::load().context("failed to load config (run 'repost init' first)"),
    }
}

pub(crate) fn load_feed(path: &Path) -> Result<Vec<Post>> {
    feed::load_at(path).with_context(|| format!("failed to load feed '{}'", path.display()))
}
