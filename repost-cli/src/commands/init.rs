//! `repost init [--force]`

use anyhow::{Context, Result};
use clap::Args;

use repost_core::config;

/// Write a starter config.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing config with the starter values.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let (config, written) = config::init(self.force).context("failed to initialize config")?;

        if written {
            println!("✓ Wrote starter config to ~/.repost/config.yaml");
        } else {
            println!("Config already exists at ~/.repost/config.yaml (use --force to overwrite)");
        }
        println!("  News link template: {}", config.news_link_template);
        println!("  Pages list:         {}", config.pages_list);
        Ok(())
    }
}
