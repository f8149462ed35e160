//! Repost: news feed to repost page synchronizer.
//!
//! # Usage
//!
//! ```text
//! repost init [--force]
//! repost sync --feed <file> [--store <dir>] [--config <file>] [--dry-run] [--json]
//! repost preview --feed <file> <slug> [--config <file>]
//! repost categories <name>...
//! ```
//!
//! `--verbose` is global and raises the default log level to `debug`.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    categories::CategoriesArgs, init::InitArgs, preview::PreviewArgs, sync::SyncArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "repost",
    version,
    about = "Sync an external news feed into repost pages",
    long_about = None,
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a starter config to ~/.repost/config.yaml.
    Init(InitArgs),

    /// Reconcile every post of a feed into its repost page.
    Sync(SyncArgs),

    /// Show the page name, source URL and layout snippet for one post.
    Preview(PreviewArgs),

    /// Show the audience groups a set of feed categories maps to.
    Categories(CategoriesArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Sync(args) => args.run(),
        Commands::Preview(args) => args.run(),
        Commands::Categories(args) => args.run(),
    }
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
