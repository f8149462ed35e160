//! `repost sync --feed <file> [--store <dir>] [--config <file>] [--dry-run] [--json]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use repost_sync::{run_batch, BatchReport, FileStore, SyncEngine, SyncOptions, SyncStatus};

use super::{load_config, load_feed, repost_home};

/// Reconcile a feed into the page store.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Path to the JSON feed.
    #[arg(long, short = 'f')]
    pub feed: PathBuf,

    /// Page store directory (defaults to ~/.repost/store).
    #[arg(long, short = 's')]
    pub store: Option<PathBuf>,

    /// Config file (defaults to ~/.repost/config.yaml).
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Report what would change without writing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Print a JSON report instead of a table.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let config = load_config(self.config.as_deref())?;
        let posts = load_feed(&self.feed)?;

        let store_dir = match self.store {
            Some(dir) => dir,
            None => repost_home()?.join("store"),
        };
        tracing::debug!(
            store = %store_dir.display(),
            feed = %self.feed.display(),
            "opening page store"
        );
        let store = FileStore::open(&store_dir)
            .with_context(|| format!("failed to open page store '{}'", store_dir.display()))?;

        let options = SyncOptions {
            dry_run: self.dry_run,
        };
        let mut engine =
            SyncEngine::new(store, config, options).context("failed to build sync engine")?;
        let report = run_batch(&mut engine, &posts).context("sync aborted")?;

        if self.json {
            print_json(&report, self.dry_run)
        } else {
            print_table(&report, self.dry_run);
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct SyncReportJson {
    dry_run: bool,
    summary: SyncSummaryJson,
    posts: Vec<PostOutcomeJson>,
}

#[derive(Serialize)]
struct SyncSummaryJson {
    posts: usize,
    created: usize,
    published: usize,
    core_only: usize,
    unchanged: usize,
    failed: usize,
}

#[derive(Serialize)]
struct PostOutcomeJson {
    post_id: String,
    title: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_url: Option<String>,
    created: bool,
    core_update: bool,
    metadata_update: bool,
    published: bool,
    core_changes: Vec<String>,
    metadata_changes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Tabled)]
struct SyncTableRow {
    #[tabled(rename = "post")]
    post: String,
    #[tabled(rename = "page")]
    page: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "changes")]
    changes: String,
}

fn print_json(report: &BatchReport, dry_run: bool) -> Result<()> {
    let posts = report
        .outcomes
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(sync) => PostOutcomeJson {
                post_id: outcome.post_id.0.clone(),
                title: outcome.title.clone(),
                status: status_key(sync.status()).to_string(),
                page: Some(sync.page.0.clone()),
                source_url: Some(sync.source_url.clone()),
                created: sync.created,
                core_update: !sync.core_changes.is_empty(),
                metadata_update: !sync.metadata_changes.is_empty(),
                published: sync.published,
                core_changes: sync.core_changes.clone(),
                metadata_changes: sync.metadata_changes.clone(),
                error: None,
            },
            Err(failure) => PostOutcomeJson {
                post_id: outcome.post_id.0.clone(),
                title: outcome.title.clone(),
                status: "failed".to_string(),
                page: None,
                source_url: None,
                created: false,
                core_update: false,
                metadata_update: false,
                published: false,
                core_changes: Vec::new(),
                metadata_changes: Vec::new(),
                error: Some(failure.to_string()),
            },
        })
        .collect();

    let payload = SyncReportJson {
        dry_run,
        summary: SyncSummaryJson {
            posts: report.outcomes.len(),
            created: report.created(),
            published: report.published(),
            core_only: report.core_only(),
            unchanged: report.unchanged(),
            failed: report.failed(),
        },
        posts,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize sync JSON")?
    );
    Ok(())
}

fn print_table(report: &BatchReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    println!(
        "{prefix}Repost v{} | {} posts | {} created | {} published | {} core only | {} unchanged | {} failed",
        env!("CARGO_PKG_VERSION"),
        report.outcomes.len(),
        report.created(),
        report.published(),
        report.core_only(),
        report.unchanged(),
        report.failed(),
    );

    let rows: Vec<SyncTableRow> = report
        .outcomes
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(sync) => SyncTableRow {
                post: outcome.post_id.0.clone(),
                page: sync.page.0.clone(),
                status: status_label(sync.status()),
                changes: summarize_changes(&sync.core_changes, &sync.metadata_changes),
            },
            Err(failure) => SyncTableRow {
                post: outcome.post_id.0.clone(),
                page: "-".to_string(),
                status: "FAILED".red().bold().to_string(),
                changes: failure.to_string(),
            },
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if report.failed() > 0 {
        println!(
            "{}",
            format!("{} post(s) failed; see the log for details.", report.failed()).yellow()
        );
    }
}

fn status_key(status: SyncStatus) -> &'static str {
    match status {
        SyncStatus::Created => "created",
        SyncStatus::Published => "published",
        SyncStatus::CoreUpdated => "core_updated",
        SyncStatus::Unchanged => "unchanged",
    }
}

fn status_label(status: SyncStatus) -> String {
    match status {
        SyncStatus::Created => "CREATED".green().bold().to_string(),
        SyncStatus::Published => "PUBLISHED".cyan().bold().to_string(),
        SyncStatus::CoreUpdated => "CORE UPDATED".yellow().bold().to_string(),
        SyncStatus::Unchanged => "UNCHANGED".bright_black().to_string(),
    }
}

fn summarize_changes(core: &[String], metadata: &[String]) -> String {
    if core.is_empty() && metadata.is_empty() {
        return "-".to_string();
    }
    let mut parts = Vec::new();
    if !core.is_empty() {
        parts.push(format!("core: {}", core.len()));
    }
    if !metadata.is_empty() {
        parts.push(format!("metadata: {}", metadata.len()));
    }
    parts.join(", ")
}
