//! Batch runner: syncs the feed post by post, in feed order.
//!
//! A failing post is logged and recorded; the batch moves on. Only setup
//! problems (an empty feed) stop the run.

use repost_core::{Post, PostId};

use crate::engine::{PostSync, SyncEngine, SyncFailure, SyncStatus};
use crate::error::SyncError;
use crate::store::PageStore;

/// Outcome of one post.
#[derive(Debug)]
pub struct PostOutcome {
    pub post_id: PostId,
    pub title: String,
    pub result: Result<PostSync, SyncFailure>,
}

/// Outcomes of a whole run, in feed order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<PostOutcome>,
}

impl BatchReport {
    fn count_status(&self, status: SyncStatus) -> usize {
        self.synced().filter(|s| s.status() == status).count()
    }

    /// Successfully synced posts.
    pub fn synced(&self) -> impl Iterator<Item = &PostSync> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn created(&self) -> usize {
        self.count_status(SyncStatus::Created)
    }

    pub fn published(&self) -> usize {
        self.count_status(SyncStatus::Published)
    }

    pub fn core_only(&self) -> usize {
        self.count_status(SyncStatus::CoreUpdated)
    }

    pub fn unchanged(&self) -> usize {
        self.count_status(SyncStatus::Unchanged)
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }
}

/// Sync every post of `posts` through `engine`.
pub fn run_batch<S: PageStore>(
    engine: &mut SyncEngine<S>,
    posts: &[Post],
) -> Result<BatchReport, SyncError> {
    if posts.is_empty() {
        return Err(SyncError::EmptyFeed);
    }
    tracing::info!(
        posts = posts.len(),
        dry_run = engine.options().dry_run,
        "news link sync started"
    );

    let mut report = BatchReport::default();
    for post in posts {
        tracing::info!(post_id = %post.post_id, title = %post.title, "processing news post");
        let result = engine.sync_post(post);
        match &result {
            Ok(sync) => tracing::info!(
                post_id = %post.post_id,
                page = %sync.page,
                status = %sync.status(),
                "finished processing news post"
            ),
            Err(err) => tracing::error!(
                post_id = %post.post_id,
                title = %post.title,
                stage = %err.stage,
                error = %err.source,
                "error processing news post"
            ),
        }
        report.outcomes.push(PostOutcome {
            post_id: post.post_id.clone(),
            title: post.title.clone(),
            result,
        });
    }

    tracing::info!(
        created = report.created(),
        published = report.published(),
        core_only = report.core_only(),
        unchanged = report.unchanged(),
        failed = report.failed(),
        "news link sync finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SyncOptions;
    use crate::store::memory::MemoryStore;
    use repost_core::AppConfig;

    #[test]
    fn empty_feed_is_fatal() {
        let mut engine =
            SyncEngine::new(MemoryStore::new(), AppConfig::starter(), SyncOptions::default())
                .unwrap();
        let err = run_batch(&mut engine, &[]).unwrap_err();
        assert!(matches!(err, SyncError::EmptyFeed));
        assert_eq!(engine.store().calls().find_page, 0);
    }
}
