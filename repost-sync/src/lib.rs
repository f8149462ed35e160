//! # repost-sync
//!
//! Idempotent reconciliation of feed posts into repost pages.
//!
//! Build a [`SyncEngine`] over any [`PageStore`] and hand the feed to
//! [`run_batch`], or call [`SyncEngine::sync_post`] for a single post.

pub mod batch;
pub mod cache;
pub mod category;
pub mod compare;
pub mod engine;
pub mod error;
pub mod fields;
pub mod identity;
pub mod store;

pub use batch::{run_batch, BatchReport, PostOutcome};
pub use engine::{PostSync, SyncEngine, SyncFailure, SyncOptions, SyncStage, SyncStatus};
pub use error::{StoreError, SyncError};
pub use store::{file::FileStore, memory::MemoryStore, PageStore};
