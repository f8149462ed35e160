//! Error types for repost-sync.

use std::path::PathBuf;

use thiserror::Error;

use repost_core::PageName;
use repost_renderer::RenderError;

/// Failures reported by a [`PageStore`](crate::PageStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested entity does not exist in the store.
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// The remote call failed after the store's own retries.
    #[error("remote call `{operation}` failed: {message}")]
    Remote {
        operation: &'static str,
        message: String,
    },

    /// An I/O error, with annotated path for context (file-backed store).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error (file-backed store).
    #[error("store JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// All errors that can arise from sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The feed had no posts; nothing is processed.
    #[error("feed contains no posts")]
    EmptyFeed,

    /// The repost page could neither be loaded nor created.
    #[error("unable to retrieve or add repost page {page}: {source}")]
    PageResolution {
        page: PageName,
        #[source]
        source: StoreError,
    },

    /// A field descriptor needed to build a typed value could not be loaded.
    #[error("field descriptor `{field}` unavailable: {source}")]
    FieldDescriptor {
        field: String,
        #[source]
        source: StoreError,
    },

    /// An error from the layout renderer.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Any other store failure while syncing a post.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience constructor for [`StoreError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.into(),
        source,
    }
}
