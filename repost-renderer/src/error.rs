//! Error types for repost-renderer.

use thiserror::Error;

/// All errors that can arise while rendering a layout snippet.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// JSON serialization error (control data payload).
    #[error("control data serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
