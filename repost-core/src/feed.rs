//! News feed loading.
//!
//! The feed is a JSON document `{"posts": [...]}`; post order is preserved.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::FeedError;
use crate::types::Post;

/// On-disk feed payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedFile {
    #[serde(default)]
    pub posts: Vec<Post>,
}

/// Parse a feed document held in memory.
pub fn parse_str(contents: &str) -> Result<Vec<Post>, serde_json::Error> {
    serde_json::from_str::<FeedFile>(contents).map(|f| f.posts)
}

/// Read and parse the feed at `path`.
pub fn load_at(path: &Path) -> Result<Vec<Post>, FeedError> {
    let contents = std::fs::read_to_string(path).map_err(|e| FeedError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_str(&contents).map_err(|e| FeedError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}
