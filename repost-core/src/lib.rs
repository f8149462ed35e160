//! Repost core library: feed types, page-store value model, configuration and errors.
//!
//! - [`types`]: newtypes and the feed's [`Post`] record
//! - [`page`]: repost pages, list items and typed field values
//! - [`config`]: [`AppConfig`] load / save / init
//! - [`feed`]: JSON feed loading
//! - [`error`]: [`ConfigError`], [`FeedError`]

pub mod config;
pub mod error;
pub mod feed;
pub mod page;
pub mod types;

pub use config::AppConfig;
pub use error::{ConfigError, FeedError};
pub use page::{
    AudienceGroup, FieldDescriptor, FieldValue, ListItem, PageLayout, RepostPage, TaxonomyTerm,
    TermCollection, TermValue, UrlValue,
};
pub use types::{Category, PageName, Post, PostId, PostImage, PostImages, UrlSlug};
