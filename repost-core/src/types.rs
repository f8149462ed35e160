//! Feed-side domain types.
//!
//! A [`Post`] is immutable input for a run. Its [`UrlSlug`] determines the
//! [`PageName`] of the repost page it is reconciled into.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Identifier of a post in the external feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostId(pub String);

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for PostId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// URL slug of a post; unique within a feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UrlSlug(pub String);

impl fmt::Display for UrlSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for UrlSlug {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// File name of a repost page inside the page store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageName(pub String);

impl PageName {
    /// Extension every repost page file carries.
    pub const EXTENSION: &'static str = ".aspx";

    /// Deterministic page name for a slug: `<slug>.aspx`.
    pub fn for_slug(slug: &UrlSlug) -> Self {
        Self(format!("{}{}", slug.0, Self::EXTENSION))
    }
}

impl fmt::Display for PageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for PageName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Post
// ---------------------------------------------------------------------------

/// A feed category attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    #[serde(default, rename = "parentCategoryId")]
    pub parent_id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// One rendition of a post image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Named size variants of a post image.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostImages {
    #[serde(default)]
    pub original: Option<PostImage>,
    #[serde(default)]
    pub box1440: Option<PostImage>,
    #[serde(default)]
    pub box1280: Option<PostImage>,
    #[serde(default)]
    pub box960: Option<PostImage>,
    #[serde(default)]
    pub box640: Option<PostImage>,
    #[serde(default)]
    pub box320: Option<PostImage>,
}

impl PostImages {
    /// The variant used for banners and preview cards.
    ///
    /// `box960` first, then progressively larger renditions, then smaller ones.
    pub fn preferred(&self) -> Option<&PostImage> {
        [
            &self.box960,
            &self.box1280,
            &self.box1440,
            &self.original,
            &self.box640,
            &self.box320,
        ]
        .into_iter()
        .find_map(|v| v.as_ref())
    }
}

/// A news article from the external feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub post_id: PostId,
    pub url_slug: UrlSlug,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub perma_link: Option<String>,
    #[serde(default)]
    pub post_source_type: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default, with = "timestamp")]
    pub modified_date: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp")]
    pub publish_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<Category>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: PostImages,
}

impl Post {
    /// Page name derived from the slug.
    pub fn page_name(&self) -> PageName {
        PageName::for_slug(&self.url_slug)
    }

    /// Distinct category names in feed order.
    pub fn category_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.categories.len());
        for category in &self.categories {
            if !names.contains(&category.name.as_str()) {
                names.push(category.name.as_str());
            }
        }
        names
    }
}

// ---------------------------------------------------------------------------
// Timestamp parsing
// ---------------------------------------------------------------------------

/// Parse a feed timestamp.
///
/// Accepts RFC 3339 and offset-less ISO-8601; the latter is read as UTC.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(_) => NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|n| n.and_utc()),
    }
}

/// Feed fields may be `null` as well as absent; both read as the default.
fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => s.serialize_some(&dt.to_rfc3339()),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(d: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => super::parse_timestamp(s).map(Some).map_err(D::Error::custom),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
