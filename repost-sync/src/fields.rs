//! Internal names of the page fields the sync writes.

/// Audience targeting principals.
pub const AUDIENCE_TARGET: &str = "_ModernAudienceTargetUserField";
pub const CONTENT_TYPE_ID: &str = "ContentTypeId";
pub const TITLE: &str = "Title";
pub const DESCRIPTION: &str = "Description";
pub const FIRST_PUBLISHED_DATE: &str = "FirstPublishedDate";
pub const PROMOTED_STATE: &str = "PromotedState";
pub const ORIGINAL_SOURCE_URL: &str = "_OriginalSourceUrl";
pub const ORIGINAL_SOURCE_SITE_ID: &str = "_OriginalSourceSiteId";
pub const ORIGINAL_SOURCE_WEB_ID: &str = "_OriginalSourceWebId";
pub const ORIGINAL_SOURCE_LIST_ID: &str = "_OriginalSourceListId";
pub const ORIGINAL_SOURCE_ITEM_ID: &str = "_OriginalSourceItemId";
pub const BANNER_IMAGE_URL: &str = "BannerImageUrl";
pub const LAYOUT_CONTENT: &str = "LayoutWebpartsContent";

pub const SOURCE_CATEGORIES: &str = "SourceCategories";
pub const SOURCE_POST_SOURCE_TYPE: &str = "SourcePostSourceType";
pub const SOURCE_PROVIDER: &str = "SourceProvider";
pub const SOURCE_MODIFIED_DATE: &str = "SourceModifiedDate";
pub const SOURCE_PUBLISH_DATE: &str = "SourcePublishDate";

/// `PromotedState` value of a page shown on news surfaces.
pub const PROMOTED: i64 = 2;

/// Placeholder for the original-source identifiers of a repost.
pub const NIL_GUID: &str = "00000000-0000-0000-0000-000000000000";

/// Longest source URL the store accepts.
pub const MAX_SOURCE_URL_CHARS: usize = 255;
