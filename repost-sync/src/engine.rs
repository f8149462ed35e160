//! Per-post reconciliation.
//!
//! ## `sync_post`: stages
//!
//! 1. **Resolving**: ensure the page exists, compute the source URL, pick
//!    the preferred image.
//! 2. **CorePhase**: stage targeting, content type, visible content and the
//!    layout snippet. One item update if anything changed. Never publishes.
//! 3. **MetadataPhase**: stage taxonomy terms and source metadata. One item
//!    update plus a publish if anything changed, otherwise neither.
//! 4. **Done**.
//!
//! A failure at any stage ends the post with a [`SyncFailure`] naming the stage.
//! Writes already issued for the post stay in place.

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use repost_core::{
    AppConfig, AudienceGroup, FieldDescriptor, FieldValue, PageName, Post, RepostPage,
    TaxonomyTerm, UrlValue,
};
use repost_renderer::{LayoutCard, LayoutRenderer};

use crate::cache::{CacheStats, FieldKey, ResolverCache, TermKey};
use crate::category::map_categories_to_groups;
use crate::compare::{Desired, FieldStager, WritePolicy};
use crate::error::SyncError;
use crate::fields;
use crate::identity::ensure_page;
use crate::store::PageStore;

/// Source of "now" for set-once timestamps.
pub type Clock = fn() -> DateTime<Utc>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Compute changes without creating, updating or publishing anything.
    pub dry_run: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    Resolving,
    CorePhase,
    MetadataPhase,
    Done,
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStage::Resolving => write!(f, "resolving"),
            SyncStage::CorePhase => write!(f, "core phase"),
            SyncStage::MetadataPhase => write!(f, "metadata phase"),
            SyncStage::Done => write!(f, "done"),
        }
    }
}

/// A post that could not be synced, with the stage it failed in.
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct SyncFailure {
    pub stage: SyncStage,
    #[source]
    pub source: SyncError,
}

impl SyncFailure {
    fn at(stage: SyncStage) -> impl Fn(SyncError) -> SyncFailure {
        move |source| SyncFailure { stage, source }
    }
}

/// Summary state of a synced post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// The page was created by this run.
    Created,
    /// Metadata changed; the page was updated and published.
    Published,
    /// Only core fields changed; no publish.
    CoreUpdated,
    Unchanged,
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Created => write!(f, "created"),
            SyncStatus::Published => write!(f, "published"),
            SyncStatus::CoreUpdated => write!(f, "core updated"),
            SyncStatus::Unchanged => write!(f, "unchanged"),
        }
    }
}

/// Outcome of a successful `sync_post`. In dry-run mode the flags describe
/// what would have happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSync {
    pub page: PageName,
    pub source_url: String,
    pub created: bool,
    pub core_changes: Vec<String>,
    pub metadata_changes: Vec<String>,
    pub published: bool,
    pub dry_run: bool,
}

impl PostSync {
    pub fn status(&self) -> SyncStatus {
        if self.created {
            SyncStatus::Created
        } else if self.published {
            SyncStatus::Published
        } else if !self.core_changes.is_empty() {
            SyncStatus::CoreUpdated
        } else {
            SyncStatus::Unchanged
        }
    }

    /// Number of item updates issued (or planned) for the post.
    pub fn item_updates(&self) -> usize {
        usize::from(!self.core_changes.is_empty()) + usize::from(!self.metadata_changes.is_empty())
    }
}

/// Cache statistics per resolver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineCacheStats {
    pub groups: CacheStats,
    pub terms: CacheStats,
    pub fields: CacheStats,
}

/// Reconciles posts into repost pages. Owns the run-scoped resolver caches;
/// build one engine per run.
pub struct SyncEngine<S> {
    store: S,
    config: AppConfig,
    options: SyncOptions,
    renderer: LayoutRenderer,
    clock: Clock,
    groups: ResolverCache<String, AudienceGroup>,
    terms: ResolverCache<TermKey, TaxonomyTerm>,
    fields: ResolverCache<FieldKey, FieldDescriptor>,
}

impl<S: PageStore> SyncEngine<S> {
    pub fn new(store: S, config: AppConfig, options: SyncOptions) -> Result<Self, SyncError> {
        Ok(Self {
            store,
            config,
            options,
            renderer: LayoutRenderer::new()?,
            clock: Utc::now,
            groups: ResolverCache::new("group"),
            terms: ResolverCache::new("term"),
            fields: ResolverCache::new("field"),
        })
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn options(&self) -> SyncOptions {
        self.options
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn cache_stats(&self) -> EngineCacheStats {
        EngineCacheStats {
            groups: self.groups.stats(),
            terms: self.terms.stats(),
            fields: self.fields.stats(),
        }
    }

    /// Canonical source URL: the permalink, or the configured template filled
    /// with the post id. Truncated to the store's limit.
    pub fn source_url(&self, post: &Post) -> String {
        let url = match &post.perma_link {
            Some(link) => link.clone(),
            None => self.config.source_url(&post.post_id.0),
        };
        truncate_source_url(url)
    }

    /// Layout snippet for `post` as it would be stored.
    pub fn layout_snippet(&self, post: &Post, source_url: &str) -> Result<String, SyncError> {
        let card = LayoutCard {
            title: &post.title,
            description: &post.description,
            url: source_url,
            image_url: post
                .images
                .preferred()
                .map(|i| i.url.as_str())
                .unwrap_or_default(),
        };
        Ok(self.renderer.render(&card)?)
    }

    /// Reconcile one post into its repost page.
    pub fn sync_post(&mut self, post: &Post) -> Result<PostSync, SyncFailure> {
        let dry_run = self.options.dry_run;

        // Resolving
        let ensured = ensure_page(&mut self.store, &post.page_name(), dry_run)
            .map_err(SyncFailure::at(SyncStage::Resolving))?;
        let mut page = ensured.page;
        let source_url = self.source_url(post);

        let core_changes = self
            .core_phase(post, &mut page, &source_url)
            .map_err(SyncFailure::at(SyncStage::CorePhase))?;

        let metadata_changes = self
            .metadata_phase(post, &mut page)
            .map_err(SyncFailure::at(SyncStage::MetadataPhase))?;

        if core_changes.is_empty() && metadata_changes.is_empty() {
            tracing::info!(page = %page.name, "news link is up-to-date; no changes made");
        }

        Ok(PostSync {
            page: page.name,
            source_url,
            created: ensured.created,
            published: !metadata_changes.is_empty(),
            core_changes,
            metadata_changes,
            dry_run,
        })
    }

    fn core_phase(
        &mut self,
        post: &Post,
        page: &mut RepostPage,
        source_url: &str,
    ) -> Result<Vec<String>, SyncError> {
        let groups = self.resolve_groups(post);
        let layout = self.layout_snippet(post, source_url)?;
        let banner = post.images.preferred().map(|image| UrlValue {
            url: image.url.clone(),
            description: image.url.clone(),
        });
        let now = (self.clock)();
        let text = |s: &str| Desired::Scalar(Some(FieldValue::from(s)));

        let mut stager = FieldStager::new(&mut page.item);
        use WritePolicy::{Overwrite, SetOnce};
        stager.stage(fields::AUDIENCE_TARGET, Desired::GroupList(&groups), Overwrite);
        stager.stage(
            fields::CONTENT_TYPE_ID,
            text(&self.config.repost_content_type_id),
            Overwrite,
        );
        stager.stage(fields::TITLE, text(&post.title), Overwrite);
        stager.stage(fields::DESCRIPTION, text(&post.description), Overwrite);
        stager.stage(
            fields::FIRST_PUBLISHED_DATE,
            Desired::Timestamp(Some(now)),
            SetOnce,
        );
        stager.stage(
            fields::PROMOTED_STATE,
            Desired::Scalar(Some(FieldValue::Number(fields::PROMOTED))),
            Overwrite,
        );
        stager.stage(fields::ORIGINAL_SOURCE_URL, text(source_url), Overwrite);
        for id_field in [
            fields::ORIGINAL_SOURCE_SITE_ID,
            fields::ORIGINAL_SOURCE_WEB_ID,
            fields::ORIGINAL_SOURCE_LIST_ID,
            fields::ORIGINAL_SOURCE_ITEM_ID,
        ] {
            stager.stage(id_field, text(fields::NIL_GUID), Overwrite);
        }
        stager.stage(fields::BANNER_IMAGE_URL, Desired::Url(banner), Overwrite);
        stager.stage(fields::LAYOUT_CONTENT, text(&layout), Overwrite);

        let changed = stager.into_changed();
        if !changed.is_empty() {
            self.update_item(page, "core fields")?;
        }
        Ok(changed)
    }

    fn metadata_phase(
        &mut self,
        post: &Post,
        page: &mut RepostPage,
    ) -> Result<Vec<String>, SyncError> {
        let terms = self.resolve_terms(post);
        let list = self.config.pages_list.clone();
        let field_cache = &mut self.fields;
        let store = &mut self.store;

        let mut stager = FieldStager::new(&mut page.item);
        use WritePolicy::Overwrite;
        stager.stage_terms(fields::SOURCE_CATEGORIES, &terms, Overwrite, |name| {
            let key = FieldKey {
                list,
                internal_name: name.to_string(),
            };
            field_cache
                .try_resolve(&key, |k| store.field_descriptor(&k.list, &k.internal_name))
                .map_err(|source| SyncError::FieldDescriptor {
                    field: name.to_string(),
                    source,
                })
        })?;
        stager.stage(
            fields::SOURCE_POST_SOURCE_TYPE,
            Desired::Scalar(post.post_source_type.clone().map(FieldValue::Text)),
            Overwrite,
        );
        stager.stage(
            fields::SOURCE_PROVIDER,
            Desired::Scalar(post.provider.clone().map(FieldValue::Text)),
            Overwrite,
        );
        stager.stage(
            fields::SOURCE_MODIFIED_DATE,
            Desired::Timestamp(post.modified_date),
            Overwrite,
        );
        stager.stage(
            fields::SOURCE_PUBLISH_DATE,
            Desired::Timestamp(post.publish_date),
            Overwrite,
        );

        let changed = stager.into_changed();
        if changed.is_empty() {
            tracing::debug!(page = %page.name, "metadata unchanged; not publishing");
            return Ok(changed);
        }
        self.update_item(page, "metadata")?;
        if self.options.dry_run {
            tracing::info!(page = %page.name, "[dry-run] would publish news link");
        } else {
            self.store.publish_page(page)?;
            tracing::info!(page = %page.name, "published news link");
        }
        Ok(changed)
    }

    fn update_item(&mut self, page: &RepostPage, what: &str) -> Result<(), SyncError> {
        if self.options.dry_run {
            tracing::info!(page = %page.name, "[dry-run] would update news link {what}");
            return Ok(());
        }
        tracing::info!(page = %page.name, "updating news link {what}");
        self.store.update_item(&page.item)?;
        Ok(())
    }

    /// Audience groups for the post's categories. Unresolvable groups are
    /// logged by the cache and left out.
    fn resolve_groups(&mut self, post: &Post) -> Vec<AudienceGroup> {
        let cache = &mut self.groups;
        let store = &mut self.store;
        let mut resolved = Vec::new();
        for name in map_categories_to_groups(post.category_names()) {
            if let Some(group) = cache.resolve(&name.to_string(), |k| store.resolve_group(k)) {
                resolved.push(group);
            }
        }
        resolved
    }

    /// Taxonomy terms for the post's categories. Unresolvable labels are
    /// logged by the cache and left out.
    fn resolve_terms(&mut self, post: &Post) -> Vec<TaxonomyTerm> {
        let cache = &mut self.terms;
        let store = &mut self.store;
        let mut resolved = Vec::new();
        for label in post.category_names() {
            let key = TermKey {
                term_set_id: self.config.categories_term_set_id.clone(),
                label: label.to_string(),
            };
            if let Some(term) =
                cache.resolve(&key, |k| store.resolve_term(&k.term_set_id, &k.label))
            {
                resolved.push(term);
            }
        }
        resolved
    }
}

/// Cut `url` to [`fields::MAX_SOURCE_URL_CHARS`] characters, warning when it does.
pub fn truncate_source_url(url: String) -> String {
    if url.chars().count() <= fields::MAX_SOURCE_URL_CHARS {
        return url;
    }
    tracing::warn!(
        max = fields::MAX_SOURCE_URL_CHARS,
        "repost URL exceeds the maximum allowed length and will be truncated"
    );
    url.chars().take(fields::MAX_SOURCE_URL_CHARS).collect()
}
