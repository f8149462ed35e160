//! Page identity: load the repost page for a name, creating it when absent.

use repost_core::{ListItem, PageLayout, PageName, RepostPage};

use crate::error::{StoreError, SyncError};
use crate::store::PageStore;

/// A loaded page and whether this run created it.
#[derive(Debug, Clone)]
pub struct EnsuredPage {
    pub page: RepostPage,
    pub created: bool,
}

/// Load page `name`, creating a repost-layout page if it does not exist.
///
/// A new page is saved and then reloaded so the caller sees its stored state.
/// With `dry_run`, a missing page is returned as an unsaved, empty page and
/// the store is not touched.
pub fn ensure_page<S>(store: &mut S, name: &PageName, dry_run: bool) -> Result<EnsuredPage, SyncError>
where
    S: PageStore + ?Sized,
{
    let resolution_err = |source: StoreError| SyncError::PageResolution {
        page: name.clone(),
        source,
    };

    if let Some(page) = store.find_page(name).map_err(resolution_err)? {
        tracing::info!(page = %name, "found existing news link");
        return Ok(EnsuredPage {
            page,
            created: false,
        });
    }

    if dry_run {
        tracing::info!(page = %name, "[dry-run] would create news link");
        return Ok(EnsuredPage {
            page: RepostPage {
                name: name.clone(),
                layout: PageLayout::RepostPage,
                published: false,
                item: ListItem::default(),
            },
            created: true,
        });
    }

    let page = store
        .create_page(name, PageLayout::RepostPage)
        .map_err(resolution_err)?;
    store.save_page(&page).map_err(resolution_err)?;
    let page = store
        .find_page(name)
        .map_err(resolution_err)?
        .ok_or_else(|| {
            resolution_err(StoreError::NotFound {
                entity: "page",
                key: name.0.clone(),
            })
        })?;
    tracing::info!(page = %name, "created news link");
    Ok(EnsuredPage {
        page,
        created: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    #[test]
    fn existing_page_is_returned_untouched() {
        let existing = RepostPage {
            name: PageName::from("a.aspx"),
            layout: PageLayout::RepostPage,
            published: true,
            item: ListItem::new(4),
        };
        let mut store = MemoryStore::new().with_page(existing.clone());
        let ensured = ensure_page(&mut store, &existing.name, false).unwrap();
        assert!(!ensured.created);
        assert_eq!(ensured.page, existing);
        assert_eq!(store.calls().writes(), 0);
    }

    #[test]
    fn missing_page_is_created_saved_and_reloaded() {
        let mut store = MemoryStore::new();
        let name = PageName::from("fresh.aspx");
        let ensured = ensure_page(&mut store, &name, false).unwrap();
        assert!(ensured.created);
        assert_eq!(ensured.page.layout, PageLayout::RepostPage);
        let calls = store.calls();
        assert_eq!(calls.find_page, 2);
        assert_eq!(calls.create_page, 1);
        assert_eq!(calls.save_page, 1);
        assert!(store.page(&name).is_some());
    }

    #[test]
    fn dry_run_does_not_create() {
        let mut store = MemoryStore::new();
        let name = PageName::from("fresh.aspx");
        let ensured = ensure_page(&mut store, &name, true).unwrap();
        assert!(ensured.created);
        assert!(ensured.page.item.fields.is_empty());
        assert_eq!(store.calls().writes(), 0);
        assert!(store.page(&name).is_none());
    }

    #[test]
    fn lookup_failure_is_a_resolution_error() {
        let mut store = MemoryStore::new();
        let name = PageName::from("broken.aspx");
        store.fail_find_page(&name);
        let err = ensure_page(&mut store, &name, false).unwrap_err();
        assert!(matches!(err, SyncError::PageResolution { ref page, .. } if *page == name));
        assert_eq!(store.calls().create_page, 0, "generic faults must not trigger creation");
    }
}
