//! In-process page store.
//!
//! Keeps pages, audience groups, taxonomy terms and field descriptors in
//! ordered maps, counts every call per operation and can be told to fail
//! specific lookups. Used by tests, dry runs and as the snapshot behind
//! [`FileStore`](super::file::FileStore).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use repost_core::{
    AudienceGroup, FieldDescriptor, ListItem, PageLayout, PageName, RepostPage, TaxonomyTerm,
};

use crate::error::StoreError;
use crate::store::PageStore;

/// Number of calls made per store operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub find_page: usize,
    pub create_page: usize,
    pub save_page: usize,
    pub field_descriptor: usize,
    pub update_item: usize,
    pub publish_page: usize,
    pub resolve_group: usize,
    pub resolve_term: usize,
}

impl CallCounts {
    /// Calls that change remote state.
    pub fn writes(&self) -> usize {
        self.create_page + self.save_page + self.update_item + self.publish_page
    }
}

/// Lookups forced to fail with [`StoreError::Remote`].
#[derive(Debug, Clone, Default)]
struct FailurePlan {
    groups: BTreeSet<String>,
    terms: BTreeSet<String>,
    pages: BTreeSet<PageName>,
    updates: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryStore {
    #[serde(default)]
    pages: BTreeMap<PageName, RepostPage>,
    #[serde(default)]
    groups: BTreeMap<String, AudienceGroup>,
    /// Term set id → terms.
    #[serde(default)]
    terms: BTreeMap<String, Vec<TaxonomyTerm>>,
    /// List title → field descriptors.
    #[serde(default)]
    fields: BTreeMap<String, Vec<FieldDescriptor>>,
    #[serde(default)]
    next_item_id: u64,
    #[serde(skip)]
    calls: CallCounts,
    #[serde(skip)]
    failures: FailurePlan,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -- seeding -----------------------------------------------------------

    pub fn with_group(mut self, name: &str, id: i64) -> Self {
        self.groups.insert(
            name.to_string(),
            AudienceGroup {
                id,
                name: name.to_string(),
            },
        );
        self
    }

    pub fn with_term(mut self, term_set_id: &str, label: &str, id: &str) -> Self {
        self.terms
            .entry(term_set_id.to_string())
            .or_default()
            .push(TaxonomyTerm {
                id: id.to_string(),
                name: label.to_string(),
            });
        self
    }

    pub fn with_field(mut self, list: &str, internal_name: &str, id: &str) -> Self {
        self.fields
            .entry(list.to_string())
            .or_default()
            .push(FieldDescriptor {
                internal_name: internal_name.to_string(),
                id: id.to_string(),
            });
        self
    }

    pub fn with_page(mut self, page: RepostPage) -> Self {
        self.next_item_id = self.next_item_id.max(page.id());
        self.pages.insert(page.name.clone(), page);
        self
    }

    // -- failure injection -------------------------------------------------

    pub fn fail_group(&mut self, name: &str) {
        self.failures.groups.insert(name.to_string());
    }

    pub fn fail_term(&mut self, label: &str) {
        self.failures.terms.insert(label.to_string());
    }

    pub fn fail_find_page(&mut self, name: &PageName) {
        self.failures.pages.insert(name.clone());
    }

    pub fn fail_updates(&mut self) {
        self.failures.updates = true;
    }

    /// Remove every injected failure.
    pub fn heal(&mut self) {
        self.failures = FailurePlan::default();
    }

    // -- inspection --------------------------------------------------------

    pub fn calls(&self) -> CallCounts {
        self.calls
    }

    pub fn reset_calls(&mut self) {
        self.calls = CallCounts::default();
    }

    pub fn page(&self, name: &PageName) -> Option<&RepostPage> {
        self.pages.get(name)
    }

    pub fn pages(&self) -> impl Iterator<Item = &RepostPage> {
        self.pages.values()
    }

    /// Give an existing page a new item state, as another writer would.
    pub fn edit_page(&mut self, name: &PageName, edit: impl FnOnce(&mut ListItem)) -> bool {
        match self.pages.get_mut(name) {
            Some(page) => {
                edit(&mut page.item);
                true
            }
            None => false,
        }
    }
}

fn injected(operation: &'static str, key: &str) -> StoreError {
    StoreError::Remote {
        operation,
        message: format!("injected failure for `{key}`"),
    }
}

impl PageStore for MemoryStore {
    fn find_page(&mut self, name: &PageName) -> Result<Option<RepostPage>, StoreError> {
        self.calls.find_page += 1;
        if self.failures.pages.contains(name) {
            return Err(injected("find_page", &name.0));
        }
        Ok(self.pages.get(name).cloned())
    }

    fn create_page(
        &mut self,
        name: &PageName,
        layout: PageLayout,
    ) -> Result<RepostPage, StoreError> {
        self.calls.create_page += 1;
        self.next_item_id += 1;
        Ok(RepostPage {
            name: name.clone(),
            layout,
            published: false,
            item: ListItem::new(self.next_item_id),
        })
    }

    fn save_page(&mut self, page: &RepostPage) -> Result<(), StoreError> {
        self.calls.save_page += 1;
        self.pages.insert(page.name.clone(), page.clone());
        Ok(())
    }

    fn field_descriptor(
        &mut self,
        list: &str,
        internal_name: &str,
    ) -> Result<FieldDescriptor, StoreError> {
        self.calls.field_descriptor += 1;
        self.fields
            .get(list)
            .and_then(|fields| fields.iter().find(|f| f.internal_name == internal_name))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "field",
                key: format!("{list}/{internal_name}"),
            })
    }

    fn update_item(&mut self, item: &ListItem) -> Result<(), StoreError> {
        self.calls.update_item += 1;
        if self.failures.updates {
            return Err(injected("update_item", &item.id.to_string()));
        }
        let page = self
            .pages
            .values_mut()
            .find(|p| p.item.id == item.id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "item",
                key: item.id.to_string(),
            })?;
        page.item = item.clone();
        Ok(())
    }

    fn publish_page(&mut self, page: &RepostPage) -> Result<(), StoreError> {
        self.calls.publish_page += 1;
        let stored = self
            .pages
            .get_mut(&page.name)
            .ok_or_else(|| StoreError::NotFound {
                entity: "page",
                key: page.name.0.clone(),
            })?;
        stored.published = true;
        Ok(())
    }

    fn resolve_group(&mut self, name: &str) -> Result<AudienceGroup, StoreError> {
        self.calls.resolve_group += 1;
        if self.failures.groups.contains(name) {
            return Err(injected("resolve_group", name));
        }
        self.groups
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "group",
                key: name.to_string(),
            })
    }

    fn resolve_term(
        &mut self,
        term_set_id: &str,
        label: &str,
    ) -> Result<TaxonomyTerm, StoreError> {
        self.calls.resolve_term += 1;
        if self.failures.terms.contains(label) {
            return Err(injected("resolve_term", label));
        }
        self.terms
            .get(term_set_id)
            .and_then(|terms| terms.iter().find(|t| t.name == label))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                entity: "term",
                key: format!("{term_set_id}/{label}"),
            })
    }
}
