//! Page store capability.
//!
//! The engine only talks to the content-management store through
//! [`PageStore`]. Every call blocks until the store answers; transient-fault
//! retry is the implementation's business.

pub mod file;
pub mod memory;

use repost_core::{
    AudienceGroup, FieldDescriptor, ListItem, PageLayout, PageName, RepostPage, TaxonomyTerm,
};

use crate::error::StoreError;

pub trait PageStore {
    /// Load a page by file name. `Ok(None)` means the page does not exist;
    /// any `Err` is a genuine failure.
    fn find_page(&mut self, name: &PageName) -> Result<Option<RepostPage>, StoreError>;

    /// Start a new page of `layout`. The page is not persisted until [`save_page`](Self::save_page).
    fn create_page(&mut self, name: &PageName, layout: PageLayout)
        -> Result<RepostPage, StoreError>;

    fn save_page(&mut self, page: &RepostPage) -> Result<(), StoreError>;

    /// Descriptor of field `internal_name` in list `list`.
    fn field_descriptor(
        &mut self,
        list: &str,
        internal_name: &str,
    ) -> Result<FieldDescriptor, StoreError>;

    /// Send the staged fields of `item` in one round trip.
    fn update_item(&mut self, item: &ListItem) -> Result<(), StoreError>;

    fn publish_page(&mut self, page: &RepostPage) -> Result<(), StoreError>;

    /// Resolve an audience group principal by name.
    fn resolve_group(&mut self, name: &str) -> Result<AudienceGroup, StoreError>;

    /// Resolve a taxonomy term by label within `term_set_id`.
    fn resolve_term(&mut self, term_set_id: &str, label: &str)
        -> Result<TaxonomyTerm, StoreError>;
}

impl<S: PageStore + ?Sized> PageStore for &mut S {
    fn find_page(&mut self, name: &PageName) -> Result<Option<RepostPage>, StoreError> {
        (**self).find_page(name)
    }

    fn create_page(
        &mut self,
        name: &PageName,
        layout: PageLayout,
    ) -> Result<RepostPage, StoreError> {
        (**self).create_page(name, layout)
    }

    fn save_page(&mut self, page: &RepostPage) -> Result<(), StoreError> {
        (**self).save_page(page)
    }

    fn field_descriptor(
        &mut self,
        list: &str,
        internal_name: &str,
    ) -> Result<FieldDescriptor, StoreError> {
        (**self).field_descriptor(list, internal_name)
    }

    fn update_item(&mut self, item: &ListItem) -> Result<(), StoreError> {
        (**self).update_item(item)
    }

    fn publish_page(&mut self, page: &RepostPage) -> Result<(), StoreError> {
        (**self).publish_page(page)
    }

    fn resolve_group(&mut self, name: &str) -> Result<AudienceGroup, StoreError> {
        (**self).resolve_group(name)
    }

    fn resolve_term(
        &mut self,
        term_set_id: &str,
        label: &str,
    ) -> Result<TaxonomyTerm, StoreError> {
        (**self).resolve_term(term_set_id, label)
    }
}
