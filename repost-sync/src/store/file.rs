//! File-backed page store, a [`MemoryStore`] snapshot persisted as JSON.
//!
//! Persists `<dir>/store.json`. Every mutating call rewrites the snapshot
//! with the `.tmp` + rename pattern, so an interrupted run never leaves a
//! half-written store behind. Groups, terms and field descriptors are seeded
//! by editing the JSON.

use std::path::{Path, PathBuf};

use repost_core::{
    AudienceGroup, FieldDescriptor, ListItem, PageLayout, PageName, RepostPage, TaxonomyTerm,
};

use crate::error::{io_err, StoreError};
use crate::store::{memory::MemoryStore, PageStore};

/// `<dir>/store.json`
pub fn store_path_at(dir: &Path) -> PathBuf {
    dir.join("store.json")
}

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl FileStore {
    /// Open the store in `dir`. A missing snapshot yields an empty store.
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        let path = store_path_at(dir);
        let inner = if path.exists() {
            let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
            serde_json::from_str(&contents)?
        } else {
            MemoryStore::new()
        };
        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    /// Write the snapshot atomically.
    pub fn persist(&self) -> Result<(), StoreError> {
        let Some(dir) = self.path.parent() else {
            return Err(io_err(
                &self.path,
                std::io::Error::other("invalid store path"),
            ));
        };
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

        let json = serde_json::to_string_pretty(&self.inner)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| io_err(&self.path, e))?;
        Ok(())
    }
}

impl From<(PathBuf, MemoryStore)> for FileStore {
    fn from((dir, inner): (PathBuf, MemoryStore)) -> Self {
        Self {
            path: store_path_at(&dir),
            inner,
        }
    }
}

impl PageStore for FileStore {
    fn find_page(&mut self, name: &PageName) -> Result<Option<RepostPage>, StoreError> {
        self.inner.find_page(name)
    }

    fn create_page(
        &mut self,
        name: &PageName,
        layout: PageLayout,
    ) -> Result<RepostPage, StoreError> {
        let page = self.inner.create_page(name, layout)?;
        // The id counter moved; keep it durable even if the page is never saved.
        self.persist()?;
        Ok(page)
    }

    fn save_page(&mut self, page: &RepostPage) -> Result<(), StoreError> {
        self.inner.save_page(page)?;
        self.persist()
    }

    fn field_descriptor(
        &mut self,
        list: &str,
        internal_name: &str,
    ) -> Result<FieldDescriptor, StoreError> {
        self.inner.field_descriptor(list, internal_name)
    }

    fn update_item(&mut self, item: &ListItem) -> Result<(), StoreError> {
        self.inner.update_item(item)?;
        self.persist()
    }

    fn publish_page(&mut self, page: &RepostPage) -> Result<(), StoreError> {
        self.inner.publish_page(page)?;
        self.persist()
    }

    fn resolve_group(&mut self, name: &str) -> Result<AudienceGroup, StoreError> {
        self.inner.resolve_group(name)
    }

    fn resolve_term(
        &mut self,
        term_set_id: &str,
        label: &str,
    ) -> Result<TaxonomyTerm, StoreError> {
        self.inner.resolve_term(term_set_id, label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repost_core::FieldValue;
    use tempfile::TempDir;

    #[test]
    fn empty_store_when_file_missing() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::open(tmp.path()).unwrap();
        assert_eq!(store.inner().pages().count(), 0);
        assert!(!store.path().exists());
    }

    #[test]
    fn saved_pages_survive_reopen() {
        let tmp = TempDir::new().unwrap();
        let name = PageName::from("launch.aspx");
        {
            let mut store = FileStore::open(tmp.path()).unwrap();
            let page = store.create_page(&name, PageLayout::RepostPage).unwrap();
            store.save_page(&page).unwrap();
            let mut item = page.item.clone();
            item.set("Title", FieldValue::from("Launch"));
            store.update_item(&item).unwrap();
        }
        let mut reopened = FileStore::open(tmp.path()).unwrap();
        let page = reopened.find_page(&name).unwrap().unwrap();
        assert_eq!(page.item.get("Title"), Some(&FieldValue::from("Launch")));
    }

    #[test]
    fn seeded_snapshot_is_loaded() {
        let tmp = TempDir::new().unwrap();
        let seeded = MemoryStore::new()
            .with_group("news-company", 11)
            .with_term("ts", "Careers", "t-1");
        FileStore::from((tmp.path().to_path_buf(), seeded))
            .persist()
            .unwrap();

        let mut store = FileStore::open(tmp.path()).unwrap();
        assert_eq!(store.resolve_group("news-company").unwrap().id, 11);
        assert_eq!(store.resolve_term("ts", "Careers").unwrap().id, "t-1");
    }

    #[test]
    fn tmp_file_cleaned_up_after_persist() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::open(tmp.path()).unwrap();
        store.persist().unwrap();
        assert!(store.path().exists());
        assert!(!store.path().with_extension("json.tmp").exists());
    }
}
