//! In-memory document collection store.
//!
//! One store per widget, owning the full snapshot fetched from the remote
//! service. Readers (filter/sort, rendering) borrow; the only mutations are
//! whole-snapshot replacement after a successful fetch and single-entry
//! removal after a server-confirmed deletion. A failed fetch never touches
//! the previous snapshot.

use crate::api::types::Document;

/// Load lifecycle of a store, driving which placeholder the view renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Never fetched.
    NotLoaded,
    /// Fetch in flight (previous snapshot, if any, stays visible).
    Loading,
    /// At least one fetch completed.
    Loaded,
}

#[derive(Debug)]
pub struct DocumentStore {
    documents: Vec<Document>,
    state: LoadState,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            documents: Vec::new(),
            state: LoadState::NotLoaded,
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Mark a fetch as started. The snapshot stays readable meanwhile.
    pub fn begin_load(&mut self) {
        self.state = LoadState::Loading;
    }

    /// Replace the snapshot atomically. Duplicate ids are dropped keeping
    /// the first occurrence, upholding the id-uniqueness invariant.
    pub fn replace(&mut self, snapshot: Vec<Document>) {
        let mut seen = std::collections::HashSet::with_capacity(snapshot.len());
        self.documents = snapshot
            .into_iter()
            .filter(|doc| seen.insert(doc.id.clone()))
            .collect();
        self.state = LoadState::Loaded;
    }

    /// A fetch failed: keep the last-known snapshot. A store that had loaded
    /// before stays `Loaded`; one that never loaded returns to `NotLoaded`.
    pub fn load_failed(&mut self) {
        self.state = if self.documents.is_empty() && self.state == LoadState::Loading {
            LoadState::NotLoaded
        } else {
            LoadState::Loaded
        };
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.documents.iter().find(|doc| doc.id == id)
    }

    /// Remove a confirmed-deleted entry. Callers invoke this only after the
    /// server acknowledged the deletion; a missing id is a no-op returning
    /// `None` (the entry was already gone).
    pub fn remove(&mut self, id: &str) -> Option<Document> {
        let index = self.documents.iter().position(|doc| doc.id == id)?;
        Some(self.documents.remove(index))
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, title: &str) -> Document {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "title": title,
            "upload_date": "2024-01-01",
        }))
        .unwrap()
    }

    #[test]
    fn test_new_store_not_loaded() {
        let store = DocumentStore::new();
        assert_eq!(store.state(), LoadState::NotLoaded);
        assert!(store.is_empty());
    }

    #[test]
    fn test_replace_sets_loaded() {
        let mut store = DocumentStore::new();
        store.begin_load();
        store.replace(vec![doc("1", "Alpha"), doc("2", "Beta")]);
        assert_eq!(store.state(), LoadState::Loaded);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_replace_deduplicates_ids() {
        let mut store = DocumentStore::new();
        store.replace(vec![doc("1", "First"), doc("1", "Shadow"), doc("2", "Beta")]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("1").unwrap().title, "First");
    }

    #[test]
    fn test_load_failed_keeps_snapshot() {
        let mut store = DocumentStore::new();
        store.replace(vec![doc("1", "Alpha")]);
        store.begin_load();
        store.load_failed();
        assert_eq!(store.state(), LoadState::Loaded);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_load_failed_before_first_load() {
        let mut store = DocumentStore::new();
        store.begin_load();
        store.load_failed();
        assert_eq!(store.state(), LoadState::NotLoaded);
    }

    #[test]
    fn test_remove_existing() {
        let mut store = DocumentStore::new();
        store.replace(vec![doc("1", "Alpha"), doc("2", "Beta")]);
        let removed = store.remove("1");
        assert_eq!(removed.unwrap().title, "Alpha");
        assert!(store.get("1").is_none());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut store = DocumentStore::new();
        store.replace(vec![doc("1", "Alpha")]);
        assert!(store.remove("ghost").is_none());
        assert_eq!(store.len(), 1);
    }
}
