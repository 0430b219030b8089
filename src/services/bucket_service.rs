//! Read-only gateway operations over an `ObjectStore` backend.

use crate::models::{entry::ChildEntry, key::StorageKey};
use crate::services::store::{ObjectStore, StoreResult, StoredObject};
use std::sync::Arc;
use tracing::debug;

/// Core service handlers receive as router state: children listings and
/// exact-key fetches against one bucket. Cheap to clone.
#[derive(Clone)]
pub struct BucketService {
    store: Arc<dyn ObjectStore>,
    index_document: String,
}

impl BucketService {
    pub fn new(store: Arc<dyn ObjectStore>, index_document: impl Into<String>) -> Self {
        Self {
            store,
            index_document: index_document.into(),
        }
    }

    /// List the direct children under `prefix`: folders first, then files,
    /// each group in the order the backend returned it. Only the first page
    /// is surfaced.
    pub async fn list_children(&self, prefix: &StorageKey) -> StoreResult<Vec<ChildEntry>> {
        let page = self.store.list(prefix.as_str()).await?;
        if page.truncated {
            debug!(prefix = %prefix, "listing truncated at first page");
        }
        let mut list: Vec<ChildEntry> = page
            .common_prefixes
            .iter()
            .map(|folder| ChildEntry::folder(folder))
            .collect();
        list.extend(
            page.objects
                .iter()
                .map(|object| ChildEntry::file(&object.key, object.size, object.uploaded)),
        );
        Ok(list)
    }

    /// Fetch the object at `key`, exact match only.
    pub async fn open_object(&self, key: &StorageKey) -> StoreResult<Option<StoredObject>> {
        self.store.get(key.as_str()).await
    }

    /// Fetch the bucket's configured root document.
    pub async fn open_index(&self) -> StoreResult<Option<StoredObject>> {
        self.store.get(&self.index_document).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::store::MemoryStore;
    use bytes::Bytes;

    fn service(store: MemoryStore) -> BucketService {
        BucketService::new(Arc::new(store), "index.html")
    }

    #[tokio::test]
    async fn children_are_folders_then_files() {
        let store = MemoryStore::new();
        store.put("photos/a.jpg", Bytes::from(vec![0u8; 100]), Some("image/jpeg"));
        store.put("photos/2024/x.jpg", Bytes::from("x"), None);

        let list = service(store)
            .list_children(&StorageKey::normalize("photos/"))
            .await
            .unwrap();

        assert_eq!(list.len(), 2);
        match &list[0] {
            ChildEntry::Folder { key, name } => {
                assert_eq!(key, "photos/2024/");
                assert_eq!(name, "2024");
            }
            other => panic!("expected folder first, got {other:?}"),
        }
        match &list[1] {
            ChildEntry::File { key, name, size, .. } => {
                assert_eq!(key, "photos/a.jpg");
                assert_eq!(name, "a.jpg");
                assert_eq!(*size, 100);
            }
            other => panic!("expected file second, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_prefix_lists_root() {
        let store = MemoryStore::new();
        store.put("top.txt", Bytes::from("t"), None);
        store.put("docs/inner.txt", Bytes::from("i"), None);

        let list = service(store)
            .list_children(&StorageKey::root())
            .await
            .unwrap();
        assert!(matches!(&list[0], ChildEntry::Folder { name, .. } if name == "docs"));
        assert!(matches!(&list[1], ChildEntry::File { name, .. } if name == "top.txt"));
    }

    #[tokio::test]
    async fn open_index_uses_configured_document() {
        let store = MemoryStore::new();
        store.put("index.html", Bytes::from("<html></html>"), Some("text/html"));
        let svc = service(store);
        assert!(svc.open_index().await.unwrap().is_some());
        assert!(
            svc.open_object(&StorageKey::normalize("other.html"))
                .await
                .unwrap()
                .is_none()
        );
    }
}
