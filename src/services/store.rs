//! Storage backend abstraction over a flat object keyspace.
//!
//! `ObjectStore` is the collaborator contract the gateway consumes: exact-key
//! fetch plus a single-page prefix/delimiter listing. `FsStore` keeps objects
//! on local disk beneath a base directory; an in-memory store backs the test
//! suites.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use futures::stream::BoxStream;
use std::{
    collections::BTreeSet,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::fs::{self, File};
use tokio_util::io::ReaderStream;

/// Listing page cap. Only the first page is ever requested; callers see the
/// `truncated` flag, not a continuation token.
pub const MAX_LIST_KEYS: usize = 1000;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Metadata reported by the backend for one stored object.
#[derive(Debug, Clone)]
pub struct ObjectMeta {
    pub key: String,
    pub size: u64,
    pub uploaded: DateTime<Utc>,
    pub content_type: Option<String>,
}

/// A fetched object: metadata plus a lazily consumed body stream.
pub struct StoredObject {
    pub meta: ObjectMeta,
    pub body: BoxStream<'static, io::Result<Bytes>>,
}

/// First page of a prefix/delimiter listing.
#[derive(Debug, Default)]
pub struct ListPage {
    /// Direct object matches under the prefix, in backend order.
    pub objects: Vec<ObjectMeta>,
    /// Virtual subdirectories one level below the prefix, in backend order.
    pub common_prefixes: Vec<String>,
    /// More keys existed past the page cap.
    pub truncated: bool,
}

/// Contract the gateway consumes. Read-only: the backend owns all writes and
/// all persistent state.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch one object by exact key. `Ok(None)` when absent.
    async fn get(&self, key: &str) -> StoreResult<Option<StoredObject>>;

    /// List the first page of keys under `prefix`, grouping one level of
    /// hierarchy on `/`.
    async fn list(&self, prefix: &str) -> StoreResult<ListPage>;
}

/// Fold a key into its one-level grouping under `prefix` when the remainder
/// crosses a `/` boundary. Direct children return `None`.
fn common_prefix_of(key: &str, prefix: &str) -> Option<String> {
    let rest = key.strip_prefix(prefix)?;
    rest.find('/')
        .map(|pos| format!("{}{}", prefix, &rest[..=pos]))
}

/// Filesystem-backed store. Keys map to relative paths beneath `base_path`,
/// with `/` as the hierarchy separator. Content types are inferred from the
/// file extension; `uploaded` is the file's mtime.
pub struct FsStore {
    base_path: PathBuf,
}

impl FsStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    /// Map a key to its on-disk path. Keys that cannot address a file inside
    /// the base directory (traversal, empty segments, control bytes) have no
    /// object, so callers see them as absent.
    fn object_path(&self, key: &str) -> Option<PathBuf> {
        if key.is_empty() || key.starts_with('/') || key.contains("..") {
            return None;
        }
        if key
            .bytes()
            .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0')
        {
            return None;
        }
        let mut path = self.base_path.clone();
        for segment in key.split('/') {
            if segment.is_empty() {
                return None;
            }
            path.push(segment);
        }
        Some(path)
    }

    async fn meta_for(&self, key: &str, path: &Path) -> StoreResult<ObjectMeta> {
        let meta = fs::metadata(path).await?;
        Ok(ObjectMeta {
            key: key.to_string(),
            size: meta.len(),
            uploaded: DateTime::<Utc>::from(meta.modified()?),
            content_type: mime_guess::from_path(path).first_raw().map(str::to_string),
        })
    }

    /// Collect every (key, path) pair under the base directory, sorted by key.
    /// A missing base directory is an empty keyspace, not an error.
    async fn walk_keys(&self) -> StoreResult<Vec<(String, PathBuf)>> {
        let mut out = Vec::new();
        let mut stack = vec![self.base_path.clone()];
        while let Some(dir) = stack.pop() {
            let mut entries = match fs::read_dir(&dir).await {
                Ok(entries) => entries,
                Err(err) if err.kind() == ErrorKind::NotFound && dir == self.base_path => {
                    return Ok(out);
                }
                Err(err) => return Err(err.into()),
            };
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                let file_type = entry.file_type().await?;
                if file_type.is_dir() {
                    stack.push(path);
                } else if file_type.is_file() {
                    if let Ok(rel) = path.strip_prefix(&self.base_path) {
                        let key = rel
                            .components()
                            .map(|c| c.as_os_str().to_string_lossy())
                            .collect::<Vec<_>>()
                            .join("/");
                        out.push((key, path));
                    }
                }
            }
        }
        out.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(out)
    }
}

#[async_trait]
impl ObjectStore for FsStore {
    async fn get(&self, key: &str) -> StoreResult<Option<StoredObject>> {
        let Some(path) = self.object_path(key) else {
            return Ok(None);
        };
        let file = match File::open(&path).await {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        if file.metadata().await?.is_dir() {
            return Ok(None);
        }
        let meta = self.meta_for(key, &path).await?;
        let body = ReaderStream::new(file).boxed();
        Ok(Some(StoredObject { meta, body }))
    }

    async fn list(&self, prefix: &str) -> StoreResult<ListPage> {
        let mut page = ListPage::default();
        let mut folders = BTreeSet::new();
        for (key, path) in self.walk_keys().await? {
            if !key.starts_with(prefix) {
                continue;
            }
            if page.objects.len() + folders.len() >= MAX_LIST_KEYS {
                page.truncated = true;
                break;
            }
            match common_prefix_of(&key, prefix) {
                Some(folder) => {
                    folders.insert(folder);
                }
                None => page.objects.push(self.meta_for(&key, &path).await?),
            }
        }
        page.common_prefixes = folders.into_iter().collect();
        Ok(page)
    }
}

/// In-memory store backing the test suites.
#[cfg(test)]
pub use memory::MemoryStore;

#[cfg(test)]
mod memory {
    use super::*;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    struct MemoryObject {
        data: Bytes,
        content_type: Option<String>,
        uploaded: DateTime<Utc>,
    }

    #[derive(Default)]
    pub struct MemoryStore {
        objects: Mutex<BTreeMap<String, MemoryObject>>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn put(&self, key: &str, data: Bytes, content_type: Option<&str>) {
            self.objects.lock().unwrap().insert(
                key.to_string(),
                MemoryObject {
                    data,
                    content_type: content_type.map(str::to_string),
                    uploaded: Utc::now(),
                },
            );
        }
    }

    #[async_trait]
    impl ObjectStore for MemoryStore {
        async fn get(&self, key: &str) -> StoreResult<Option<StoredObject>> {
            let objects = self.objects.lock().unwrap();
            let Some(object) = objects.get(key) else {
                return Ok(None);
            };
            let meta = ObjectMeta {
                key: key.to_string(),
                size: object.data.len() as u64,
                uploaded: object.uploaded,
                content_type: object.content_type.clone(),
            };
            let body = futures::stream::iter([Ok::<_, io::Error>(object.data.clone())]).boxed();
            Ok(Some(StoredObject { meta, body }))
        }

        async fn list(&self, prefix: &str) -> StoreResult<ListPage> {
            let objects = self.objects.lock().unwrap();
            let mut page = ListPage::default();
            let mut folders = BTreeSet::new();
            for (key, object) in objects.range(prefix.to_string()..) {
                if !key.starts_with(prefix) {
                    break;
                }
                if page.objects.len() + folders.len() >= MAX_LIST_KEYS {
                    page.truncated = true;
                    break;
                }
                match common_prefix_of(key, prefix) {
                    Some(folder) => {
                        folders.insert(folder);
                    }
                    None => page.objects.push(ObjectMeta {
                        key: key.clone(),
                        size: object.data.len() as u64,
                        uploaded: object.uploaded,
                        content_type: object.content_type.clone(),
                    }),
                }
            }
            page.common_prefixes = folders.into_iter().collect();
            Ok(page)
        }
    }
}
