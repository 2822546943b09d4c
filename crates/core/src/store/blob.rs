//! Key-value blob storage behind the prompt store
//!
//! The store persists its whole collection as one string under one key.
//! Hosts normally hand in their own persistence; `FileBlobStore` is the
//! default when the core runs standalone, `MemoryBlobStore` backs tests.

use std::collections::HashMap;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::debug;

use crate::errors::{PromptError, Result};

/// Asynchronous string blob store
///
/// Each call is atomic from the caller's point of view; there are no
/// multi-key transactions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read the blob under `key`, `None` when absent
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Replace the blob under `key`
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Delete the blob under `key`; deleting a missing key succeeds
    async fn remove_item(&self, key: &str) -> Result<()>;
}

// ============================================================================
// In-memory
// ============================================================================

/// Blob store backed by a map
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self
            .items
            .lock()
            .map_err(|_| PromptError::StorageRead("blob store lock poisoned".into()))?;
        Ok(items.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| PromptError::StorageWrite("blob store lock poisoned".into()))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self
            .items
            .lock()
            .map_err(|_| PromptError::StorageWrite("blob store lock poisoned".into()))?;
        items.remove(key);
        Ok(())
    }
}

// ============================================================================
// File-backed
// ============================================================================

/// Blob store keeping each key in `<dir>/<key>.json`
///
/// Writes land in a temporary sibling first and are renamed into place.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    /// Use `dir` for blobs; it is created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!(".{}.json.tmp", key))
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(None),
            Err(e) => Err(PromptError::StorageRead(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let write_err = |e: std::io::Error| PromptError::StorageWrite(e.to_string());

        tokio::fs::create_dir_all(&self.dir).await.map_err(write_err)?;

        let temp = self.temp_path_for(key);
        let path = self.path_for(key);
        tokio::fs::write(&temp, value).await.map_err(write_err)?;
        tokio::fs::rename(&temp, &path).await.map_err(write_err)?;

        debug!(path = %path.display(), bytes = value.len(), "wrote blob");
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
            Err(e) => Err(PromptError::StorageWrite(e.to_string())),
        }
    }
}
