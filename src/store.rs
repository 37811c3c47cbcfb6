//! Durable document storage
//!
//! The RSVP service persists two documents (ledger and guest list) through
//! the [`DocumentStore`] seam. A missing document reads as `None`, never as
//! an error.
//!
//! [`FileStore`] keeps each document as a file under a root directory and
//! replaces it atomically: the new content is written and synced to a
//! temporary file in the same directory, then renamed over the old one, so a
//! failed write leaves the previous version intact.

use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::StorageError;

/// Key-value style document storage
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read a whole document; `Ok(None)` when it does not exist
    async fn read(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Replace a whole document
    async fn write(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError>;
}

/// Documents as files in one directory
pub struct FileStore {
    root_dir: PathBuf,
}

impl FileStore {
    /// Create a file store rooted at `root_dir`, creating the directory
    pub async fn new<P: AsRef<Path>>(root_dir: P) -> Result<Self, StorageError> {
        let root_dir = root_dir.as_ref().to_path_buf();
        fs::create_dir_all(&root_dir).await?;

        info!(path = %root_dir.display(), "Initialized file store");

        Ok(Self { root_dir })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn document_path(&self, name: &str) -> PathBuf {
        self.root_dir.join(name)
    }

    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| StorageError::Encoding(format!("invalid document path {}", path.display())))?;
        let tmp_path = path.with_file_name(format!(".{file_name}.tmp-{}", uuid::Uuid::new_v4()));

        let result = async {
            let mut file = fs::File::create(&tmp_path).await?;
            file.write_all(bytes).await?;
            file.flush().await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&tmp_path, path).await
        }
        .await;

        if let Err(e) = result {
            warn!(path = %path.display(), error = %e, "Atomic replace failed, discarding temp file");
            fs::remove_file(&tmp_path).await.ok();
            return Err(e.into());
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn read(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.document_path(name);
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "Document not found, treating as empty");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        // The directory may have been removed since startup
        fs::create_dir_all(&self.root_dir).await?;

        let path = self.document_path(name);
        self.write_atomic(&path, bytes).await?;

        debug!(path = %path.display(), size = bytes.len(), "Wrote document");
        Ok(())
    }
}

/// Documents held in memory, for tests and throwaway runs
#[derive(Default)]
pub struct MemoryStore {
    documents: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn read(&self, name: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.documents.read().await.get(name).cloned())
    }

    async fn write(&self, name: &str, bytes: &[u8]) -> Result<(), StorageError> {
        self.documents
            .write()
            .await
            .insert(name.to_string(), bytes.to_vec());
        Ok(())
    }
}
