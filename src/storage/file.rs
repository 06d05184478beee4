use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use super::Persistence;
use crate::error::{StoreError, StoreResult};

/// File-backed persistence: the whole report collection as one JSON blob.
///
/// Writes replace the previous blob; there is no cross-call transaction,
/// so concurrent writers race with last-writer-wins semantics.
pub struct FilePersistence {
    path: PathBuf,
}

impl FilePersistence {
    /// Create a file persistence rooted at `path`, creating the parent
    /// directory if needed.
    pub fn new(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(StoreError::Io)?;
            }
        }
        info!(path = %path.display(), "File persistence initialized");
        Ok(Self { path })
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Persistence for FilePersistence {
    async fn load(&self) -> StoreResult<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::Io(e)),
        }
    }

    async fn save(&self, bytes: &[u8]) -> StoreResult<()> {
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(StoreError::Io)
    }
}
