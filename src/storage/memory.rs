use std::sync::Mutex;

use async_trait::async_trait;

use super::Persistence;
use crate::error::StoreResult;

/// In-memory persistence for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryPersistence {
    blob: Mutex<Option<Vec<u8>>>,
}

impl MemoryPersistence {
    /// Create an empty in-memory persistence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the persisted blob directly, bypassing the store. Useful for
    /// corrupt-data tests.
    pub fn seed(&self, bytes: impl Into<Vec<u8>>) {
        *self.blob.lock().expect("persistence lock poisoned") = Some(bytes.into());
    }
}

#[async_trait]
impl Persistence for MemoryPersistence {
    async fn load(&self) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.blob.lock().expect("persistence lock poisoned").clone())
    }

    async fn save(&self, bytes: &[u8]) -> StoreResult<()> {
        *self.blob.lock().expect("persistence lock poisoned") = Some(bytes.to_vec());
        Ok(())
    }
}
