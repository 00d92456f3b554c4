use std::collections::HashMap;

use async_trait::async_trait;
use reprise_model::{EpisodeKey, ProgressRecord};
use tokio::sync::RwLock;

use crate::error::ProgressStoreError;
use crate::ports::LocalProgressCache;

/// Process-local cache for hosts without a writable disk, and for tests.
#[derive(Debug, Default)]
pub struct MemoryProgressCache {
    records: RwLock<HashMap<EpisodeKey, ProgressRecord>>,
}

impl MemoryProgressCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl LocalProgressCache for MemoryProgressCache {
    async fn get(
        &self,
        key: &EpisodeKey,
    ) -> Result<Option<ProgressRecord>, ProgressStoreError> {
        Ok(self.records.read().await.get(key).cloned())
    }

    async fn set(
        &self,
        key: &EpisodeKey,
        record: &ProgressRecord,
    ) -> Result<(), ProgressStoreError> {
        self.records
            .write()
            .await
            .insert(key.clone(), record.clone());
        Ok(())
    }
}
