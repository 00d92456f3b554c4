use std::{
    fmt,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use reprise_model::{EpisodeKey, ProgressRecord};
use tracing::debug;

use crate::error::ProgressStoreError;
use crate::ports::LocalProgressCache;

/// Root directory of the on-disk progress cache.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ProgressCacheRoot(PathBuf);

impl ProgressCacheRoot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Debug for ProgressCacheRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ProgressCacheRoot").field(&self.0).finish()
    }
}

/// `cacache`-backed progress cache.
///
/// Records are stored as JSON under the index key `progress:{episode_key}`;
/// a newer write for the same key shadows the older entry.
#[derive(Clone, Debug)]
pub struct DiskProgressCache {
    root: ProgressCacheRoot,
}

impl DiskProgressCache {
    pub fn new(root: ProgressCacheRoot) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &ProgressCacheRoot {
        &self.root
    }

    fn index_key(key: &EpisodeKey) -> String {
        format!("progress:{key}")
    }
}

#[async_trait]
impl LocalProgressCache for DiskProgressCache {
    async fn get(
        &self,
        key: &EpisodeKey,
    ) -> Result<Option<ProgressRecord>, ProgressStoreError> {
        let bytes =
            match cacache::read(self.root.as_path(), Self::index_key(key)).await
            {
                Ok(bytes) => bytes,
                Err(cacache::Error::EntryNotFound(_, _)) => return Ok(None),
                Err(cacache::Error::IntegrityError(err)) => {
                    return Err(ProgressStoreError::Cache(format!(
                        "progress entry for {key} failed integrity check: {err}"
                    )));
                }
                Err(err) => return Err(err.into()),
            };
        let record = serde_json::from_slice(&bytes)?;
        Ok(Some(record))
    }

    async fn set(
        &self,
        key: &EpisodeKey,
        record: &ProgressRecord,
    ) -> Result<(), ProgressStoreError> {
        let bytes = serde_json::to_vec(record)?;
        let integrity =
            cacache::write(self.root.as_path(), Self::index_key(key), &bytes)
                .await?;
        debug!(episode = %key, %integrity, bytes = bytes.len(), "cached progress");
        Ok(())
    }
}
