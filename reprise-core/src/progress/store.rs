use std::sync::Arc;

use reprise_model::{EpisodeKey, ProgressRecord, ViewerId};
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use crate::ports::{LocalProgressCache, RemoteProgressStore, UpsertOutcome};

/// Writes progress snapshots to both homes.
///
/// Remote upserts are spawned on an internal [`TaskTracker`]; [`flush`]
/// closes it and waits for the writes already in flight. After a flush no
/// further remote write is started.
///
/// [`flush`]: ProgressStore::flush
#[derive(Debug, Clone)]
pub struct ProgressStore {
    local: Arc<dyn LocalProgressCache>,
    remote: Option<Arc<dyn RemoteProgressStore>>,
    in_flight: TaskTracker,
}

impl ProgressStore {
    pub fn new(
        local: Arc<dyn LocalProgressCache>,
        remote: Option<Arc<dyn RemoteProgressStore>>,
    ) -> Self {
        Self {
            local,
            remote,
            in_flight: TaskTracker::new(),
        }
    }

    /// Cache the snapshot on this device. Never fails outward.
    pub async fn write_local(&self, record: &ProgressRecord) -> bool {
        match self.local.set(&record.episode_key, record).await {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    episode = %record.episode_key,
                    error = %err,
                    "failed to cache progress locally"
                );
                false
            }
        }
    }

    /// Queue an upsert for `viewer`. Returns whether a write was started.
    pub fn write_remote(&self, viewer: &ViewerId, record: ProgressRecord) -> bool {
        let Some(remote) = self.remote.clone() else {
            return false;
        };
        if self.in_flight.is_closed() {
            debug!(episode = %record.episode_key, "store flushed; dropping remote write");
            return false;
        }

        let viewer = viewer.clone();
        self.in_flight.spawn(async move {
            match remote.upsert(&viewer, &record).await {
                Ok(UpsertOutcome::Stored(_)) => {
                    debug!(
                        episode = %record.episode_key,
                        %viewer,
                        position = record.time_watched,
                        "remote progress stored"
                    );
                }
                Ok(UpsertOutcome::Unchanged(message)) => {
                    debug!(episode = %record.episode_key, %viewer, %message, "remote progress unchanged");
                }
                Err(err) => {
                    warn!(
                        episode = %record.episode_key,
                        %viewer,
                        error = %err,
                        "remote progress write failed"
                    );
                }
            }
        });
        true
    }

    /// Locally cached snapshot; unreadable entries count as absent.
    pub async fn read(&self, key: &EpisodeKey) -> Option<ProgressRecord> {
        match self.local.get(key).await {
            Ok(record) => record,
            Err(err) => {
                warn!(episode = %key, error = %err, "failed to read cached progress");
                None
            }
        }
    }

    /// Remote upserts spawned and not yet finished.
    pub fn pending_remote_writes(&self) -> usize {
        self.in_flight.len()
    }

    /// Stop accepting remote writes and wait for the ones in flight.
    pub async fn flush(&self) {
        self.in_flight.close();
        self.in_flight.wait().await;
    }
}
