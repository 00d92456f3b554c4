//! Collaborator traits the session talks to.
//!
//! Everything outside the engine (storage, the server, the media element,
//! routing) is reached through these seams so hosts and tests can plug in
//! their own implementations.

use crate::error::{ProgressStoreError, RemoteStoreError};
use async_trait::async_trait;
use reprise_model::{EpisodeKey, NavigationTarget, ProgressRecord, SeriesId, ViewerId};
use std::fmt::Debug;

/// Device-scoped progress cache keyed by episode.
#[async_trait]
pub trait LocalProgressCache: Send + Sync + Debug {
    async fn get(
        &self,
        key: &EpisodeKey,
    ) -> Result<Option<ProgressRecord>, ProgressStoreError>;

    async fn set(
        &self,
        key: &EpisodeKey,
        record: &ProgressRecord,
    ) -> Result<(), ProgressStoreError>;
}

/// Result of an idempotent remote upsert.
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    /// The server stored the snapshot; the echoed record when it sent one back
    Stored(Option<ProgressRecord>),
    /// The server already had this snapshot
    Unchanged(String),
}

/// Server-side progress persistence keyed by (viewer, episode).
#[async_trait]
pub trait RemoteProgressStore: Send + Sync + Debug {
    async fn upsert(
        &self,
        viewer: &ViewerId,
        record: &ProgressRecord,
    ) -> Result<UpsertOutcome, RemoteStoreError>;

    async fn fetch(
        &self,
        viewer: &ViewerId,
        key: &EpisodeKey,
    ) -> Result<Option<ProgressRecord>, RemoteStoreError>;
}

/// External list tracker told when an episode counts as watched.
#[async_trait]
pub trait ProgressMarker: Send + Sync + Debug {
    async fn mark_progressed(
        &self,
        series_id: &SeriesId,
        episode_number: u32,
    ) -> anyhow::Result<()>;
}

/// Route changer used by auto-advance.
#[async_trait]
pub trait Navigator: Send + Sync + Debug {
    async fn navigate(&self, target: &NavigationTarget) -> anyhow::Result<()>;
}

/// Commands issued to the hosting media element.
pub trait PlayerRemote: Send + Sync + Debug {
    fn play(&self);
    fn pause(&self);
    fn seek(&self, position: f64);
}
