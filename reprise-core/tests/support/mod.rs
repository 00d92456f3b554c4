#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reprise_core::error::{ProgressStoreError, RemoteStoreError};
use reprise_core::ports::{
    LocalProgressCache, Navigator, PlayerRemote, ProgressMarker,
    RemoteProgressStore, UpsertOutcome,
};
use reprise_core::session::SessionUpdate;
use reprise_model::{
    EpisodeContext, EpisodeKey, NavigationTarget, NextEpisode, ProgressRecord,
    ProviderId, SeriesId, SkipInterval, ViewerId,
};
use tokio::sync::broadcast;
use tokio::time;

pub fn episode_key(raw: &str) -> EpisodeKey {
    EpisodeKey::new(raw).unwrap()
}

pub fn context() -> EpisodeContext {
    EpisodeContext {
        series_id: SeriesId::new("154587").unwrap(),
        series_title: Some("Frieren: Beyond Journey's End".into()),
        series_cover: Some("https://img.example/cover.jpg".into()),
        episode_key: episode_key("frieren-episode-5"),
        episode_number: 5,
        episode_title: Some("Phantoms of the Dead".into()),
        thumbnail: Some("https://img.example/ep5.jpg".into()),
        provider_id: ProviderId::new("gogoanime").unwrap(),
        is_dub: false,
        next: Some(NextEpisode {
            key: episode_key("frieren-episode-6"),
            number: 6,
        }),
        skip_intervals: vec![
            SkipInterval::new(0.0, 90.0, "Opening").unwrap(),
            SkipInterval::new(1310.0, 1400.0, "Ending").unwrap(),
        ],
        viewer: None,
        server_time_watched: None,
    }
}

pub fn signed_in_context() -> EpisodeContext {
    EpisodeContext {
        viewer: Some(ViewerId::new("himmel").unwrap()),
        ..context()
    }
}

pub fn record(key: &str, time_watched: f64, duration: f64) -> ProgressRecord {
    let ctx = context();
    ProgressRecord {
        episode_key: episode_key(key),
        series_id: ctx.series_id,
        title: "Phantoms of the Dead".into(),
        series_title: ctx.series_title,
        image: None,
        episode_number: 5,
        duration,
        time_watched,
        provider_id: Some(ctx.provider_id),
        next_episode_key: None,
        next_episode_number: None,
        is_dub: false,
        updated_at: Utc::now(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerCall {
    Play,
    Pause,
    Seek(f64),
}

#[derive(Debug, Default)]
pub struct RecordingPlayer {
    calls: Mutex<Vec<PlayerCall>>,
}

impl RecordingPlayer {
    pub fn calls(&self) -> Vec<PlayerCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl PlayerRemote for RecordingPlayer {
    fn play(&self) {
        self.calls.lock().unwrap().push(PlayerCall::Play);
    }

    fn pause(&self) {
        self.calls.lock().unwrap().push(PlayerCall::Pause);
    }

    fn seek(&self, position: f64) {
        self.calls.lock().unwrap().push(PlayerCall::Seek(position));
    }
}

#[derive(Debug, Default)]
pub struct RecordingMarker {
    marks: Mutex<Vec<(SeriesId, u32)>>,
}

impl RecordingMarker {
    pub fn marks(&self) -> Vec<(SeriesId, u32)> {
        self.marks.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressMarker for RecordingMarker {
    async fn mark_progressed(
        &self,
        series_id: &SeriesId,
        episode_number: u32,
    ) -> anyhow::Result<()> {
        self.marks
            .lock()
            .unwrap()
            .push((series_id.clone(), episode_number));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingNavigator {
    targets: Mutex<Vec<NavigationTarget>>,
}

impl RecordingNavigator {
    pub fn targets(&self) -> Vec<NavigationTarget> {
        self.targets.lock().unwrap().clone()
    }
}

#[async_trait]
impl Navigator for RecordingNavigator {
    async fn navigate(&self, target: &NavigationTarget) -> anyhow::Result<()> {
        self.targets.lock().unwrap().push(target.clone());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct RecordingRemote {
    upserts: Mutex<Vec<(ViewerId, ProgressRecord)>>,
    fail: bool,
}

impl RecordingRemote {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn upserts(&self) -> Vec<(ViewerId, ProgressRecord)> {
        self.upserts.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteProgressStore for RecordingRemote {
    async fn upsert(
        &self,
        viewer: &ViewerId,
        record: &ProgressRecord,
    ) -> Result<UpsertOutcome, RemoteStoreError> {
        self.upserts
            .lock()
            .unwrap()
            .push((viewer.clone(), record.clone()));
        if self.fail {
            return Err(RemoteStoreError::Status {
                status: 503,
                body: "maintenance".into(),
            });
        }
        Ok(UpsertOutcome::Stored(Some(record.clone())))
    }

    async fn fetch(
        &self,
        _viewer: &ViewerId,
        key: &EpisodeKey,
    ) -> Result<Option<ProgressRecord>, RemoteStoreError> {
        Ok(self
            .upserts()
            .into_iter()
            .rev()
            .map(|(_, record)| record)
            .find(|record| &record.episode_key == key))
    }
}

/// Local cache whose storage is always unavailable.
#[derive(Debug, Default)]
pub struct BrokenCache;

#[async_trait]
impl LocalProgressCache for BrokenCache {
    async fn get(
        &self,
        _key: &EpisodeKey,
    ) -> Result<Option<ProgressRecord>, ProgressStoreError> {
        Err(ProgressStoreError::Cache("quota exceeded".into()))
    }

    async fn set(
        &self,
        _key: &EpisodeKey,
        _record: &ProgressRecord,
    ) -> Result<(), ProgressStoreError> {
        Err(ProgressStoreError::Cache("quota exceeded".into()))
    }
}

/// Wait (in paused time) for the first update matching `predicate`.
pub async fn next_matching<F>(
    updates: &mut broadcast::Receiver<SessionUpdate>,
    mut predicate: F,
) -> SessionUpdate
where
    F: FnMut(&SessionUpdate) -> bool,
{
    loop {
        let update = time::timeout(Duration::from_secs(600), updates.recv())
            .await
            .expect("timed out waiting for session update")
            .expect("update channel closed");
        if predicate(&update) {
            return update;
        }
    }
}

/// Everything already published, without waiting.
pub fn drain(updates: &mut broadcast::Receiver<SessionUpdate>) -> Vec<SessionUpdate> {
    let mut seen = Vec::new();
    while let Ok(update) = updates.try_recv() {
        seen.push(update);
    }
    seen
}
