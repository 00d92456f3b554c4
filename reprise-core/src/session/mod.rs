//! Per-episode playback session.
//!
//! A session is one tokio task that owns all per-episode state: resume,
//! completion, the skip track, auto-advance and the progress sync timer.
//! The host feeds it [`PlayerEvent`]s through a [`SessionHandle`] and
//! listens for [`SessionUpdate`]s; the latest [`SessionState`] is always
//! available from the handle.
//!
//! Dropping the handle cancels the session. [`SessionHandle::shutdown`]
//! additionally waits for the task to stop and for remote writes that were
//! already in flight.

mod actor;
mod events;
mod state;

use std::sync::Arc;

use reprise_model::{EpisodeContext, EpisodeKey};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::completion::CompletionLatch;
use crate::error::{Result, SessionError};
use crate::ports::{
    LocalProgressCache, Navigator, PlayerRemote, ProgressMarker,
    RemoteProgressStore,
};
use crate::progress::ProgressStore;
use crate::settings::SessionSettings;

use actor::{Channels, Collaborators, SessionActor};

pub use events::{Affordance, PlayerEvent, SessionUpdate};
pub use state::SessionState;

/// Entry point for starting sessions.
#[derive(Debug)]
pub struct PlaybackSession;

impl PlaybackSession {
    pub fn builder(
        ctx: EpisodeContext,
        local: Arc<dyn LocalProgressCache>,
    ) -> PlaybackSessionBuilder {
        PlaybackSessionBuilder {
            ctx,
            local,
            remote: None,
            marker: None,
            navigator: None,
            player: None,
            settings: SessionSettings::default(),
            parent: None,
            latch: None,
        }
    }
}

#[derive(Debug)]
pub struct PlaybackSessionBuilder {
    ctx: EpisodeContext,
    local: Arc<dyn LocalProgressCache>,
    remote: Option<Arc<dyn RemoteProgressStore>>,
    marker: Option<Arc<dyn ProgressMarker>>,
    navigator: Option<Arc<dyn Navigator>>,
    player: Option<Arc<dyn PlayerRemote>>,
    settings: SessionSettings,
    parent: Option<CancellationToken>,
    latch: Option<CompletionLatch>,
}

impl PlaybackSessionBuilder {
    pub fn remote(mut self, remote: Arc<dyn RemoteProgressStore>) -> Self {
        self.remote = Some(remote);
        self
    }

    pub fn marker(mut self, marker: Arc<dyn ProgressMarker>) -> Self {
        self.marker = Some(marker);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn player(mut self, player: Arc<dyn PlayerRemote>) -> Self {
        self.player = Some(player);
        self
    }

    pub fn settings(mut self, settings: SessionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Tie the session to a wider shutdown signal.
    pub fn parent_token(mut self, token: &CancellationToken) -> Self {
        self.parent = Some(token.clone());
        self
    }

    /// Share a completion flag with the host. It is reset when the session
    /// starts.
    pub fn completion_latch(mut self, latch: CompletionLatch) -> Self {
        self.latch = Some(latch);
        self
    }

    /// Start the session task on the current runtime.
    pub fn spawn(self) -> SessionHandle {
        let buffer = self.settings.event_buffer.max(1);
        let (event_tx, event_rx) = mpsc::channel(buffer);
        let (updates, _) = broadcast::channel(buffer);
        let (state_tx, state_rx) = watch::channel(SessionState::default());
        let cancel = match &self.parent {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };
        let background = TaskTracker::new();
        let latch = self.latch.unwrap_or_default();
        let store = ProgressStore::new(self.local, self.remote);
        let episode = self.ctx.episode_key.clone();

        let actor = SessionActor::new(
            self.ctx,
            self.settings,
            latch.clone(),
            Collaborators {
                store: store.clone(),
                marker: self.marker,
                navigator: self.navigator,
                player: self.player,
            },
            Channels {
                events: event_rx,
                updates: updates.clone(),
                state: state_tx,
                cancel: cancel.clone(),
                background: background.clone(),
            },
        );
        let task = tokio::spawn(actor.run());

        SessionHandle {
            episode,
            events: event_tx,
            updates,
            state: state_rx,
            cancel,
            task: Some(task),
            store,
            background,
            latch,
        }
    }
}

/// Host-side handle of a running session.
#[derive(Debug)]
pub struct SessionHandle {
    episode: EpisodeKey,
    events: mpsc::Sender<PlayerEvent>,
    updates: broadcast::Sender<SessionUpdate>,
    state: watch::Receiver<SessionState>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
    store: ProgressStore,
    background: TaskTracker,
    latch: CompletionLatch,
}

impl SessionHandle {
    pub fn episode(&self) -> &EpisodeKey {
        &self.episode
    }

    pub async fn send(&self, event: PlayerEvent) -> Result<()> {
        self.events
            .send(event)
            .await
            .map_err(|_| SessionError::Closed(self.episode.clone()))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionUpdate> {
        self.updates.subscribe()
    }

    /// Snapshot of the latest published state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    pub fn completion_latch(&self) -> &CompletionLatch {
        &self.latch
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled() || self.events.is_closed()
    }

    /// Stop the session, then wait for collaborator calls and remote writes
    /// that were already running.
    pub async fn shutdown(mut self) -> Result<()> {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.await?;
        }
        self.background.close();
        self.background.wait().await;
        self.store.flush().await;
        Ok(())
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
