//! # Reprise Core
//!
//! Playback session synchronization for an episodic video player.
//!
//! ## Overview
//!
//! A [`session::PlaybackSession`] wraps one episode load and keeps the
//! viewer's position, skip overlays and auto-advance consistent:
//!
//! - **Geometry**: the tallest stream variant decides the display aspect ratio
//! - **Skip track**: opening/ending intervals become a WebVTT chapter track and
//!   drive the skip affordances
//! - **Progress**: snapshots every few seconds while playing, cached on the
//!   device and upserted to the server for signed-in viewers
//! - **Resume**: picks the start position from server and device progress
//! - **Completion**: marks the episode watched once, past 90%
//! - **Auto-advance**: a cancellable countdown to the next episode
//!
//! ## Architecture
//!
//! - [`ports`]: collaborator traits (caches, server, media element, router)
//! - [`progress`]: progress store plus the `cacache`, in-memory and HTTP adapters
//! - [`session`]: the per-episode actor and its handle
//! - the remaining modules are the synchronous state machines the actor drives
//!
//! ## Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use reprise_core::progress::MemoryProgressCache;
//! use reprise_core::session::{PlaybackSession, PlayerEvent};
//! use reprise_model::EpisodeContext;
//!
//! async fn watch(ctx: EpisodeContext) -> reprise_core::Result<()> {
//!     let session = PlaybackSession::builder(ctx, Arc::new(MemoryProgressCache::new()))
//!         .spawn();
//!     let mut updates = session.subscribe();
//!
//!     session
//!         .send(PlayerEvent::LoadedMetadata { current_time: 0.0, duration: 1420.0 })
//!         .await?;
//!     session.send(PlayerEvent::Play).await?;
//!
//!     if let Ok(update) = updates.recv().await {
//!         println!("{update:?}");
//!     }
//!     session.shutdown().await
//! }
//! ```

pub mod auto_advance;
pub mod completion;
pub mod error;
pub mod geometry;
pub mod ports;
pub mod progress;
pub mod resume;
pub mod session;
pub mod settings;
pub mod skip_track;
pub mod sync_loop;

pub use error::{ProgressStoreError, RemoteStoreError, Result, SessionError};
pub use settings::SessionSettings;

pub mod prelude {
    pub use crate::ports::{
        LocalProgressCache, Navigator, PlayerRemote, ProgressMarker,
        RemoteProgressStore, UpsertOutcome,
    };
    pub use crate::progress::{
        DiskProgressCache, HttpProgressClient, MemoryProgressCache,
        ProgressCacheRoot, ProgressStore,
    };
    pub use crate::resume::PlaybackIntent;
    pub use crate::session::{
        Affordance, PlaybackSession, PlayerEvent, SessionHandle, SessionState,
        SessionUpdate,
    };
    pub use crate::settings::SessionSettings;
    pub use reprise_model::prelude::*;
}
