//! Session tunables.
//!
//! Defaults reproduce the player's historical behaviour: progress is synced
//! every 5 seconds while playing, the next episode starts 7 seconds after
//! the current one ends, and 90% watched counts as finished.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_SYNC_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_AUTO_ADVANCE_DELAY_MS: u64 = 7_000;
pub const DEFAULT_WATCHED_THRESHOLD: f64 = 0.9;
pub const DEFAULT_BAD_THUMBNAIL_MARKER: &str = "null";
pub const DEFAULT_EVENT_BUFFER: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Period (ms) of the progress sync loop while playing.
    pub sync_interval_ms: u64,
    /// Countdown (ms) between playback end and navigation to the next episode.
    pub auto_advance_delay_ms: u64,
    /// Watched fraction at which the episode is marked as progressed.
    pub completion_threshold: f64,
    /// Watched fraction at or above which a resume restarts from 0.
    pub restart_threshold: f64,
    /// Start playback on its own once the media can play.
    pub autoplay: bool,
    /// Advance to the next episode when playback ends.
    pub auto_next: bool,
    /// Substring identifying placeholder episode thumbnails.
    pub bad_thumbnail_marker: String,
    /// Capacity of the event mailbox and the update broadcast.
    pub event_buffer: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            sync_interval_ms: DEFAULT_SYNC_INTERVAL_MS,
            auto_advance_delay_ms: DEFAULT_AUTO_ADVANCE_DELAY_MS,
            completion_threshold: DEFAULT_WATCHED_THRESHOLD,
            restart_threshold: DEFAULT_WATCHED_THRESHOLD,
            autoplay: false,
            auto_next: true,
            bad_thumbnail_marker: DEFAULT_BAD_THUMBNAIL_MARKER.to_string(),
            event_buffer: DEFAULT_EVENT_BUFFER,
        }
    }
}

impl SessionSettings {
    pub fn sync_interval(&self) -> Duration {
        Duration::from_millis(self.sync_interval_ms)
    }

    pub fn auto_advance_delay(&self) -> Duration {
        Duration::from_millis(self.auto_advance_delay_ms)
    }
}
