use crate::ids::{EpisodeKey, ProviderId, SeriesId};
use chrono::{DateTime, Utc};

/// Snapshot of a viewer's watch state for one episode.
///
/// The same logical record lives in two places: the device-local cache
/// (keyed by `episode_key`) and the remote store (keyed by viewer +
/// `episode_key`). Every write carries the full snapshot, so both homes are
/// plain upserts.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ProgressRecord {
    pub episode_key: EpisodeKey,
    pub series_id: SeriesId,
    pub title: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub series_title: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub image: Option<String>,
    pub episode_number: u32,
    /// Episode duration in seconds
    pub duration: f64,
    /// Whole seconds watched, never beyond `duration` by more than rounding
    pub time_watched: f64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub provider_id: Option<ProviderId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub next_episode_key: Option<EpisodeKey>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub next_episode_number: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub is_dub: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub updated_at: DateTime<Utc>,
}
