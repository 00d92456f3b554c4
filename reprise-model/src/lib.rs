//! Core data model definitions shared across Reprise crates.
#![allow(missing_docs)]

pub mod episode;
pub mod error;
pub mod ids;
pub mod progress;
pub mod skip;
pub mod stream;

// Intentionally curated re-exports for downstream consumers.
pub use episode::{EpisodeContext, NavigationTarget, NextEpisode};
pub use error::{ModelError, Result as ModelResult};
pub use ids::{EpisodeKey, ProviderId, SeriesId, ViewerId};
pub use progress::ProgressRecord;
pub use skip::{SkipInterval, SkipLabel};
pub use stream::{AspectRatio, StreamVariant};

pub mod prelude {
    pub use crate::episode::{EpisodeContext, NavigationTarget, NextEpisode};
    pub use crate::ids::{EpisodeKey, ProviderId, SeriesId, ViewerId};
    pub use crate::progress::ProgressRecord;
    pub use crate::skip::{SkipInterval, SkipLabel};
    pub use crate::stream::{AspectRatio, StreamVariant};
}
