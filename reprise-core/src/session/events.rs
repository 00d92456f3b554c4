use reprise_model::{
    AspectRatio, NavigationTarget, SeriesId, SkipInterval, StreamVariant,
};
use serde::{Deserialize, Serialize};

use crate::auto_advance::AutoAdvancePhase;
use crate::resume::{IntentDecision, PlaybackIntent, ResumeDecision};
use crate::skip_track::CueTrack;

/// Lifecycle signals from the hosting media element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlayerEvent {
    LoadedMetadata {
        #[serde(default)]
        current_time: f64,
        duration: f64,
    },
    CanPlay,
    TimeUpdate {
        current_time: f64,
    },
    DurationChanged {
        duration: f64,
    },
    Play,
    Pause,
    Ended,
    Seeked {
        position: f64,
    },
    VariantsChanged {
        variants: Vec<StreamVariant>,
    },
    SkipIntervalsChanged {
        intervals: Vec<SkipInterval>,
    },
    NextAffordanceHovered,
    IntentChanged(PlaybackIntent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Affordance {
    Next,
    Opening,
    Ending,
}

/// What the session tells the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    AspectRatioChanged(AspectRatio),
    /// The payload with this generation must no longer be shown
    CueTrackInvalidated {
        generation: u64,
    },
    CueTrackReady(CueTrack),
    AffordanceChanged {
        affordance: Affordance,
        visible: bool,
    },
    NextCountdown {
        progressing: bool,
    },
    AutoAdvanceStateChanged(AutoAdvancePhase),
    ResumeResolved(ResumeDecision),
    IntentApplied(IntentDecision),
    CompletionMarked {
        series_id: SeriesId,
        episode_number: u32,
    },
    ProgressSaved {
        time_watched: f64,
        /// Local cache write succeeded
        local: bool,
        /// Remote upsert was queued
        remote: bool,
    },
    Navigated(NavigationTarget),
    Closed,
}
