use reprise_model::AspectRatio;
use serde::Serialize;

use crate::auto_advance::{AutoAdvancePhase, NextAffordance};

/// Live view of one playback session, published on every change.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SessionState {
    pub is_playing: bool,
    pub current_time: f64,
    pub duration: f64,
    pub aspect_ratio: AspectRatio,
    pub completion_marked: bool,
    pub auto_advance: AutoAdvancePhase,
    pub next_affordance: NextAffordance,
    pub opening_visible: bool,
    pub ending_visible: bool,
    /// Generation of the cue track currently published
    pub cue_generation: Option<u64>,
    pub closed: bool,
}

impl SessionState {
    pub fn auto_advance_armed(&self) -> bool {
        self.auto_advance == AutoAdvancePhase::Armed
    }
}
