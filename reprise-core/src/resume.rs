//! Where playback starts when an episode loads.
//!
//! Two inputs compete: the watched time the server had on record and the
//! one cached on this device. Nearly finished episodes restart from the top;
//! otherwise the server wins when it has a non-zero position.

use serde::{Deserialize, Serialize};

/// Watched fraction against the duration rounded to whole seconds.
pub fn watched_fraction(time_watched: f64, duration: f64) -> f64 {
    let rounded = duration.round();
    if rounded > 0.0 && time_watched.is_finite() {
        time_watched / rounded
    } else {
        0.0
    }
}

/// Positions known when the media reports its metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResumeInputs {
    /// Media duration in seconds
    pub duration: f64,
    /// Watched seconds the server had on record
    pub server_time_watched: Option<f64>,
    /// Watched seconds cached on this device
    pub local_time_watched: Option<f64>,
}

/// Start position chosen for a load.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResumeDecision {
    /// One of the sources is past the restart threshold
    Restart,
    /// Seek to the server position
    ResumeServer(f64),
    /// Seek to the cached position (0 when nothing was cached)
    ResumeLocal(f64),
}

impl ResumeDecision {
    /// Seek target in seconds.
    pub fn position(&self) -> f64 {
        match self {
            ResumeDecision::Restart => 0.0,
            ResumeDecision::ResumeServer(t) | ResumeDecision::ResumeLocal(t) => *t,
        }
    }
}

/// Restart past the threshold, else a non-zero server position, else the
/// cached one.
pub fn resolve_resume(inputs: &ResumeInputs, restart_threshold: f64) -> ResumeDecision {
    let server = inputs.server_time_watched.unwrap_or(0.0);
    let local = inputs.local_time_watched.unwrap_or(0.0);

    if watched_fraction(server, inputs.duration) >= restart_threshold
        || watched_fraction(local, inputs.duration) >= restart_threshold
    {
        return ResumeDecision::Restart;
    }
    if server > 0.0 {
        return ResumeDecision::ResumeServer(server);
    }
    ResumeDecision::ResumeLocal(local.max(0.0))
}

/// Externally requested playback state (e.g. restored by the host page).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackIntent {
    /// Requested position in seconds
    pub current_time: f64,
    /// Whether the host wants the media running
    pub is_playing: bool,
}

/// Transport command for the media element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayCommand {
    /// Start or continue playback
    Play,
    /// Hold the current frame
    Pause,
}

/// Commands to issue once the media can play.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IntentDecision {
    /// Play or pause, issued first
    pub command: Option<PlayCommand>,
    /// Position to seek to afterwards
    pub seek: Option<f64>,
}

/// Per-load resume state machine.
#[derive(Debug, Clone)]
pub struct ResumeResolver {
    autoplay: bool,
    restart_threshold: f64,
    intent: Option<PlaybackIntent>,
    resolved: bool,
    can_play: bool,
}

impl ResumeResolver {
    /// Fresh resolver for one episode load.
    pub fn new(autoplay: bool, restart_threshold: f64) -> Self {
        Self {
            autoplay,
            restart_threshold,
            intent: None,
            resolved: false,
            can_play: false,
        }
    }

    /// Latest intent the host requested.
    pub fn intent(&self) -> Option<PlaybackIntent> {
        self.intent
    }

    /// First "can resume" signal of the load.
    ///
    /// Returns `None` when the load already resolved, the media is already
    /// past 0, or the intent asks for a position of its own.
    pub fn on_loaded_metadata(
        &mut self,
        live_time: f64,
        inputs: ResumeInputs,
    ) -> Option<ResumeDecision> {
        if self.resolved {
            return None;
        }
        self.resolved = true;

        if live_time != 0.0 {
            return None;
        }
        if self.intent.is_some_and(|i| i.current_time != 0.0) {
            return None;
        }
        Some(resolve_resume(&inputs, self.restart_threshold))
    }

    /// Media became playable; apply autoplay or the pending intent.
    pub fn on_can_play(&mut self) -> IntentDecision {
        self.can_play = true;
        self.decide()
    }

    /// Re-applies the intent when the media is already playable.
    pub fn on_intent_changed(&mut self, intent: PlaybackIntent) -> Option<IntentDecision> {
        if self.intent == Some(intent) {
            return None;
        }
        self.intent = Some(intent);
        self.can_play.then(|| self.decide())
    }

    fn decide(&self) -> IntentDecision {
        let mirror = |i: PlaybackIntent| {
            if i.is_playing {
                PlayCommand::Play
            } else {
                PlayCommand::Pause
            }
        };

        let command = match self.intent {
            None if self.autoplay => Some(PlayCommand::Play),
            None => None,
            Some(i) if self.autoplay && i.current_time == 0.0 => Some(PlayCommand::Play),
            Some(i) => Some(mirror(i)),
        };
        // A zero position is "no positional request"; seeking there would
        // undo the resume seek.
        let seek = self
            .intent
            .map(|i| i.current_time)
            .filter(|t| *t > 0.0);

        IntentDecision { command, seek }
    }
}
