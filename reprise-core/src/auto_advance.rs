//! Countdown to the next episode after playback ends.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

/// Seek positions within this distance of the end count as "at the end".
pub const END_OF_MEDIA_TOLERANCE: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoAdvancePhase {
    /// No countdown this load
    #[default]
    Idle,
    /// Counting down to the next episode
    Armed,
    /// Viewer hovered the affordance before the deadline
    Cancelled,
    /// Navigation was requested
    Fired,
}

/// Presentation state of the "next episode" affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NextAffordance {
    /// Shown over the player
    pub visible: bool,
    /// Countdown animation running
    pub progressing: bool,
}

/// `Idle -> Armed -> (Cancelled | Fired)`, re-armed only by a fresh ended
/// event.
#[derive(Debug, Clone)]
pub struct AutoAdvanceController {
    enabled: bool,
    has_next: bool,
    delay: Duration,
    phase: AutoAdvancePhase,
    affordance: NextAffordance,
    deadline: Option<Instant>,
}

impl AutoAdvanceController {
    /// `enabled` is the viewer's auto-next preference.
    pub fn new(enabled: bool, has_next: bool, delay: Duration) -> Self {
        Self {
            enabled,
            has_next,
            delay,
            phase: AutoAdvancePhase::Idle,
            affordance: NextAffordance::default(),
            deadline: None,
        }
    }

    pub fn phase(&self) -> AutoAdvancePhase {
        self.phase
    }

    pub fn affordance(&self) -> NextAffordance {
        self.affordance
    }

    /// When the countdown elapses, if one is running.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Playback reached the end. Returns `true` when the countdown started.
    pub fn on_ended(&mut self, now: Instant) -> bool {
        if !self.enabled || !self.has_next || self.phase == AutoAdvancePhase::Armed {
            return false;
        }
        self.phase = AutoAdvancePhase::Armed;
        self.deadline = Some(now + self.delay);
        self.affordance = NextAffordance {
            visible: true,
            progressing: true,
        };
        true
    }

    /// Pointer over the affordance: stop the countdown, keep the affordance.
    pub fn on_hover(&mut self) -> bool {
        if self.phase != AutoAdvancePhase::Armed {
            return false;
        }
        self.phase = AutoAdvancePhase::Cancelled;
        self.deadline = None;
        self.affordance.progressing = false;
        true
    }

    /// Returns `true` when the countdown fired and navigation is due.
    pub fn on_deadline(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if self.phase == AutoAdvancePhase::Armed && now >= deadline => {
                self.phase = AutoAdvancePhase::Fired;
                self.deadline = None;
                self.affordance.progressing = false;
                true
            }
            _ => false,
        }
    }

    /// Hides the affordance unless the seek landed at the end of the media.
    /// Returns `true` when visibility changed.
    pub fn on_seeked(&mut self, position: f64, duration: f64) -> bool {
        let at_end = duration > 0.0 && (duration - position).abs() <= END_OF_MEDIA_TOLERANCE;
        if at_end || !self.affordance.visible {
            return false;
        }
        self.affordance.visible = false;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_secs(7);

    #[test]
    fn ended_arms_only_with_next_and_enabled() {
        let now = Instant::now();
        assert!(!AutoAdvanceController::new(true, false, DELAY).on_ended(now));
        assert!(!AutoAdvanceController::new(false, true, DELAY).on_ended(now));

        let mut controller = AutoAdvanceController::new(true, true, DELAY);
        assert!(controller.on_ended(now));
        assert_eq!(controller.phase(), AutoAdvancePhase::Armed);
        assert_eq!(controller.deadline(), Some(now + DELAY));
        assert_eq!(
            controller.affordance(),
            NextAffordance { visible: true, progressing: true }
        );
        // Already armed: the countdown is not restarted.
        assert!(!controller.on_ended(now + Duration::from_secs(3)));
        assert_eq!(controller.deadline(), Some(now + DELAY));
    }

    #[test]
    fn hover_cancels_and_keeps_affordance_visible() {
        let now = Instant::now();
        let mut controller = AutoAdvanceController::new(true, true, DELAY);
        controller.on_ended(now);
        assert!(controller.on_hover());
        assert_eq!(controller.phase(), AutoAdvancePhase::Cancelled);
        assert_eq!(controller.deadline(), None);
        assert!(controller.affordance().visible);
        assert!(!controller.affordance().progressing);
        assert!(!controller.on_deadline(now + DELAY));
    }

    #[test]
    fn deadline_fires_once() {
        let now = Instant::now();
        let mut controller = AutoAdvanceController::new(true, true, DELAY);
        controller.on_ended(now);
        assert!(!controller.on_deadline(now + Duration::from_secs(6)));
        assert!(controller.on_deadline(now + DELAY));
        assert_eq!(controller.phase(), AutoAdvancePhase::Fired);
        assert!(!controller.on_deadline(now + DELAY));
        // A fresh end re-arms.
        assert!(controller.on_ended(now + DELAY));
    }

    #[test]
    fn seek_away_from_end_hides_affordance() {
        let now = Instant::now();
        let mut controller = AutoAdvanceController::new(true, true, DELAY);
        controller.on_ended(now);
        assert!(!controller.on_seeked(1400.0, 1400.0));
        assert!(controller.on_seeked(600.0, 1400.0));
        assert!(!controller.affordance().visible);
        assert!(!controller.on_seeked(10.0, 1400.0));
    }
}
