//! Skip-interval overlay track.
//!
//! Opening/ending intervals become a WebVTT chapter track so the player can
//! show them on the seek bar. A trailing unlabeled cue runs from the last
//! interval to the end of the episode, so the default track always spans
//! the whole duration.

use reprise_model::{SkipInterval, SkipLabel};
use std::sync::Arc;

/// One cue of the generated track, in whole seconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    /// Start second
    pub start: u64,
    /// End second
    pub end: u64,
    /// Interval label; empty for the trailing filler cue
    pub text: String,
}

/// A rendered track payload.
///
/// `generation` increases with every regeneration so consumers can tell a
/// stale payload from the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CueTrack {
    /// Regeneration counter, starting at 1
    pub generation: u64,
    /// Cues in ascending start order
    pub cues: Vec<Cue>,
    /// Rendered WebVTT text
    pub payload: Arc<str>,
}

/// Outcome of a regeneration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackChange {
    /// Generation of the payload that was dropped
    pub invalidated: Option<u64>,
    /// Replacement payload; `None` when there is nothing to overlay
    pub ready: Option<CueTrack>,
}

impl TrackChange {
    /// Nothing was dropped or published.
    pub fn is_empty(&self) -> bool {
        self.invalidated.is_none() && self.ready.is_none()
    }
}

/// Opening/ending intervals that contain a given timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActiveSkips {
    /// Opening interval the timestamp falls inside
    pub opening: Option<SkipInterval>,
    /// Ending interval the timestamp falls inside
    pub ending: Option<SkipInterval>,
}

/// `mm:ss`, minutes are not folded into hours.
pub fn format_timestamp(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

fn whole_seconds(t: f64) -> u64 {
    if t.is_finite() && t > 0.0 {
        t.round() as u64
    } else {
        0
    }
}

/// Build the cue list; empty interval sets produce no cues at all.
pub fn build_cues(intervals: &[SkipInterval], duration: f64) -> Vec<Cue> {
    if intervals.is_empty() {
        return Vec::new();
    }

    let mut ordered: Vec<&SkipInterval> = intervals.iter().collect();
    ordered.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));

    let mut last_end = 0;
    let mut cues = Vec::with_capacity(ordered.len() + 1);
    for interval in ordered {
        let end = whole_seconds(interval.end_time);
        cues.push(Cue {
            start: whole_seconds(interval.start_time),
            end,
            text: interval.label.as_str().to_string(),
        });
        last_end = last_end.max(end);
    }

    let video_end = whole_seconds(duration);
    if last_end < video_end {
        cues.push(Cue {
            start: last_end,
            end: video_end,
            text: String::new(),
        });
    }
    cues
}

/// Render cues as a WebVTT document.
pub fn render_vtt(cues: &[Cue]) -> String {
    let mut vtt = String::from("WEBVTT\n\n");
    for cue in cues {
        vtt.push_str(&format_timestamp(cue.start));
        vtt.push_str(" --> ");
        vtt.push_str(&format_timestamp(cue.end));
        vtt.push('\n');
        vtt.push_str(&cue.text);
        vtt.push_str("\n\n");
    }
    vtt
}

/// First interval per label of interest whose open range contains `t`.
pub fn interval_at(intervals: &[SkipInterval], t: f64) -> ActiveSkips {
    let containing = |label: SkipLabel| {
        intervals
            .iter()
            .find(|i| i.label == label)
            .filter(|i| i.strictly_contains(t))
            .cloned()
    };
    ActiveSkips {
        opening: containing(SkipLabel::Opening),
        ending: containing(SkipLabel::Ending),
    }
}

/// Owns the current payload and regenerates it when its inputs change.
#[derive(Debug, Default)]
pub struct SkipTrackBuilder {
    intervals: Vec<SkipInterval>,
    duration_secs: u64,
    current: Option<CueTrack>,
    generation: u64,
}

impl SkipTrackBuilder {
    /// No payload exists until the first duration is known.
    pub fn new(intervals: Vec<SkipInterval>) -> Self {
        Self {
            intervals,
            ..Self::default()
        }
    }

    /// Interval set the current payload was built from.
    pub fn intervals(&self) -> &[SkipInterval] {
        &self.intervals
    }

    /// Payload currently published, if any.
    pub fn current(&self) -> Option<&CueTrack> {
        self.current.as_ref()
    }

    /// Replace the interval set; unchanged sets are a no-op.
    pub fn set_intervals(&mut self, intervals: Vec<SkipInterval>) -> TrackChange {
        if intervals == self.intervals {
            return TrackChange::default();
        }
        self.intervals = intervals;
        self.regenerate()
    }

    /// Duration is compared in whole seconds; sub-second jitter is ignored.
    pub fn set_duration(&mut self, duration: f64) -> TrackChange {
        let secs = whole_seconds(duration);
        if secs == self.duration_secs && self.current.is_some() {
            return TrackChange::default();
        }
        self.duration_secs = secs;
        self.regenerate()
    }

    pub fn interval_at(&self, t: f64) -> ActiveSkips {
        interval_at(&self.intervals, t)
    }

    fn regenerate(&mut self) -> TrackChange {
        // The old payload goes away before a new one exists.
        let invalidated = self.current.take().map(|track| track.generation);

        let cues = build_cues(&self.intervals, self.duration_secs as f64);
        if cues.is_empty() {
            return TrackChange {
                invalidated,
                ready: None,
            };
        }

        self.generation += 1;
        let track = CueTrack {
            generation: self.generation,
            payload: Arc::from(render_vtt(&cues)),
            cues,
        };
        self.current = Some(track.clone());
        TrackChange {
            invalidated,
            ready: Some(track),
        }
    }
}
