//! Periodic progress snapshots while playing.

use std::future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reprise_model::{EpisodeContext, ProgressRecord};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Repeating timer that only exists while playback runs.
///
/// The first tick comes one full period after [`start`](Self::start);
/// ticks missed while the session was busy are not replayed in a burst.
#[derive(Debug)]
pub struct SyncLoop {
    period: Duration,
    ticker: Option<Interval>,
}

impl SyncLoop {
    /// Stopped loop ticking every `period` once started.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            ticker: None,
        }
    }

    /// Whether a timer is armed.
    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    /// Returns `false` when the loop was already running.
    pub fn start(&mut self) -> bool {
        if self.ticker.is_some() {
            return false;
        }
        let mut ticker = time::interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        self.ticker = Some(ticker);
        true
    }

    /// Returns `false` when the loop was not running.
    pub fn stop(&mut self) -> bool {
        self.ticker.take().is_some()
    }

    /// Next tick; never resolves while stopped.
    pub async fn tick(&mut self) -> Instant {
        match self.ticker.as_mut() {
            Some(ticker) => ticker.tick().await,
            None => future::pending().await,
        }
    }
}

/// Whole seconds watched, kept within the (rounded-up) duration.
pub fn watched_seconds(current_time: f64, duration: f64) -> f64 {
    if !current_time.is_finite() || current_time <= 0.0 {
        return 0.0;
    }
    let rounded = current_time.round();
    if duration > 0.0 {
        rounded.min(duration.ceil())
    } else {
        rounded
    }
}

/// Episode thumbnail unless missing or a known placeholder, then the series
/// cover.
pub fn resolve_image(ctx: &EpisodeContext, bad_marker: &str) -> Option<String> {
    ctx.thumbnail
        .as_deref()
        .filter(|thumb| !thumb.trim().is_empty())
        .filter(|thumb| bad_marker.is_empty() || !thumb.contains(bad_marker))
        .or(ctx.series_cover.as_deref())
        .map(str::to_string)
}

/// Progress record for the current position, as written to both homes.
pub fn build_snapshot(
    ctx: &EpisodeContext,
    current_time: f64,
    duration: f64,
    bad_marker: &str,
    now: DateTime<Utc>,
) -> ProgressRecord {
    let next = ctx.next.as_ref();
    ProgressRecord {
        episode_key: ctx.episode_key.clone(),
        series_id: ctx.series_id.clone(),
        title: ctx.display_title(),
        series_title: ctx.series_title.clone(),
        image: resolve_image(ctx, bad_marker),
        episode_number: ctx.episode_number,
        duration: if duration.is_finite() { duration.max(0.0) } else { 0.0 },
        time_watched: watched_seconds(current_time, duration),
        provider_id: Some(ctx.provider_id.clone()),
        next_episode_key: next.map(|n| n.key.clone()),
        next_episode_number: next.map(|n| n.number),
        is_dub: ctx.is_dub,
        updated_at: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reprise_model::{EpisodeKey, NextEpisode, ProviderId, SeriesId};

    fn context() -> EpisodeContext {
        EpisodeContext {
            series_id: SeriesId::new("154587").unwrap(),
            series_title: Some("Frieren".into()),
            series_cover: Some("https://img/cover.jpg".into()),
            episode_key: EpisodeKey::new("frieren-episode-5").unwrap(),
            episode_number: 5,
            episode_title: Some("Phantoms of the Dead".into()),
            thumbnail: Some("https://img/ep5.jpg".into()),
            provider_id: ProviderId::new("gogoanime").unwrap(),
            is_dub: true,
            next: Some(NextEpisode {
                key: EpisodeKey::new("frieren-episode-6").unwrap(),
                number: 6,
            }),
            skip_intervals: Vec::new(),
            viewer: None,
            server_time_watched: None,
        }
    }

    #[test]
    fn watched_seconds_round_and_clamp() {
        assert_eq!(watched_seconds(12.4, 1400.0), 12.0);
        assert_eq!(watched_seconds(12.5, 1400.0), 13.0);
        assert_eq!(watched_seconds(1420.7, 1420.3), 1421.0);
        assert_eq!(watched_seconds(1500.0, 1420.3), 1421.0);
        assert_eq!(watched_seconds(-3.0, 100.0), 0.0);
        assert_eq!(watched_seconds(f64::NAN, 100.0), 0.0);
    }

    #[test]
    fn placeholder_thumbnail_falls_back_to_cover() {
        let mut ctx = context();
        assert_eq!(resolve_image(&ctx, "null").as_deref(), Some("https://img/ep5.jpg"));

        ctx.thumbnail = Some("https://img/null".into());
        assert_eq!(resolve_image(&ctx, "null").as_deref(), Some("https://img/cover.jpg"));

        ctx.thumbnail = None;
        ctx.series_cover = None;
        assert_eq!(resolve_image(&ctx, "null"), None);
    }

    #[test]
    fn snapshot_carries_navigation_and_dub_flag() {
        let now = Utc::now();
        let record = build_snapshot(&context(), 611.6, 1420.0, "null", now);
        assert_eq!(record.time_watched, 612.0);
        assert_eq!(record.title, "Phantoms of the Dead");
        assert_eq!(record.next_episode_number, Some(6));
        assert_eq!(record.next_episode_key.unwrap().as_str(), "frieren-episode-6");
        assert!(record.is_dub);
        assert_eq!(record.updated_at, now);
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_is_one_period_after_start() {
        let period = Duration::from_secs(5);
        let mut sync = SyncLoop::new(period);
        let started = Instant::now();
        assert!(sync.start());
        assert!(!sync.start());

        let fired = sync.tick().await;
        assert_eq!(fired - started, period);

        assert!(sync.stop());
        let stopped = time::timeout(Duration::from_secs(60), sync.tick()).await;
        assert!(stopped.is_err());
    }
}
