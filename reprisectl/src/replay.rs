//! `reprisectl replay`: drive a session from a timed event script.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use reprise_config::RepriseConfig;
use reprise_core::ports::{LocalProgressCache, RemoteProgressStore};
use reprise_core::progress::{DiskProgressCache, HttpProgressClient, ProgressCacheRoot};
use reprise_core::session::{PlaybackSession, PlayerEvent, SessionHandle, SessionUpdate};
use reprise_model::{EpisodeContext, ViewerId};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{self, Instant};
use tracing::{info, warn};

use crate::collaborators::{LoggingMarker, LoggingNavigator, LoggingPlayer};

#[derive(Debug, Deserialize)]
pub struct ReplayScript {
    pub context: EpisodeContext,
    #[serde(default)]
    pub events: Vec<TimedEvent>,
    /// How long to keep the session alive after the last event
    #[serde(default)]
    pub tail_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct TimedEvent {
    /// Offset from the start of the replay
    pub at_ms: u64,
    pub event: PlayerEvent,
}

#[derive(Debug)]
pub struct ReplayOptions {
    pub script: PathBuf,
    pub viewer: Option<String>,
    pub remote: Option<String>,
    pub cache: Option<PathBuf>,
    pub speed: f64,
}

impl ReplayScript {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read replay script {}", path.display()))?;
        let script: ReplayScript = serde_json::from_str(&raw)
            .with_context(|| format!("invalid replay script {}", path.display()))?;
        if script.events.windows(2).any(|pair| pair[1].at_ms < pair[0].at_ms) {
            bail!("replay events in {} are not ordered by at_ms", path.display());
        }
        Ok(script)
    }
}

fn scaled(ms: u64, speed: f64) -> Duration {
    Duration::from_secs_f64(ms as f64 / 1000.0 / speed)
}

fn scale_ms(ms: u64, speed: f64) -> u64 {
    ((ms as f64 / speed).round() as u64).max(1)
}

pub async fn run(options: ReplayOptions, mut config: RepriseConfig) -> anyhow::Result<()> {
    if !(options.speed.is_finite() && options.speed > 0.0) {
        bail!("--speed must be a positive number, got {}", options.speed);
    }
    let script = ReplayScript::load(&options.script)?;
    let mut ctx = script.context;

    if let Some(viewer) = options.viewer {
        ctx.viewer = Some(ViewerId::new(viewer).context("invalid --viewer")?);
    }
    if let Some(remote) = options.remote {
        config.remote.base_url = Some(remote);
    }
    if let Some(cache) = options.cache {
        config.cache.root = Some(cache);
    }

    let mut settings = config.session.clone();
    settings.sync_interval_ms = scale_ms(settings.sync_interval_ms, options.speed);
    settings.auto_advance_delay_ms = scale_ms(settings.auto_advance_delay_ms, options.speed);

    let cache_root = config.cache.resolved_root();
    let local: Arc<dyn LocalProgressCache> =
        Arc::new(DiskProgressCache::new(ProgressCacheRoot::new(&cache_root)));

    let remote: Option<Arc<dyn RemoteProgressStore>> = match config.remote.base_url.as_deref() {
        Some(url) if config.remote.is_enabled() => Some(Arc::new(
            HttpProgressClient::new(url, config.remote.request_timeout())
                .context("failed to build progress client")?,
        )),
        _ => None,
    };

    if ctx.server_time_watched.is_none()
        && let (Some(remote), Some(viewer)) = (&remote, &ctx.viewer)
    {
        match remote.fetch(viewer, &ctx.episode_key).await {
            Ok(Some(record)) => {
                info!(position = record.time_watched, "server progress found");
                ctx.server_time_watched = Some(record.time_watched);
            }
            Ok(None) => info!("no server progress for this episode"),
            Err(err) => warn!(error = %err, "could not fetch server progress"),
        }
    }

    info!(
        episode = %ctx.episode_key,
        cache = %cache_root.display(),
        remote = remote.is_some(),
        speed = options.speed,
        "replaying {} events",
        script.events.len()
    );

    let signed_in = ctx.viewer.is_some();
    let mut builder = PlaybackSession::builder(ctx, local)
        .settings(settings)
        .player(Arc::new(LoggingPlayer))
        .navigator(Arc::new(LoggingNavigator));
    if let Some(remote) = remote {
        builder = builder.remote(remote);
    }
    if signed_in {
        builder = builder.marker(Arc::new(LoggingMarker));
    }
    let session = builder.spawn();

    let mut updates = session.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(SessionUpdate::Closed) => break,
                Ok(update) => println!("{}", describe(&update)),
                Err(RecvError::Lagged(missed)) => warn!(missed, "update printer lagged"),
                Err(RecvError::Closed) => break,
            }
        }
    });

    tokio::select! {
        result = feed(&session, script.events, script.tail_ms, options.speed) => result?,
        _ = tokio::signal::ctrl_c() => info!("interrupted; closing session"),
    }

    let state = session.watch_state();
    session.shutdown().await.context("session did not shut down cleanly")?;
    printer.await.context("update printer failed")?;

    let final_state = state.borrow().clone();
    println!(
        "{}",
        serde_json::to_string_pretty(&final_state).context("failed to encode final state")?
    );
    Ok(())
}

async fn feed(
    session: &SessionHandle,
    events: Vec<TimedEvent>,
    tail_ms: u64,
    speed: f64,
) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut last_ms = 0;
    for timed in events {
        time::sleep_until(start + scaled(timed.at_ms, speed)).await;
        last_ms = timed.at_ms;
        session.send(timed.event).await?;
    }
    time::sleep_until(start + scaled(last_ms + tail_ms, speed)).await;
    Ok(())
}

fn describe(update: &SessionUpdate) -> String {
    match update {
        SessionUpdate::AspectRatioChanged(ratio) => format!("aspect-ratio {ratio}"),
        SessionUpdate::CueTrackInvalidated { generation } => {
            format!("cue-track invalidated #{generation}")
        }
        SessionUpdate::CueTrackReady(track) => {
            format!("cue-track ready #{} ({} cues)", track.generation, track.cues.len())
        }
        SessionUpdate::AffordanceChanged {
            affordance,
            visible,
        } => format!(
            "affordance {affordance:?} {}",
            if *visible { "shown" } else { "hidden" }
        ),
        SessionUpdate::NextCountdown { progressing } => {
            format!("next-countdown progressing={progressing}")
        }
        SessionUpdate::AutoAdvanceStateChanged(phase) => format!("auto-advance {phase:?}"),
        SessionUpdate::ResumeResolved(decision) => {
            format!("resume {decision:?} at {}s", decision.position())
        }
        SessionUpdate::IntentApplied(decision) => format!("intent {decision:?}"),
        SessionUpdate::CompletionMarked {
            series_id,
            episode_number,
        } => format!("completed {series_id} episode {episode_number}"),
        SessionUpdate::ProgressSaved {
            time_watched,
            local,
            remote,
        } => format!("progress {time_watched}s local={local} remote={remote}"),
        SessionUpdate::Navigated(target) => format!("advance {}", target.route()),
        SessionUpdate::Closed => "closed".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_scales_durations() {
        assert_eq!(scaled(7_000, 10.0), Duration::from_millis(700));
        assert_eq!(scale_ms(5_000, 4.0), 1_250);
        assert_eq!(scale_ms(1, 1000.0), 1);
    }

    #[test]
    fn script_events_parse_from_tagged_json() {
        let raw = r#"{
            "context": {
                "series_id": "21",
                "episode_key": "op-1071",
                "episode_number": 1071,
                "provider_id": "gogoanime"
            },
            "events": [
                {"at_ms": 0, "event": {"type": "loaded_metadata", "duration": 1420}},
                {"at_ms": 10, "event": {"type": "play"}},
                {"at_ms": 20, "event": {"type": "intent_changed", "currentTime": 30, "isPlaying": true}}
            ]
        }"#;
        let script: ReplayScript = serde_json::from_str(raw).unwrap();
        assert_eq!(script.events.len(), 3);
        assert_eq!(
            script.events[0].event,
            PlayerEvent::LoadedMetadata { current_time: 0.0, duration: 1420.0 }
        );
        assert_eq!(script.tail_ms, 0);
    }
}
