use std::future;
use std::sync::Arc;

use chrono::Utc;
use reprise_model::{EpisodeContext, SkipInterval, StreamVariant};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use super::events::{Affordance, PlayerEvent, SessionUpdate};
use super::state::SessionState;
use crate::auto_advance::{AutoAdvanceController, AutoAdvancePhase};
use crate::completion::{CompletionLatch, CompletionTracker};
use crate::geometry::GeometryResolver;
use crate::ports::{Navigator, PlayerRemote, ProgressMarker};
use crate::progress::ProgressStore;
use crate::resume::{IntentDecision, PlayCommand, ResumeInputs, ResumeResolver};
use crate::settings::SessionSettings;
use crate::skip_track::{SkipTrackBuilder, TrackChange};
use crate::sync_loop::{SyncLoop, build_snapshot};

/// Collaborators the actor calls out to.
pub(super) struct Collaborators {
    pub store: ProgressStore,
    pub marker: Option<Arc<dyn ProgressMarker>>,
    pub navigator: Option<Arc<dyn Navigator>>,
    pub player: Option<Arc<dyn PlayerRemote>>,
}

pub(super) struct Channels {
    pub events: mpsc::Receiver<PlayerEvent>,
    pub updates: broadcast::Sender<SessionUpdate>,
    pub state: watch::Sender<SessionState>,
    pub cancel: CancellationToken,
    pub background: TaskTracker,
}

enum Wake {
    Cancelled,
    MailboxClosed,
    Event(PlayerEvent),
    SyncTick,
    Countdown,
}

/// Owns every piece of per-episode state; runs as a single task.
pub(super) struct SessionActor {
    ctx: EpisodeContext,
    settings: SessionSettings,
    deps: Collaborators,
    channels: Channels,
    geometry: GeometryResolver,
    skips: SkipTrackBuilder,
    resume: ResumeResolver,
    completion: CompletionTracker,
    advance: AutoAdvanceController,
    sync: SyncLoop,
    state: SessionState,
}

async fn countdown(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => future::pending().await,
    }
}

impl SessionActor {
    pub(super) fn new(
        ctx: EpisodeContext,
        settings: SessionSettings,
        latch: CompletionLatch,
        deps: Collaborators,
        channels: Channels,
    ) -> Self {
        let skips = SkipTrackBuilder::new(ctx.skip_intervals.clone());
        let advance = AutoAdvanceController::new(
            settings.auto_next,
            ctx.next.is_some(),
            settings.auto_advance_delay(),
        );
        latch.reset();

        Self {
            resume: ResumeResolver::new(settings.autoplay, settings.restart_threshold),
            completion: CompletionTracker::new(settings.completion_threshold, latch),
            sync: SyncLoop::new(settings.sync_interval()),
            geometry: GeometryResolver::new(),
            state: SessionState::default(),
            skips,
            advance,
            ctx,
            settings,
            deps,
            channels,
        }
    }

    pub(super) async fn run(mut self) {
        info!(
            episode = %self.ctx.episode_key,
            series = %self.ctx.series_id,
            viewer = self.ctx.viewer.as_ref().map(|v| v.as_str()),
            "playback session started"
        );

        loop {
            let deadline = self.advance.deadline();
            let wake = tokio::select! {
                biased;
                _ = self.channels.cancel.cancelled() => Wake::Cancelled,
                event = self.channels.events.recv() => match event {
                    Some(event) => Wake::Event(event),
                    None => Wake::MailboxClosed,
                },
                _ = countdown(deadline) => Wake::Countdown,
                _ = self.sync.tick() => Wake::SyncTick,
            };

            match wake {
                Wake::Cancelled | Wake::MailboxClosed => break,
                Wake::Event(event) => self.handle_event(event).await,
                Wake::SyncTick => self.sync_progress().await,
                Wake::Countdown => self.fire_countdown(),
            }
            self.publish_state();
        }

        self.sync.stop();
        self.state.is_playing = false;
        self.state.closed = true;
        self.publish_state();
        self.emit(SessionUpdate::Closed);
        info!(episode = %self.ctx.episode_key, "playback session stopped");
    }

    fn emit(&self, update: SessionUpdate) {
        // No subscribers is fine.
        let _ = self.channels.updates.send(update);
    }

    fn publish_state(&self) {
        self.channels.state.send_if_modified(|current| {
            if *current == self.state {
                false
            } else {
                *current = self.state.clone();
                true
            }
        });
    }

    async fn handle_event(&mut self, event: PlayerEvent) {
        debug!(episode = %self.ctx.episode_key, ?event, "player event");
        match event {
            PlayerEvent::LoadedMetadata {
                current_time,
                duration,
            } => self.on_loaded_metadata(current_time, duration).await,
            PlayerEvent::CanPlay => {
                let decision = self.resume.on_can_play();
                self.apply_intent(decision);
            }
            PlayerEvent::IntentChanged(intent) => {
                if let Some(decision) = self.resume.on_intent_changed(intent) {
                    self.apply_intent(decision);
                }
            }
            PlayerEvent::TimeUpdate { current_time } => {
                self.state.current_time = current_time;
                self.observe_completion();
                self.refresh_skip_affordances();
            }
            PlayerEvent::DurationChanged { duration } => {
                self.state.duration = duration;
                let change = self.skips.set_duration(duration);
                self.publish_track(change);
            }
            PlayerEvent::Play => {
                self.state.is_playing = true;
                if self.sync.start() {
                    debug!(episode = %self.ctx.episode_key, "sync loop started");
                }
            }
            PlayerEvent::Pause => {
                self.state.is_playing = false;
                self.stop_sync();
            }
            PlayerEvent::Ended => {
                self.state.is_playing = false;
                self.stop_sync();
                self.on_ended();
            }
            PlayerEvent::Seeked { position } => {
                self.state.current_time = position;
                if self.advance.on_seeked(position, self.state.duration) {
                    self.emit(SessionUpdate::AffordanceChanged {
                        affordance: Affordance::Next,
                        visible: false,
                    });
                }
                self.state.next_affordance = self.advance.affordance();
                self.refresh_skip_affordances();
            }
            PlayerEvent::VariantsChanged { variants } => self.on_variants(&variants),
            PlayerEvent::SkipIntervalsChanged { intervals } => self.on_intervals(intervals),
            PlayerEvent::NextAffordanceHovered => {
                if self.advance.on_hover() {
                    info!(episode = %self.ctx.episode_key, "auto-advance cancelled");
                    self.state.auto_advance = AutoAdvancePhase::Cancelled;
                    self.state.next_affordance = self.advance.affordance();
                    self.emit(SessionUpdate::NextCountdown { progressing: false });
                    self.emit(SessionUpdate::AutoAdvanceStateChanged(
                        AutoAdvancePhase::Cancelled,
                    ));
                }
            }
        }
    }

    async fn on_loaded_metadata(&mut self, current_time: f64, duration: f64) {
        self.state.current_time = current_time;
        if duration != self.state.duration {
            self.state.duration = duration;
            let change = self.skips.set_duration(duration);
            self.publish_track(change);
        }

        let local = self.deps.store.read(&self.ctx.episode_key).await;
        let inputs = ResumeInputs {
            duration,
            server_time_watched: self.ctx.server_time_watched,
            local_time_watched: local.map(|record| record.time_watched),
        };
        let Some(decision) = self.resume.on_loaded_metadata(current_time, inputs) else {
            return;
        };

        let position = decision.position();
        info!(
            episode = %self.ctx.episode_key,
            ?decision,
            position,
            "resume resolved"
        );
        if let Some(player) = &self.deps.player {
            player.seek(position);
        }
        self.state.current_time = position;
        self.emit(SessionUpdate::ResumeResolved(decision));
    }

    fn apply_intent(&mut self, decision: IntentDecision) {
        if decision == IntentDecision::default() {
            return;
        }
        if let Some(player) = &self.deps.player {
            match decision.command {
                Some(PlayCommand::Play) => player.play(),
                Some(PlayCommand::Pause) => player.pause(),
                None => {}
            }
            if let Some(position) = decision.seek {
                player.seek(position);
            }
        }
        if let Some(position) = decision.seek {
            self.state.current_time = position;
        }
        debug!(episode = %self.ctx.episode_key, ?decision, "playback intent applied");
        self.emit(SessionUpdate::IntentApplied(decision));
    }

    fn observe_completion(&mut self) {
        let Some(marker) = self.deps.marker.clone() else {
            return;
        };
        if !self
            .completion
            .observe(self.state.current_time, self.state.duration)
        {
            return;
        }

        self.state.completion_marked = true;
        let series_id = self.ctx.series_id.clone();
        let episode_number = self.ctx.episode_number;
        info!(series = %series_id, episode_number, "marking episode as watched");
        self.emit(SessionUpdate::CompletionMarked {
            series_id: series_id.clone(),
            episode_number,
        });

        self.channels.background.spawn(async move {
            if let Err(err) = marker.mark_progressed(&series_id, episode_number).await {
                warn!(series = %series_id, episode_number, error = %err, "failed to mark progress");
            }
        });
    }

    fn refresh_skip_affordances(&mut self) {
        let active = self.skips.interval_at(self.state.current_time);
        let opening = active.opening.is_some();
        let ending = active.ending.is_some();

        if opening != self.state.opening_visible {
            self.state.opening_visible = opening;
            self.emit(SessionUpdate::AffordanceChanged {
                affordance: Affordance::Opening,
                visible: opening,
            });
        }
        if ending != self.state.ending_visible {
            self.state.ending_visible = ending;
            self.emit(SessionUpdate::AffordanceChanged {
                affordance: Affordance::Ending,
                visible: ending,
            });
        }
    }

    fn publish_track(&mut self, change: TrackChange) {
        if let Some(generation) = change.invalidated {
            self.state.cue_generation = None;
            self.emit(SessionUpdate::CueTrackInvalidated { generation });
        }
        if let Some(track) = change.ready {
            debug!(
                episode = %self.ctx.episode_key,
                generation = track.generation,
                cues = track.cues.len(),
                "skip track ready"
            );
            self.state.cue_generation = Some(track.generation);
            self.emit(SessionUpdate::CueTrackReady(track));
        }
    }

    fn on_variants(&mut self, variants: &[StreamVariant]) {
        if let Some(ratio) = self.geometry.update(variants) {
            debug!(episode = %self.ctx.episode_key, %ratio, "aspect ratio changed");
            self.state.aspect_ratio = ratio;
            self.emit(SessionUpdate::AspectRatioChanged(ratio));
        }
    }

    fn on_intervals(&mut self, intervals: Vec<SkipInterval>) {
        let change = self.skips.set_intervals(intervals);
        self.publish_track(change);
        self.refresh_skip_affordances();
    }

    fn on_ended(&mut self) {
        if !self.advance.on_ended(Instant::now()) {
            return;
        }
        info!(
            episode = %self.ctx.episode_key,
            delay_ms = self.settings.auto_advance_delay_ms,
            "auto-advance armed"
        );
        self.state.auto_advance = AutoAdvancePhase::Armed;
        self.state.next_affordance = self.advance.affordance();
        self.emit(SessionUpdate::AffordanceChanged {
            affordance: Affordance::Next,
            visible: true,
        });
        self.emit(SessionUpdate::NextCountdown { progressing: true });
        self.emit(SessionUpdate::AutoAdvanceStateChanged(AutoAdvancePhase::Armed));
    }

    fn fire_countdown(&mut self) {
        if !self.advance.on_deadline(Instant::now()) {
            return;
        }
        self.state.auto_advance = AutoAdvancePhase::Fired;
        self.state.next_affordance = self.advance.affordance();
        self.emit(SessionUpdate::AutoAdvanceStateChanged(AutoAdvancePhase::Fired));

        let Some(target) = self.ctx.next_target() else {
            return;
        };
        info!(route = %target.route(), "advancing to next episode");
        self.emit(SessionUpdate::Navigated(target.clone()));

        if let Some(navigator) = self.deps.navigator.clone() {
            self.channels.background.spawn(async move {
                if let Err(err) = navigator.navigate(&target).await {
                    warn!(episode = %target.episode_key, error = %err, "navigation failed");
                }
            });
        }
    }

    fn stop_sync(&mut self) {
        if self.sync.stop() {
            debug!(episode = %self.ctx.episode_key, "sync loop stopped");
        }
    }

    async fn sync_progress(&mut self) {
        if !self.state.is_playing {
            self.stop_sync();
            return;
        }
        let duration = self.state.duration;
        if !(duration.is_finite() && duration > 0.0) {
            debug!(
                episode = %self.ctx.episode_key,
                position = self.state.current_time,
                "duration unknown; progress not synced"
            );
            return;
        }

        let record = build_snapshot(
            &self.ctx,
            self.state.current_time,
            duration,
            &self.settings.bad_thumbnail_marker,
            Utc::now(),
        );
        let time_watched = record.time_watched;

        let local = self.deps.store.write_local(&record).await;
        let remote = match &self.ctx.viewer {
            Some(viewer) => self.deps.store.write_remote(viewer, record),
            None => false,
        };
        debug!(
            episode = %self.ctx.episode_key,
            position = time_watched,
            local,
            remote,
            "progress synced"
        );
        self.emit(SessionUpdate::ProgressSaved {
            time_watched,
            local,
            remote,
        });
    }
}
