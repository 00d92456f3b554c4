//! Ports implemented by logging what a real host would do.

use async_trait::async_trait;
use reprise_core::ports::{Navigator, PlayerRemote, ProgressMarker};
use reprise_model::{NavigationTarget, SeriesId};
use tracing::info;

#[derive(Debug, Default)]
pub struct LoggingPlayer;

impl PlayerRemote for LoggingPlayer {
    fn play(&self) {
        info!(target: "reprisectl::player", "play");
    }

    fn pause(&self) {
        info!(target: "reprisectl::player", "pause");
    }

    fn seek(&self, position: f64) {
        info!(target: "reprisectl::player", position, "seek");
    }
}

#[derive(Debug, Default)]
pub struct LoggingNavigator;

#[async_trait]
impl Navigator for LoggingNavigator {
    async fn navigate(&self, target: &NavigationTarget) -> anyhow::Result<()> {
        println!("navigate {}", target.route());
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct LoggingMarker;

#[async_trait]
impl ProgressMarker for LoggingMarker {
    async fn mark_progressed(
        &self,
        series_id: &SeriesId,
        episode_number: u32,
    ) -> anyhow::Result<()> {
        println!("mark {series_id} episode {episode_number}");
        Ok(())
    }
}
