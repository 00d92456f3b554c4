use std::time::Duration;

use async_trait::async_trait;
use reprise_model::{
    EpisodeKey, ProgressRecord, ProviderId, SeriesId, ViewerId,
};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::error::RemoteStoreError;
use crate::ports::{RemoteProgressStore, UpsertOutcome};

const UPSERT_PATH: &str = "api/user/update/episode";
const FETCH_PATH: &str = "api/user/episode";

/// Request body of the progress upsert endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertPayload<'a> {
    pub viewer_name: &'a ViewerId,
    pub episode_key: &'a EpisodeKey,
    pub series_id: &'a SeriesId,
    pub title: &'a str,
    pub series_title: Option<&'a str>,
    pub image: Option<&'a str>,
    pub episode_number: u32,
    pub duration: f64,
    pub time_watched: f64,
    pub provider_id: Option<&'a ProviderId>,
    pub next_episode_key: Option<&'a EpisodeKey>,
    pub next_episode_number: Option<u32>,
    pub is_dub: bool,
}

impl<'a> UpsertPayload<'a> {
    pub fn new(viewer: &'a ViewerId, record: &'a ProgressRecord) -> Self {
        Self {
            viewer_name: viewer,
            episode_key: &record.episode_key,
            series_id: &record.series_id,
            title: &record.title,
            series_title: record.series_title.as_deref(),
            image: record.image.as_deref(),
            episode_number: record.episode_number,
            duration: record.duration,
            time_watched: record.time_watched,
            provider_id: record.provider_id.as_ref(),
            next_episode_key: record.next_episode_key.as_ref(),
            next_episode_number: record.next_episode_number,
            is_dub: record.is_dub,
        }
    }
}

/// `reqwest` adapter for the server-side progress endpoints.
#[derive(Debug, Clone)]
pub struct HttpProgressClient {
    client: Client,
    base_url: Url,
}

impl HttpProgressClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, RemoteStoreError> {
        let client = Client::builder().timeout(timeout).build()?;
        Self::with_client(base_url, client)
    }

    pub fn with_client(
        base_url: &str,
        client: Client,
    ) -> Result<Self, RemoteStoreError> {
        let base_url = Url::parse(&normalize_base_url(base_url))?;
        debug!(%base_url, "progress client ready");
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> Result<Url, RemoteStoreError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }
}

/// Trim, default to `http://`, and keep exactly one trailing slash so
/// relative joins append instead of replacing the last segment.
fn normalize_base_url(raw: &str) -> String {
    let trimmed = raw.trim().trim_end_matches('/');
    let mut normalized = if trimmed.starts_with("http://")
        || trimmed.starts_with("https://")
    {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };
    normalized.push('/');
    if normalized.trim_end_matches('/') != raw.trim_end_matches('/') {
        debug!(from = raw, to = %normalized, "normalized progress base url");
    }
    normalized
}

fn decode_upsert(body: &str) -> Result<UpsertOutcome, RemoteStoreError> {
    if body.trim().is_empty() {
        return Ok(UpsertOutcome::Stored(None));
    }
    let value: serde_json::Value = serde_json::from_str(body)?;
    if value.get("episodeKey").is_none()
        && let Some(message) = value.get("message").and_then(|m| m.as_str())
    {
        return Ok(UpsertOutcome::Unchanged(message.to_string()));
    }
    match serde_json::from_value::<ProgressRecord>(value) {
        Ok(record) => Ok(UpsertOutcome::Stored(Some(record))),
        Err(err) => {
            debug!(error = %err, "upsert response carried no record");
            Ok(UpsertOutcome::Stored(None))
        }
    }
}

#[async_trait]
impl RemoteProgressStore for HttpProgressClient {
    async fn upsert(
        &self,
        viewer: &ViewerId,
        record: &ProgressRecord,
    ) -> Result<UpsertOutcome, RemoteStoreError> {
        let url = self.build_url(UPSERT_PATH)?;
        let response = self
            .client
            .put(url)
            .json(&UpsertPayload::new(viewer, record))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(RemoteStoreError::Status {
                status: status.as_u16(),
                body,
            });
        }
        decode_upsert(&body)
    }

    async fn fetch(
        &self,
        viewer: &ViewerId,
        key: &EpisodeKey,
    ) -> Result<Option<ProgressRecord>, RemoteStoreError> {
        let mut url = self.build_url(FETCH_PATH)?;
        url.query_pairs_mut()
            .append_pair("viewer", viewer.as_str())
            .append_pair("episode", key.as_str());

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = response.text().await?;
        if !status.is_success() {
            warn!(episode = %key, status = status.as_u16(), "progress fetch rejected");
            return Err(RemoteStoreError::Status {
                status: status.as_u16(),
                body,
            });
        }
        if body.trim().is_empty() || body.trim() == "null" {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&body)?))
    }
}
