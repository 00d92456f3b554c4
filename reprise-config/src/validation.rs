use thiserror::Error;
use url::Url;

use crate::models::RepriseConfig;

#[derive(Debug, Error)]
pub enum ConfigValidationError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
    #[error("{field} must be within (0, 1], got {value}")]
    ThresholdOutOfRange { field: &'static str, value: f64 },
    #[error("invalid remote base URL '{url}'")]
    InvalidRemoteUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

fn threshold(field: &'static str, value: f64) -> Result<(), ConfigValidationError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigValidationError::ThresholdOutOfRange { field, value })
    }
}

fn non_zero(field: &'static str, value: u64) -> Result<(), ConfigValidationError> {
    if value == 0 {
        return Err(ConfigValidationError::Zero { field });
    }
    Ok(())
}

pub fn validate(config: &RepriseConfig) -> Result<(), ConfigValidationError> {
    let session = &config.session;
    non_zero("session.sync_interval_ms", session.sync_interval_ms)?;
    non_zero("session.auto_advance_delay_ms", session.auto_advance_delay_ms)?;
    non_zero("session.event_buffer", session.event_buffer as u64)?;
    threshold("session.completion_threshold", session.completion_threshold)?;
    threshold("session.restart_threshold", session.restart_threshold)?;
    non_zero("remote.request_timeout_ms", config.remote.request_timeout_ms)?;

    if let Some(raw) = config.remote.base_url.as_deref()
        && !raw.trim().is_empty()
    {
        let trimmed = raw.trim();
        let candidate = if trimmed.contains("://") {
            trimmed.to_string()
        } else {
            format!("http://{trimmed}")
        };
        Url::parse(&candidate).map_err(|source| {
            ConfigValidationError::InvalidRemoteUrl {
                url: raw.to_string(),
                source,
            }
        })?;
    }
    Ok(())
}
