use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use reprise_core::SessionSettings;
use serde::{Deserialize, Serialize};

pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const FALLBACK_CACHE_DIR: &str = ".reprise-cache";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepriseConfig {
    /// Session tunables: sync cadence, countdown, thresholds, autoplay.
    pub session: SessionSettings,
    pub remote: RemoteConfig,
    pub cache: CacheConfig,
}

/// Server-side progress store. Remote writes are disabled without a base URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub base_url: Option<String>,
    pub request_timeout_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl RemoteConfig {
    pub fn is_enabled(&self) -> bool {
        self.base_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Device-local progress cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache directory; the platform cache dir when unset
    pub root: Option<PathBuf>,
}

impl CacheConfig {
    pub fn resolved_root(&self) -> PathBuf {
        if let Some(root) = &self.root {
            return root.clone();
        }
        ProjectDirs::from("", "reprise", "reprise")
            .map(|dirs| dirs.cache_dir().join("progress"))
            .unwrap_or_else(|| PathBuf::from(FALLBACK_CACHE_DIR))
    }
}
