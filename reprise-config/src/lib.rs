//! Configuration for Reprise playback sessions.
//!
//! Settings come from (first match wins) `$REPRISE_CONFIG_PATH`,
//! `$REPRISE_CONFIG_JSON`, or a `reprise.toml`/`reprise.json` next to the
//! process, and fall back to the documented defaults. A `.env` file is read
//! first, and `REPRISE_REMOTE_URL` overrides the remote store address.

pub mod loader;
pub mod models;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoader, ConfigSource, error::ConfigLoadError};
pub use models::{CacheConfig, RemoteConfig, RepriseConfig};
pub use reprise_core::SessionSettings;
pub use validation::{ConfigValidationError, validate};
