pub mod error;

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::models::RepriseConfig;
use crate::validation::validate;
use error::ConfigLoadError;

pub const ENV_CONFIG_PATH: &str = "REPRISE_CONFIG_PATH";
pub const ENV_CONFIG_JSON: &str = "REPRISE_CONFIG_JSON";
pub const ENV_REMOTE_URL: &str = "REPRISE_REMOTE_URL";

const DEFAULT_CANDIDATES: &[&str] =
    &["reprise.toml", "reprise.json", "config/reprise.toml"];

/// Source that produced the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigSource {
    #[default]
    Default,
    EnvPath(PathBuf),
    EnvInline,
    File(PathBuf),
}

/// A validated configuration plus where it came from.
#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: RepriseConfig,
    pub source: ConfigSource,
    /// `REPRISE_REMOTE_URL` replaced the configured remote base URL
    pub remote_url_from_env: bool,
}

#[derive(Debug, Clone)]
enum EnvSource {
    Process,
    Fixed(HashMap<String, String>),
}

#[derive(Debug, Clone)]
pub struct ConfigLoader {
    base_dir: PathBuf,
    env: EnvSource,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader reading the process environment (and `.env`) relative to the
    /// working directory.
    pub fn new() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            env: EnvSource::Process,
        }
    }

    /// Directory that relative paths and default candidates resolve against.
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    /// Use a fixed variable set instead of the process environment. No
    /// `.env` file is read in this mode.
    pub fn with_env<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = EnvSource::Fixed(
            vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        );
        self
    }

    fn var(&self, key: &str) -> Option<String> {
        let value = match &self.env {
            EnvSource::Process => env::var(key).ok(),
            EnvSource::Fixed(vars) => vars.get(key).cloned(),
        };
        value.filter(|v| !v.trim().is_empty())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    fn read_env_file(&self) -> Result<(), ConfigLoadError> {
        if !matches!(self.env, EnvSource::Process) {
            return Ok(());
        }
        match dotenvy::from_path(self.base_dir.join(".env")) {
            Ok(()) => {
                debug!("loaded .env");
                Ok(())
            }
            Err(err) if err.not_found() => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Evaluation order:
    /// 1) `$REPRISE_CONFIG_PATH` (TOML or JSON file),
    /// 2) `$REPRISE_CONFIG_JSON` (inline JSON),
    /// 3) `reprise.toml`, `reprise.json`, `config/reprise.toml`,
    /// 4) defaults.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        self.read_env_file()?;

        let (mut config, source) = if let Some(path) = self.var(ENV_CONFIG_PATH) {
            let path = self.resolve(Path::new(&path));
            (load_from_file(&path)?, ConfigSource::EnvPath(path))
        } else if let Some(raw) = self.var(ENV_CONFIG_JSON) {
            (parse_json(&raw, ENV_CONFIG_JSON)?, ConfigSource::EnvInline)
        } else if let Some(path) = self.find_default_file() {
            (load_from_file(&path)?, ConfigSource::File(path))
        } else {
            (RepriseConfig::default(), ConfigSource::Default)
        };

        let remote_url_from_env = match self.var(ENV_REMOTE_URL) {
            Some(url) => {
                config.remote.base_url = Some(url);
                true
            }
            None => false,
        };

        validate(&config)?;
        info!(
            source = ?source,
            remote = config.remote.base_url.as_deref().unwrap_or("disabled"),
            "configuration loaded"
        );
        Ok(ConfigLoad {
            config,
            source,
            remote_url_from_env,
        })
    }

    fn find_default_file(&self) -> Option<PathBuf> {
        DEFAULT_CANDIDATES
            .iter()
            .map(|candidate| self.base_dir.join(candidate))
            .find(|path| path.exists())
    }
}

pub fn load_from_file(path: &Path) -> Result<RepriseConfig, ConfigLoadError> {
    let contents =
        fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    let origin = path.display().to_string();

    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => parse_json(&contents, &origin),
        Some("toml") | Some("tml") => toml::from_str(&contents)
            .map_err(|source| ConfigLoadError::Toml { origin, source }),
        _ => parse_from_str(&contents, &origin),
    }
}

/// Try TOML first, then JSON.
pub fn parse_from_str(
    contents: &str,
    origin: &str,
) -> Result<RepriseConfig, ConfigLoadError> {
    toml::from_str(contents).or_else(|toml_err| {
        serde_json::from_str(contents).map_err(|json_err| {
            ConfigLoadError::UnknownFormat {
                origin: origin.to_string(),
                toml_error: toml_err.to_string(),
                json_error: json_err.to_string(),
            }
        })
    })
}

pub fn parse_json(raw: &str, origin: &str) -> Result<RepriseConfig, ConfigLoadError> {
    serde_json::from_str(raw).map_err(|source| ConfigLoadError::Json {
        origin: origin.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_extension_accepts_either_format() {
        let toml = parse_from_str("[session]\nautoplay = true\n", "inline").unwrap();
        assert!(toml.session.autoplay);

        let json = parse_from_str(r#"{"session":{"auto_next":false}}"#, "inline").unwrap();
        assert!(!json.session.auto_next);

        let err = parse_from_str("session = [", "inline").unwrap_err();
        assert!(matches!(err, ConfigLoadError::UnknownFormat { .. }));
    }

    #[test]
    fn blank_variables_are_ignored() {
        let loader = ConfigLoader::new()
            .base_dir("/nonexistent-reprise-dir")
            .with_env([(ENV_CONFIG_JSON, "   ")]);
        let load = loader.load().unwrap();
        assert_eq!(load.source, ConfigSource::Default);
    }
}
