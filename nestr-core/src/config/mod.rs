//! Layered configuration.
//!
//! Sources, lowest priority first:
//! 1. `application.yaml`
//! 2. `application-{profile}.yaml`
//! 3. `.env` then `.env.{profile}`, loaded into the process environment
//!    without overwriting variables that are already set
//! 4. `NESTR_*` environment variables (`NESTR_PAGE_LIMIT` → `nestr.page.limit`)
//!
//! The profile is `NESTR_PROFILE` if set, else the caller's choice.

mod section;
mod source;

use std::path::Path;

use serde::de::DeserializeOwned;
use serde_yaml::Value;
use tracing::debug;

pub use section::{ConfigProperties, MissingKey};
use source::Values;

pub const PROFILE_ENV: &str = "NESTR_PROFILE";
pub const ENV_PREFIX: &str = "NESTR_";

#[derive(Debug)]
pub enum ConfigError {
    NotFound(String),
    Invalid { key: String, reason: String },
    Load(String),
    Missing(Vec<MissingKey>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(key) => write!(f, "Config key not found: {key}"),
            ConfigError::Invalid { key, reason } => write!(f, "Invalid value for '{key}': {reason}"),
            ConfigError::Load(msg) => write!(f, "Config load error: {msg}"),
            ConfigError::Missing(keys) => {
                write!(f, "Missing required settings:")?;
                for key in keys {
                    write!(f, "\n  - {key}")?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, Default)]
pub struct NestrConfig {
    values: Values,
    profile: String,
}

impl NestrConfig {
    /// Load the given profile from the working directory.
    pub fn load(profile: &str) -> Result<Self, ConfigError> {
        Self::load_from(Path::new("."), profile)
    }

    pub fn load_from(dir: &Path, profile: &str) -> Result<Self, ConfigError> {
        let profile = std::env::var(PROFILE_ENV).unwrap_or_else(|_| profile.to_string());

        let mut values = Values::new();
        source::read_yaml_file(&dir.join("application.yaml"), &mut values)?;
        source::read_yaml_file(&dir.join(format!("application-{profile}.yaml")), &mut values)?;

        for env_file in [dir.join(".env"), dir.join(format!(".env.{profile}"))] {
            if env_file.is_file() {
                dotenvy::from_path(&env_file)
                    .map_err(|e| ConfigError::Load(format!("{}: {e}", env_file.display())))?;
            }
        }
        source::overlay_env(&mut values, std::env::vars());

        debug!(%profile, keys = values.len(), "configuration loaded");
        Ok(Self { values, profile })
    }

    pub fn from_yaml_str(yaml: &str, profile: &str) -> Result<Self, ConfigError> {
        let mut values = Values::new();
        source::read_yaml_str(yaml, &mut values)?;
        Ok(Self {
            values,
            profile: profile.to_string(),
        })
    }

    pub fn empty() -> Self {
        Self {
            values: Values::new(),
            profile: "test".to_string(),
        }
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// Read `key` as `V`. Scalars are read leniently: `"50"` (as every
    /// environment value arrives) reads as a number, and numbers read as
    /// strings.
    pub fn get<V: DeserializeOwned>(&self, key: &str) -> Result<V, ConfigError> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))?;
        let invalid = |e: serde_yaml::Error| ConfigError::Invalid {
            key: key.to_string(),
            reason: e.to_string(),
        };
        match serde_yaml::from_value(value.clone()) {
            Ok(v) => Ok(v),
            Err(first) => match (value, source::scalar_text(value)) {
                (Value::String(text), _) => serde_yaml::from_str(text).map_err(|_| invalid(first)),
                (_, Some(text)) => serde_yaml::from_value(Value::String(text)).map_err(|_| invalid(first)),
                _ => Err(invalid(first)),
            },
        }
    }

    /// Like [`get`](Self::get), with `default` for a missing key. A present
    /// value that does not convert is still an error.
    pub fn get_or<V: DeserializeOwned>(&self, key: &str, default: V) -> Result<V, ConfigError> {
        match self.get(key) {
            Err(ConfigError::NotFound(_)) => Ok(default),
            other => other,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    /// Build a typed section, reporting every missing required key at once.
    pub fn section<C: ConfigProperties>(&self) -> Result<C, ConfigError> {
        let missing = section::missing_keys::<C>(self);
        if !missing.is_empty() {
            return Err(ConfigError::Missing(missing));
        }
        C::from_config(self)
    }
}
