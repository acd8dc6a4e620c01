use nestr_core::{ConfigError, ConfigProperties, NestrConfig};

use crate::context::{CONFIRMATION_KEY, DEFAULT_LIMIT};

/// The `nestr.*` configuration section.
///
/// ```yaml
/// nestr:
///   api:
///     prefix: /api
///   page:
///     limit: 50
///   resources:
///     depth: 4
///     file: resources.yaml
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestSettings {
    pub prefix: String,
    /// Limit applied to read requests that do not pass `_limit`.
    pub default_limit: u64,
    pub max_depth: usize,
    pub confirmation_key: String,
    pub resources_file: Option<String>,
}

impl Default for RestSettings {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            default_limit: DEFAULT_LIMIT,
            max_depth: 8,
            confirmation_key: CONFIRMATION_KEY.to_string(),
            resources_file: None,
        }
    }
}

impl ConfigProperties for RestSettings {
    const SECTION: &'static str = "nestr";

    fn from_config(config: &NestrConfig) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            prefix: config.get_or("nestr.api.prefix", defaults.prefix)?,
            default_limit: config.get_or("nestr.page.limit", defaults.default_limit)?,
            max_depth: config.get_or("nestr.resources.depth", defaults.max_depth)?,
            confirmation_key: config.get_or("nestr.confirmation.key", defaults.confirmation_key)?,
            resources_file: config.get_or("nestr.resources.file", None)?,
        })
    }
}
