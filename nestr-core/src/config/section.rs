use super::{ConfigError, NestrConfig};

/// A typed view over one configuration section.
///
/// ```ignore
/// impl ConfigProperties for PageSettings {
///     const SECTION: &'static str = "nestr.page";
///
///     fn from_config(config: &NestrConfig) -> Result<Self, ConfigError> {
///         Ok(Self { limit: config.get_or("nestr.page.limit", 20)? })
///     }
/// }
/// ```
pub trait ConfigProperties: Sized {
    const SECTION: &'static str;

    /// Keys that have no default. Checked before `from_config` runs, so all
    /// of them are reported at once.
    fn required_keys() -> &'static [&'static str] {
        &[]
    }

    fn from_config(config: &NestrConfig) -> Result<Self, ConfigError>;
}

/// A required key absent from every configuration source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingKey {
    pub section: &'static str,
    pub key: String,
}

impl MissingKey {
    /// The environment variable that would provide the key.
    pub fn env_var(&self) -> String {
        self.key.to_ascii_uppercase().replace('.', "_")
    }
}

impl std::fmt::Display for MissingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] `{}` (or env `{}`)", self.section, self.key, self.env_var())
    }
}

pub(crate) fn missing_keys<C: ConfigProperties>(config: &NestrConfig) -> Vec<MissingKey> {
    C::required_keys()
        .iter()
        .filter(|key| !config.contains_key(key))
        .map(|key| MissingKey {
            section: C::SECTION,
            key: key.to_string(),
        })
        .collect()
}
