//! Where configuration values come from: YAML documents and the process
//! environment.

use std::collections::BTreeMap;
use std::path::Path;

use serde_yaml::Value;

use super::{ConfigError, ENV_PREFIX, PROFILE_ENV};

pub(crate) type Values = BTreeMap<String, Value>;

pub(crate) fn read_yaml_file(path: &Path, values: &mut Values) -> Result<(), ConfigError> {
    if !path.is_file() {
        return Ok(());
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))?;
    read_yaml_str(&content, values)
        .map_err(|e| ConfigError::Load(format!("{}: {e}", path.display())))
}

pub(crate) fn read_yaml_str(content: &str, values: &mut Values) -> Result<(), ConfigError> {
    let document: Value =
        serde_yaml::from_str(content).map_err(|e| ConfigError::Load(e.to_string()))?;
    flatten(String::new(), document, values);
    Ok(())
}

/// Mappings become dotted keys; anything else, sequences included, is a leaf.
fn flatten(prefix: String, value: Value, out: &mut Values) {
    match value {
        Value::Mapping(map) => {
            for (key, child) in map {
                let segment = match key {
                    Value::String(s) => s,
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => continue,
                };
                let key = if prefix.is_empty() {
                    segment
                } else {
                    format!("{prefix}.{segment}")
                };
                flatten(key, child, out);
            }
        }
        leaf if !prefix.is_empty() => {
            out.insert(prefix, leaf);
        }
        _ => {}
    }
}

/// `NESTR_PAGE_LIMIT=50` sets `nestr.page.limit`. Only variables under the
/// `NESTR_` prefix take part; the profile selector itself is skipped.
pub(crate) fn overlay_env(values: &mut Values, vars: impl IntoIterator<Item = (String, String)>) {
    for (name, raw) in vars {
        if name == PROFILE_ENV || !name.starts_with(ENV_PREFIX) {
            continue;
        }
        let key = name.to_ascii_lowercase().replace('_', ".");
        values.insert(key, Value::String(raw));
    }
}

/// Text form of a scalar, for reading it back as another scalar type.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
