use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Map, Value};

use crate::error::{DataError, DataResult};

/// Name of the identifier field in serialized documents.
pub const ID_FIELD: &str = "id";

/// A schemaless stored entity.
///
/// The id is kept apart from the remaining fields so backends can key on it
/// without parsing; it is serialized back as the `"id"` field.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Map<String, Value>) -> Self {
        let mut fields = fields;
        fields.remove(ID_FIELD);
        Self {
            id: id.into(),
            fields,
        }
    }

    /// Build a document from a JSON object carrying an `"id"` field.
    pub fn from_value(value: Value) -> DataResult<Self> {
        let Value::Object(mut fields) = value else {
            return Err(DataError::Invalid("document must be a JSON object".into()));
        };
        let id = fields
            .remove(ID_FIELD)
            .as_ref()
            .and_then(canonical_id)
            .ok_or_else(|| DataError::Invalid("document is missing a usable `id`".into()))?;
        Ok(Self { id, fields })
    }

    /// Read a field; `"id"` addresses the identifier.
    ///
    /// An explicit `null` is reported as absent.
    pub fn get(&self, field: &str) -> Option<Value> {
        if field == ID_FIELD {
            return Some(Value::String(self.id.clone()));
        }
        match self.fields.get(field) {
            None | Some(Value::Null) => None,
            Some(v) => Some(v.clone()),
        }
    }

    pub fn set(&mut self, field: &str, value: Value) {
        if field != ID_FIELD {
            self.fields.insert(field.to_string(), value);
        }
    }

    /// Merge `patch` into the fields. The id is never rewritten.
    pub fn apply(&mut self, patch: &Map<String, Value>) {
        for (k, v) in patch {
            self.set(k, v.clone());
        }
    }

    pub fn to_value(&self) -> Value {
        let mut out = Map::with_capacity(self.fields.len() + 1);
        out.insert(ID_FIELD.to_string(), Value::String(self.id.clone()));
        for (k, v) in &self.fields {
            out.insert(k.clone(), v.clone());
        }
        Value::Object(out)
    }
}

impl Serialize for Document {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1))?;
        map.serialize_entry(ID_FIELD, &self.id)?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Canonical string form of an id-like value.
///
/// Strings are taken as-is, numbers are printed, and embedded objects
/// contribute their own `"id"`. Anything else has no id form.
pub fn canonical_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(obj) => obj.get(ID_FIELD).and_then(canonical_id),
        _ => None,
    }
}
