use serde_json::{Map, Number, Value};

use super::RestView;
use crate::context::RequestContext;
use crate::error::ViewError;
use crate::node::{AttributeOptions, ValueType};
use crate::response::ViewResponse;

impl RestView {
    pub(super) async fn attribute_show(&self, ctx: &RequestContext) -> Result<ViewResponse, ViewError> {
        let node = self.node();
        let (_, owner) = self.resolver().resolve_owner(node, ctx).await?;
        Ok(ViewResponse::Item(owner.get(&node.name).unwrap_or(Value::Null)))
    }

    pub(super) async fn attribute_append(&self, ctx: &RequestContext) -> Result<ViewResponse, ViewError> {
        let node = self.node();
        let incoming = incoming_values(ctx, &node.name)?;
        let (parent, owner) = self.write_resolver().resolve_owner(node, ctx).await?;
        let merged = merge_attribute(owner.get(&node.name), incoming, &node.attribute)?;

        let mut patch = Map::new();
        patch.insert(node.name.clone(), merged.clone());
        self.accessor.update(&parent.model, &owner.id, &patch).await?;

        Ok(ViewResponse::Created {
            location: None,
            resource: merged,
        })
    }
}

/// The request body, unwrapped when it is `{ "<attr>": ... }`.
fn incoming_values(ctx: &RequestContext, attr: &str) -> Result<Value, ViewError> {
    match ctx.payload() {
        None => Err(ViewError::bad_request("request body is required")),
        Some(Value::Object(body)) if body.len() == 1 && body.contains_key(attr) => {
            Ok(body.get(attr).cloned().unwrap_or(Value::Null))
        }
        Some(Value::Object(_)) => Ok(Value::Object(ctx.payload_fields()?)),
        Some(other) => Ok(other.clone()),
    }
}

/// Append `incoming` to a list attribute or merge it into a dict attribute.
/// An unset attribute takes the kind of the incoming value, except that
/// objects start a list when the element type is `object`.
pub(crate) fn merge_attribute(
    current: Option<Value>,
    incoming: Value,
    options: &AttributeOptions,
) -> Result<Value, ViewError> {
    match (current, incoming) {
        (None, Value::Object(updates)) if options.value_type != Some(ValueType::Object) => merge_dict(Map::new(), updates, options),
        (Some(Value::Object(dict)), Value::Object(updates)) => merge_dict(dict, updates, options),
        (Some(Value::Object(_)), _) => Err(ViewError::bad_request(
            "a dict attribute only accepts an object of updates",
        )),
        (current, incoming) => {
            let mut list = match current {
                None => Vec::new(),
                Some(Value::Array(items)) => items,
                Some(_) => {
                    return Err(ViewError::bad_request(
                        "attribute is neither a list nor a dict",
                    ))
                }
            };
            let values = match incoming {
                Value::Array(values) => values,
                Value::Null => Vec::new(),
                single => vec![single],
            };
            for value in values {
                let value = coerce(value, options.value_type)?;
                if options.unique && list.contains(&value) {
                    continue;
                }
                list.push(value);
            }
            Ok(Value::Array(list))
        }
    }
}

fn merge_dict(
    mut dict: Map<String, Value>,
    updates: Map<String, Value>,
    options: &AttributeOptions,
) -> Result<Value, ViewError> {
    for (key, value) in updates {
        dict.insert(key, coerce(value, options.value_type)?);
    }
    Ok(Value::Object(dict))
}

fn coerce(value: Value, value_type: Option<ValueType>) -> Result<Value, ViewError> {
    let Some(value_type) = value_type else {
        return Ok(value);
    };
    let coerced = match (value_type, &value) {
        (ValueType::String, Value::String(_)) => Some(value.clone()),
        (ValueType::String, Value::Number(n)) => Some(Value::String(n.to_string())),
        (ValueType::String, Value::Bool(b)) => Some(Value::String(b.to_string())),
        (ValueType::Integer, Value::Number(n)) if n.is_i64() || n.is_u64() => Some(value.clone()),
        (ValueType::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
        (ValueType::Float, Value::Number(n)) => n.as_f64().and_then(Number::from_f64).map(Value::Number),
        (ValueType::Float, Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number),
        (ValueType::Boolean, Value::Bool(_)) => Some(value.clone()),
        (ValueType::Boolean, Value::String(s)) => match s.trim() {
            "true" => Some(Value::Bool(true)),
            "false" => Some(Value::Bool(false)),
            _ => None,
        },
        (ValueType::Object, Value::Object(_)) => Some(value.clone()),
        _ => None,
    };
    coerced.ok_or_else(|| ViewError::bad_request(format!("`{value}` is not a valid {value_type:?}")))
}
