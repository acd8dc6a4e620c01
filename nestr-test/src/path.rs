//! JSON path resolution for response assertions.
//!
//! `data[0].title`, `tags.len()`, `resource.id`.

use serde_json::Value;

#[derive(Debug, PartialEq, Eq)]
pub enum PathToken {
    Field(String),
    Index(usize),
    Len,
}

pub fn tokenize_path(path: &str) -> Vec<PathToken> {
    let mut tokens = Vec::new();
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        if segment == "len()" {
            tokens.push(PathToken::Len);
            continue;
        }
        let Some(bracket) = segment.find('[') else {
            tokens.push(PathToken::Field(segment.to_string()));
            continue;
        };
        if bracket > 0 {
            tokens.push(PathToken::Field(segment[..bracket].to_string()));
        }
        for index in segment[bracket..]
            .split(['[', ']'])
            .filter(|s| !s.is_empty())
        {
            let index = index
                .parse()
                .unwrap_or_else(|_| panic!("non-numeric array index `{index}` in JSON path `{path}`"));
            tokens.push(PathToken::Index(index));
        }
    }
    tokens
}

/// Walk `root` along `path`; missing steps resolve to `null`.
pub fn resolve_path(root: &Value, path: &str) -> Value {
    let mut current = root.clone();
    for token in tokenize_path(path) {
        current = match token {
            PathToken::Field(name) => current.get(&name).cloned().unwrap_or(Value::Null),
            PathToken::Index(idx) => current.get(idx).cloned().unwrap_or(Value::Null),
            PathToken::Len => match &current {
                Value::Array(a) => Value::from(a.len()),
                Value::Object(o) => Value::from(o.len()),
                Value::String(s) => Value::from(s.len()),
                other => panic!("len() applied to non-collection {other} in JSON path `{path}`"),
            },
        };
    }
    current
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn tokenizes_fields_indices_and_len() {
        assert_eq!(
            tokenize_path("data[1][0].tags.len()"),
            vec![
                PathToken::Field("data".into()),
                PathToken::Index(1),
                PathToken::Index(0),
                PathToken::Field("tags".into()),
                PathToken::Len,
            ]
        );
    }

    #[test]
    fn resolves_nested_values() {
        let body = json!({ "data": [{ "id": "b1", "tags": ["x", "y"] }], "count": 1 });
        assert_eq!(resolve_path(&body, "data[0].id"), json!("b1"));
        assert_eq!(resolve_path(&body, "data[0].tags.len()"), json!(2));
        assert_eq!(resolve_path(&body, "data[3].id"), Value::Null);
    }
}
