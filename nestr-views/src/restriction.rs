use serde_json::Value;

use nestr_data::document::ID_FIELD;
use nestr_data::canonical_id;

/// The id set a child request is confined to, derived from its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Restriction {
    /// No parent, or the parent does not carry the relation.
    Unrestricted,
    /// The parent carries the relation and it is empty: nothing matches.
    Empty,
    Ids(Vec<String>),
}

impl Restriction {
    /// Interpret the value of a parent's relation attribute.
    ///
    /// Absent or `null` leaves the child unrestricted. Lists contribute the
    /// canonical id of each element; an object is either an embedded entity
    /// (its `id`) or an id-keyed map. A relation that yields no ids
    /// restricts to nothing.
    pub fn from_relation(value: Option<&Value>) -> Self {
        let ids: Vec<String> = match value {
            None | Some(Value::Null) => return Restriction::Unrestricted,
            Some(Value::Array(items)) => items.iter().filter_map(canonical_id).collect(),
            Some(Value::Object(map)) => match map.get(ID_FIELD).and_then(canonical_id) {
                Some(id) => vec![id],
                None => map.keys().cloned().collect(),
            },
            Some(other) => canonical_id(other).into_iter().collect(),
        };
        Self::from_ids(ids)
    }

    pub fn from_ids(mut ids: Vec<String>) -> Self {
        let mut seen = std::collections::HashSet::new();
        ids.retain(|id| seen.insert(id.clone()));
        if ids.is_empty() {
            Restriction::Empty
        } else {
            Restriction::Ids(ids)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Restriction::Empty)
    }

    pub fn admits(&self, id: &str) -> bool {
        match self {
            Restriction::Unrestricted => true,
            Restriction::Empty => false,
            Restriction::Ids(ids) => ids.iter().any(|member| member == id),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_relation_is_unrestricted() {
        assert_eq!(Restriction::from_relation(None), Restriction::Unrestricted);
        assert_eq!(
            Restriction::from_relation(Some(&Value::Null)),
            Restriction::Unrestricted
        );
    }

    #[test]
    fn empty_relation_restricts_to_nothing() {
        assert_eq!(Restriction::from_relation(Some(&json!([]))), Restriction::Empty);
        assert_eq!(Restriction::from_relation(Some(&json!({}))), Restriction::Empty);
        assert!(!Restriction::Empty.admits("b1"));
    }

    #[test]
    fn canonicalizes_members() {
        let r = Restriction::from_relation(Some(&json!(["b1", 7, { "id": "b3" }, "b1", true])));
        assert_eq!(
            r,
            Restriction::Ids(vec!["b1".into(), "7".into(), "b3".into()])
        );
        assert!(r.admits("7"));
        assert!(!r.admits("b2"));
    }

    #[test]
    fn objects_and_scalars() {
        assert_eq!(
            Restriction::from_relation(Some(&json!({ "id": 4, "name": "x" }))),
            Restriction::Ids(vec!["4".into()])
        );
        assert_eq!(
            Restriction::from_relation(Some(&json!({ "b1": true, "b2": true }))),
            Restriction::Ids(vec!["b1".into(), "b2".into()])
        );
        assert_eq!(
            Restriction::from_relation(Some(&json!("b9"))),
            Restriction::Ids(vec!["b9".into()])
        );
    }
}
