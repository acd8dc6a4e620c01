//! Backend-neutral query description.
//!
//! A [`Query`] carries field conditions, an optional id membership set,
//! free-text terms (honored by search backends), ordering and pagination.
//! In-process backends evaluate it with [`Query::run`]; external backends
//! translate it into their own query language.
//!
//! ```ignore
//! let q = Query::new()
//!     .where_eq("status", "published")
//!     .where_id_in(vec!["b1".into(), "b2".into()])
//!     .term("dune")
//!     .order_by("title", true)
//!     .paginate(Pageable::new(Some(20), 0));
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde_json::Value;

use crate::document::{canonical_id, Document, ID_FIELD};
use crate::page::{Page, Pageable};

/// A request filter value: a single value or a value-set (OR semantics).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterValue {
    One(String),
    Many(Vec<String>),
}

impl FilterValue {
    pub fn values(&self) -> &[String] {
        match self {
            FilterValue::One(v) => std::slice::from_ref(v),
            FilterValue::Many(vs) => vs,
        }
    }

    /// Add another value for the same key, promoting to a value-set.
    pub fn push(&mut self, value: String) {
        match self {
            FilterValue::One(existing) => {
                *self = FilterValue::Many(vec![std::mem::take(existing), value]);
            }
            FilterValue::Many(vs) => vs.push(value),
        }
    }
}

/// Data filters keyed by field name.
pub type Filters = BTreeMap<String, FilterValue>;

#[derive(Debug, Clone, PartialEq)]
enum Condition {
    Eq(String, String),
    In(String, Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    conditions: Vec<Condition>,
    raw_terms: Vec<String>,
    order: Vec<(String, bool)>,
    pageable: Pageable,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: &str, value: &str) -> Self {
        self.conditions
            .push(Condition::Eq(field.to_string(), value.to_string()));
        self
    }

    pub fn where_in(mut self, field: &str, values: Vec<String>) -> Self {
        self.conditions.push(Condition::In(field.to_string(), values));
        self
    }

    /// Restrict to documents whose id is a member of `ids`.
    pub fn where_id_in(self, ids: Vec<String>) -> Self {
        self.where_in(ID_FIELD, ids)
    }

    /// Add one condition per filter entry.
    pub fn filters(mut self, filters: &Filters) -> Self {
        for (field, value) in filters {
            self = match value {
                FilterValue::One(v) => self.where_eq(field, v),
                FilterValue::Many(vs) => self.where_in(field, vs.clone()),
            };
        }
        self
    }

    /// Add a free-text term. Multiple terms are combined with AND.
    pub fn term(mut self, term: &str) -> Self {
        let term = term.trim();
        if !term.is_empty() {
            self.raw_terms.push(term.to_string());
        }
        self
    }

    pub fn order_by(mut self, field: &str, ascending: bool) -> Self {
        self.order.push((field.to_string(), ascending));
        self
    }

    pub fn paginate(mut self, pageable: Pageable) -> Self {
        self.pageable = pageable;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.pageable.limit = Some(limit);
        self
    }

    pub fn pageable(&self) -> &Pageable {
        &self.pageable
    }

    /// Free-text terms joined with `AND`, or `None` when there are none.
    pub fn raw_query(&self) -> Option<String> {
        if self.raw_terms.is_empty() {
            None
        } else {
            Some(self.raw_terms.join(" AND "))
        }
    }

    /// Whether a document satisfies every field condition.
    ///
    /// Array-valued fields match when any element matches.
    pub fn matches(&self, doc: &Document) -> bool {
        self.conditions.iter().all(|cond| match cond {
            Condition::Eq(field, expected) => field_values(doc, field).any(|v| &v == expected),
            Condition::In(field, allowed) => {
                field_values(doc, field).any(|v| allowed.iter().any(|a| a == &v))
            }
        })
    }

    /// Whether a document satisfies every free-text term.
    ///
    /// `field:value` terms match a field by case-insensitive substring; bare
    /// terms match any scalar field.
    pub fn matches_terms(&self, doc: &Document) -> bool {
        self.raw_terms
            .iter()
            .flat_map(|t| t.split(" AND "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .all(|term| term_matches(doc, term))
    }

    /// Evaluate against an in-memory collection: filter, sort, paginate.
    ///
    /// `with_terms` controls whether free-text terms participate; only
    /// search backends honor them.
    pub fn run<'a>(&self, docs: impl Iterator<Item = &'a Document>, with_terms: bool) -> Page<Document> {
        let mut matched: Vec<Document> = docs
            .filter(|doc| self.matches(doc) && (!with_terms || self.matches_terms(doc)))
            .cloned()
            .collect();

        matched.sort_by(|a, b| {
            for (field, ascending) in &self.order {
                let ord = compare_values(a.get(field).as_ref(), b.get(field).as_ref());
                if ord != Ordering::Equal {
                    return if *ascending { ord } else { ord.reverse() };
                }
            }
            a.id.cmp(&b.id)
        });

        let total = matched.len() as u64;
        let offset = usize::try_from(self.pageable.offset()).unwrap_or(usize::MAX);
        let content: Vec<Document> = match self.pageable.limit {
            Some(limit) => matched
                .into_iter()
                .skip(offset)
                .take(usize::try_from(limit).unwrap_or(usize::MAX))
                .collect(),
            None => matched.into_iter().skip(offset).collect(),
        };
        Page::new(content, &self.pageable, total)
    }
}

fn field_values(doc: &Document, field: &str) -> Box<dyn Iterator<Item = String>> {
    match doc.get(field) {
        Some(Value::Array(items)) => Box::new(items.into_iter().filter_map(|v| scalar_string(&v))),
        Some(v) => Box::new(scalar_string(&v).into_iter()),
        None => Box::new(std::iter::empty()),
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::Bool(b) => Some(b.to_string()),
        other => canonical_id(other),
    }
}

fn term_matches(doc: &Document, term: &str) -> bool {
    let contains = |v: &Value| {
        scalar_string(v)
            .map(|s| s.to_lowercase().contains(&term_needle(term)))
            .unwrap_or(false)
    };
    match term.split_once(':') {
        Some((field, needle)) if !field.is_empty() && !needle.is_empty() => {
            let needle = needle.to_lowercase();
            field_values(doc, field).any(|v| v.to_lowercase().contains(&needle))
        }
        _ => {
            doc.id.to_lowercase().contains(&term_needle(term))
                || doc.fields.values().any(|v| match v {
                    Value::Array(items) => items.iter().any(&contains),
                    other => contains(other),
                })
        }
    }
}

fn term_needle(term: &str) -> String {
    term.trim_matches('"').to_lowercase()
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(x), Some(y)) => scalar_string(x).cmp(&scalar_string(y)),
    }
}
