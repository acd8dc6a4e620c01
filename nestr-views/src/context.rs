//! Per-request parameters handed to view operations.
//!
//! Query parameters are kept whole; reserved keys (`_limit`, `_page`,
//! `_sort`, `q` and the confirmation marker) are read through dedicated
//! accessors and never show up in [`RequestContext::filters`].

use std::collections::HashMap;

use nestr_core::http::Method;
use nestr_core::{parse_query_string, parse_u64_param};
use nestr_data::{FilterValue, Filters, Pageable};
use serde_json::{Map, Value};

use crate::error::ViewError;
use crate::settings::RestSettings;

pub const LIMIT_KEY: &str = "_limit";
pub const PAGE_KEY: &str = "_page";
pub const SORT_KEY: &str = "_sort";
pub const TERMS_KEY: &str = "q";
pub const CONFIRMATION_KEY: &str = "__confirmation";
pub const DEFAULT_LIMIT: u64 = 20;

#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    path_params: HashMap<String, String>,
    params: Filters,
    payload: Option<Value>,
    default_limit: u64,
    confirmation_key: String,
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::new(Method::GET)
    }
}

impl RequestContext {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            path_params: HashMap::new(),
            params: Filters::new(),
            payload: None,
            default_limit: DEFAULT_LIMIT,
            confirmation_key: CONFIRMATION_KEY.to_string(),
        }
    }

    /// Build from a raw query string. Repeated keys and comma-separated
    /// values both produce value-sets; `q` is kept verbatim.
    pub fn from_query(method: Method, query: Option<&str>) -> Self {
        Self::new(method).with_query(query)
    }

    pub fn with_query(self, query: Option<&str>) -> Self {
        parse_query_string(query)
            .into_iter()
            .fold(self, |ctx, (key, value)| ctx.with_param(key, value))
    }

    pub fn with_settings(mut self, settings: &RestSettings) -> Self {
        self.default_limit = settings.default_limit;
        self.confirmation_key = settings.confirmation_key.clone();
        self
    }

    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    pub fn with_path_params(mut self, params: HashMap<String, String>) -> Self {
        self.path_params.extend(params);
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        let pieces: Vec<String> = if key == TERMS_KEY || key == self.confirmation_key {
            vec![value]
        } else {
            value
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect()
        };
        for piece in pieces {
            match self.params.get_mut(&key) {
                Some(existing) => existing.push(piece),
                None => {
                    self.params.insert(key.clone(), FilterValue::One(piece));
                }
            }
        }
        self
    }

    /// Ask `delete_many` to go ahead.
    pub fn confirmed(self) -> Self {
        let key = self.confirmation_key.clone();
        self.with_param(key, "true")
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    pub fn path_params(&self) -> &HashMap<String, String> {
        &self.path_params
    }

    pub fn param(&self, key: &str) -> Option<&FilterValue> {
        self.params.get(key)
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub fn confirmation_key(&self) -> &str {
        &self.confirmation_key
    }

    fn is_reserved(&self, key: &str) -> bool {
        matches!(key, LIMIT_KEY | PAGE_KEY | SORT_KEY | TERMS_KEY) || key == self.confirmation_key
    }

    fn first(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .and_then(|v| v.values().first())
            .map(String::as_str)
    }

    fn payload_limit(&self) -> Option<String> {
        match self.payload.as_ref()?.get(LIMIT_KEY)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Page size: `_limit` when given, the default for GET, otherwise none.
    pub fn limit(&self) -> Result<Option<u64>, ViewError> {
        let explicit = self
            .first(LIMIT_KEY)
            .map(str::to_string)
            .or_else(|| self.payload_limit());
        match explicit {
            Some(raw) => Ok(Some(parse_u64_param(LIMIT_KEY, &raw)?)),
            None if self.method == Method::GET => Ok(Some(self.default_limit)),
            None => Ok(None),
        }
    }

    /// Like [`limit`](Self::limit), but also drops `_limit` from the
    /// request so later reads of the parameters no longer see it.
    pub fn take_limit(&mut self) -> Result<Option<u64>, ViewError> {
        let limit = self.limit()?;
        self.params.remove(LIMIT_KEY);
        if let Some(Value::Object(body)) = self.payload.as_mut() {
            body.remove(LIMIT_KEY);
        }
        Ok(limit)
    }

    pub fn pageable(&self) -> Result<Pageable, ViewError> {
        let page = match self.first(PAGE_KEY) {
            Some(raw) => parse_u64_param(PAGE_KEY, raw)?,
            None => 0,
        };
        Ok(Pageable::new(self.limit()?, page))
    }

    /// Data filters: every query parameter that is not reserved.
    pub fn filters(&self) -> Filters {
        self.params
            .iter()
            .filter(|(key, _)| !self.is_reserved(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// `(field, ascending)` pairs from `_sort`; `-field` sorts descending.
    pub fn sort(&self) -> Vec<(String, bool)> {
        self.params
            .get(SORT_KEY)
            .map(|v| {
                v.values()
                    .iter()
                    .map(|field| match field.strip_prefix('-') {
                        Some(field) => (field.to_string(), false),
                        None => (field.trim_start_matches('+').to_string(), true),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn terms(&self) -> Vec<String> {
        self.params
            .get(TERMS_KEY)
            .map(|v| v.values().to_vec())
            .unwrap_or_default()
    }

    pub fn is_confirmed(&self) -> bool {
        self.params.contains_key(&self.confirmation_key)
            || self
                .payload
                .as_ref()
                .is_some_and(|body| body.get(&self.confirmation_key).is_some())
    }

    /// The JSON body as a field map, without reserved keys.
    pub fn payload_fields(&self) -> Result<Map<String, Value>, ViewError> {
        match &self.payload {
            Some(Value::Object(body)) => Ok(body
                .iter()
                .filter(|(key, _)| !self.is_reserved(key))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect()),
            Some(_) => Err(ViewError::bad_request("request body must be a JSON object")),
            None => Err(ViewError::bad_request("request body is required")),
        }
    }

    /// A bare GET context carrying only the named path parameters.
    pub fn scoped_to<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut derived = Self::new(Method::GET);
        derived.default_limit = self.default_limit;
        derived.confirmation_key = self.confirmation_key.clone();
        for name in names {
            if let Some(value) = self.path_params.get(name) {
                derived.path_params.insert(name.to_string(), value.clone());
            }
        }
        derived
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn default_limit_only_for_reads() {
        assert_eq!(RequestContext::new(Method::GET).limit().unwrap(), Some(20));
        assert_eq!(RequestContext::new(Method::PATCH).limit().unwrap(), None);
        let ctx = RequestContext::from_query(Method::DELETE, Some("_limit=3"));
        assert_eq!(ctx.limit().unwrap(), Some(3));
    }

    #[test]
    fn settings_change_default_limit() {
        let settings = RestSettings {
            default_limit: 7,
            ..RestSettings::default()
        };
        let ctx = RequestContext::new(Method::GET).with_settings(&settings);
        assert_eq!(ctx.limit().unwrap(), Some(7));
    }

    #[test]
    fn bad_limit_is_bad_request() {
        let ctx = RequestContext::from_query(Method::GET, Some("_limit=lots"));
        assert!(matches!(ctx.limit(), Err(ViewError::BadRequest(_))));
    }

    #[test]
    fn reserved_keys_are_not_filters() {
        let ctx = RequestContext::from_query(
            Method::GET,
            Some("_limit=5&_page=2&_sort=-year,title&q=sand%20worm&genre=scifi,fantasy&author=frank&__confirmation"),
        );
        let filters = ctx.filters();
        assert_eq!(filters.len(), 2);
        assert_eq!(
            filters["genre"],
            FilterValue::Many(vec!["scifi".into(), "fantasy".into()])
        );
        assert_eq!(filters["author"], FilterValue::One("frank".into()));
        assert_eq!(
            ctx.sort(),
            vec![("year".to_string(), false), ("title".to_string(), true)]
        );
        assert_eq!(ctx.terms(), vec!["sand worm".to_string()]);
        assert_eq!(ctx.pageable().unwrap(), Pageable::new(Some(5), 2));
        assert!(ctx.is_confirmed());
    }

    #[test]
    fn repeated_keys_form_value_sets() {
        let ctx = RequestContext::from_query(Method::GET, Some("tag=a&tag=b"));
        assert_eq!(ctx.filters()["tag"], FilterValue::Many(vec!["a".into(), "b".into()]));
    }

    #[test]
    fn take_limit_strips_query_and_body() {
        let mut ctx = RequestContext::from_query(Method::PATCH, Some("_limit=2"))
            .with_payload(json!({ "status": "archived", "_limit": 9 }));
        assert_eq!(ctx.take_limit().unwrap(), Some(2));
        assert!(ctx.param(LIMIT_KEY).is_none());
        let fields = ctx.payload_fields().unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["status"], "archived");
    }

    #[test]
    fn body_limit_is_honored() {
        let ctx = RequestContext::new(Method::PUT).with_payload(json!({ "_limit": "4" }));
        assert_eq!(ctx.limit().unwrap(), Some(4));
        assert!(ctx.payload_fields().unwrap().is_empty());
    }

    #[test]
    fn payload_must_be_object() {
        let ctx = RequestContext::new(Method::POST).with_payload(json!([1, 2]));
        assert!(matches!(ctx.payload_fields(), Err(ViewError::BadRequest(_))));
        assert!(RequestContext::new(Method::POST).payload_fields().is_err());
    }

    #[test]
    fn scoped_context_keeps_only_named_params() {
        let ctx = RequestContext::from_query(Method::DELETE, Some("x=1"))
            .with_path_param("authors_id", "a1")
            .with_path_param("books_id", "b2");
        let derived = ctx.scoped_to(["authors_id"]);
        assert_eq!(derived.method(), &Method::GET);
        assert_eq!(derived.path_param("authors_id"), Some("a1"));
        assert!(derived.path_param("books_id").is_none());
        assert!(derived.filters().is_empty());
    }
}
