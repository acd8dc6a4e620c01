/// Error raised when a query parameter cannot be interpreted.
#[derive(Debug)]
pub struct ParamError {
    pub message: String,
}

impl ParamError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ParamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParamError {}

/// Parse a query string into key-value pairs, preserving order and repeats.
pub fn parse_query_string(query: Option<&str>) -> Vec<(String, String)> {
    match query {
        Some(q) => form_urlencoded::parse(q.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect(),
        None => Vec::new(),
    }
}

/// Parse a non-negative integer parameter, naming the key in the error.
pub fn parse_u64_param(key: &str, raw: &str) -> Result<u64, ParamError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| ParamError::new(format!("`{key}` must be a non-negative integer, got `{raw}`")))
}
