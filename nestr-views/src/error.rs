use nestr_core::http::response::{IntoResponse, Response};
use nestr_core::{ConfigError, HttpError, ParamError};
use nestr_data::DataError;

use crate::operation::Operation;

/// Request-time failure of a view operation.
#[derive(Debug)]
pub enum ViewError {
    /// The entity, or one of its ancestors, does not exist under the
    /// request's restriction.
    NotFound(String),
    /// The operation is not permitted on this resource.
    MethodNotAllowed {
        resource: String,
        operation: Operation,
    },
    /// The HTTP verb maps to no operation at all.
    UnsupportedMethod {
        resource: String,
        method: String,
    },
    BadRequest(String),
    Data(DataError),
}

impl ViewError {
    pub fn not_found(model: &str, id: &str) -> Self {
        ViewError::NotFound(format!("{model}(id={id}) resource not found"))
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        ViewError::BadRequest(message.into())
    }

    pub fn is_method_not_allowed(&self) -> bool {
        matches!(
            self,
            ViewError::MethodNotAllowed { .. } | ViewError::UnsupportedMethod { .. }
        )
    }
}

impl std::fmt::Display for ViewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ViewError::NotFound(msg) => write!(f, "{msg}"),
            ViewError::MethodNotAllowed {
                resource,
                operation,
            } => write!(f, "`{operation}` is not allowed on {resource}"),
            ViewError::UnsupportedMethod { resource, method } => {
                write!(f, "{method} is not supported on {resource}")
            }
            ViewError::BadRequest(msg) => write!(f, "{msg}"),
            ViewError::Data(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for ViewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewError::Data(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DataError> for ViewError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::NotFound(msg) => ViewError::NotFound(msg),
            other => ViewError::Data(other),
        }
    }
}

impl From<ParamError> for ViewError {
    fn from(err: ParamError) -> Self {
        ViewError::BadRequest(err.message)
    }
}

impl From<serde_json::Error> for ViewError {
    fn from(err: serde_json::Error) -> Self {
        ViewError::BadRequest(format!("malformed JSON body: {err}"))
    }
}

impl From<ViewError> for HttpError {
    fn from(err: ViewError) -> Self {
        match err {
            ViewError::NotFound(msg) => HttpError::NotFound(msg),
            err @ (ViewError::MethodNotAllowed { .. } | ViewError::UnsupportedMethod { .. }) => {
                HttpError::MethodNotAllowed(err.to_string())
            }
            ViewError::BadRequest(msg) => HttpError::BadRequest(msg),
            ViewError::Data(err) => err.into(),
        }
    }
}

impl IntoResponse for ViewError {
    fn into_response(self) -> Response {
        HttpError::from(self).into_response()
    }
}

/// Configuration-time failure while building the resource tree or the
/// dispatcher.
#[derive(Debug)]
pub enum TreeError {
    DuplicateKey(String),
    UnknownParent {
        resource: String,
        parent: String,
    },
    /// The parent chain loops back on itself.
    Cycle(String),
    TooDeep {
        resource: String,
        depth: usize,
        max: usize,
    },
    /// Only collection resources can carry children.
    InvalidNesting {
        resource: String,
        reason: String,
    },
    /// Two resources on one path share an id parameter name.
    DuplicateParameter {
        resource: String,
        parameter: String,
    },
    /// A resource reads from the search index but none is configured.
    MissingIndex(String),
    Parse(String),
    Config(ConfigError),
}

impl std::fmt::Display for TreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeError::DuplicateKey(key) => write!(f, "resource `{key}` is declared twice"),
            TreeError::UnknownParent { resource, parent } => {
                write!(f, "resource `{resource}` names unknown parent `{parent}`")
            }
            TreeError::Cycle(key) => write!(f, "resource `{key}` is its own ancestor"),
            TreeError::TooDeep {
                resource,
                depth,
                max,
            } => write!(
                f,
                "resource `{resource}` is nested {depth} levels deep, the limit is {max}"
            ),
            TreeError::InvalidNesting { resource, reason } => {
                write!(f, "resource `{resource}`: {reason}")
            }
            TreeError::DuplicateParameter {
                resource,
                parameter,
            } => write!(
                f,
                "resource `{resource}` reuses path parameter `{parameter}` of an ancestor"
            ),
            TreeError::MissingIndex(key) => write!(
                f,
                "resource `{key}` reads from the search index but no index is configured"
            ),
            TreeError::Parse(msg) => write!(f, "invalid resource description: {msg}"),
            TreeError::Config(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for TreeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TreeError::Config(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ConfigError> for TreeError {
    fn from(err: ConfigError) -> Self {
        TreeError::Config(err)
    }
}

impl From<serde_yaml::Error> for TreeError {
    fn from(err: serde_yaml::Error) -> Self {
        TreeError::Parse(err.to_string())
    }
}
