/// Errors that can occur in the data layer.
#[derive(Debug)]
pub enum DataError {
    NotFound(String),
    /// An entity with the same id already exists.
    Conflict(String),
    /// The request cannot be applied to the stored data (bad payload shape, wrong type).
    Invalid(String),
    /// The backend itself failed.
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

pub type DataResult<T> = Result<T, DataError>;

impl DataError {
    /// Wrap any backend-specific error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DataError::Backend(Box::new(err))
    }

    pub fn not_found(model: &str, id: &str) -> Self {
        DataError::NotFound(format!("{model}(id={id}) resource not found"))
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::NotFound(msg) => write!(f, "Not found: {msg}"),
            DataError::Conflict(msg) => write!(f, "Conflict: {msg}"),
            DataError::Invalid(msg) => write!(f, "Invalid data: {msg}"),
            DataError::Backend(err) => write!(f, "Backend error: {err}"),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Backend(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<DataError> for nestr_core::HttpError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::NotFound(msg) => nestr_core::HttpError::NotFound(msg),
            DataError::Conflict(msg) | DataError::Invalid(msg) => {
                nestr_core::HttpError::BadRequest(msg)
            }
            DataError::Backend(e) => nestr_core::HttpError::Internal(e.to_string()),
        }
    }
}
