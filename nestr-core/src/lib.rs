pub mod config;
pub mod error;
pub mod http;
pub mod layers;
pub mod params;

pub use config::{ConfigError, ConfigProperties, MissingKey, NestrConfig};
pub use error::HttpError;
pub use layers::{default_trace, init_tracing};
pub use params::{parse_query_string, parse_u64_param, ParamError};

pub mod prelude {
    //! Re-exports of the most commonly used core types.
    pub use crate::http::{IntoResponse, Json, Method, Response, Router, StatusCode};
    pub use crate::{ConfigProperties, HttpError, NestrConfig};
}
