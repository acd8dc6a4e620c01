//! HTTP types re-exported from axum so downstream crates depend on a single
//! HTTP stack through `nestr-core`.

pub use axum::body::{Body, Bytes};
pub use axum::extract::{Path, Query, RawQuery, State};
pub use axum::routing;
pub use axum::{serve, Json, Router};
pub use http::header::{self, HeaderMap, HeaderValue, ALLOW, CONTENT_TYPE, LOCATION};
pub use http::{Method, Request, Uri};

pub mod response {
    pub use axum::response::{IntoResponse, Response};
}

pub use self::response::{IntoResponse, Response};
pub use http::StatusCode;
