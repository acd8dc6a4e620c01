use nestr_core::http::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use nestr_core::http::{Body, Bytes, Method, Router, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tower::util::ServiceExt;

use crate::path::resolve_path;

/// In-process HTTP client around an axum `Router`.
///
/// Requests go through `tower::ServiceExt::oneshot`; nothing binds a port.
///
/// ```ignore
/// let app = TestApp::new(dispatcher.into_router());
/// app.get("/authors/a1/books").query("_limit", "5").send().await
///     .assert_ok()
///     .assert_json_path("count", 2);
/// ```
#[derive(Clone)]
pub struct TestApp {
    router: Router,
}

impl TestApp {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    pub fn get(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::GET, path)
    }

    pub fn post(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::POST, path)
    }

    pub fn put(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::PUT, path)
    }

    pub fn patch(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::PATCH, path)
    }

    pub fn delete(&self, path: &str) -> TestRequest<'_> {
        self.request(Method::DELETE, path)
    }

    pub fn request(&self, method: Method, path: &str) -> TestRequest<'_> {
        TestRequest {
            app: self,
            method,
            path: path.to_string(),
            query: form_urlencoded::Serializer::new(String::new()),
            headers: HeaderMap::new(),
            body: None,
        }
    }
}

/// Builder for one request.
pub struct TestRequest<'a> {
    app: &'a TestApp,
    method: Method,
    path: String,
    query: form_urlencoded::Serializer<'static, String>,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl TestRequest<'_> {
    /// Append a query parameter. Repeated keys are kept.
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.append_pair(key, value);
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        let name: HeaderName = name.parse().expect("invalid header name");
        let value = HeaderValue::from_str(value).expect("invalid header value");
        self.headers.insert(name, value);
        self
    }

    /// JSON body; also sets `Content-Type: application/json`.
    pub fn json(mut self, body: &impl Serialize) -> Self {
        self.body = Some(serde_json::to_vec(body).expect("body must serialize"));
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub async fn send(mut self) -> TestResponse {
        let query = self.query.finish();
        let uri = match (query.is_empty(), self.path.contains('?')) {
            (true, _) => self.path.clone(),
            (false, true) => format!("{}&{query}", self.path),
            (false, false) => format!("{}?{query}", self.path),
        };

        let mut builder = nestr_core::http::Request::builder()
            .method(self.method)
            .uri(uri);
        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }
        let body = self.body.map(Body::from).unwrap_or_else(Body::empty);
        let request = builder.body(body).expect("failed to build request");

        let response = self
            .app
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("failed to read response body")
            .to_bytes();

        TestResponse {
            status,
            headers,
            body,
        }
    }
}

/// A collected response with chainable assertions.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn assert_ok(self) -> Self {
        self.assert_status(StatusCode::OK)
    }

    pub fn assert_created(self) -> Self {
        self.assert_status(StatusCode::CREATED)
    }

    pub fn assert_bad_request(self) -> Self {
        self.assert_status(StatusCode::BAD_REQUEST)
    }

    pub fn assert_not_found(self) -> Self {
        self.assert_status(StatusCode::NOT_FOUND)
    }

    pub fn assert_method_not_allowed(self) -> Self {
        self.assert_status(StatusCode::METHOD_NOT_ALLOWED)
    }

    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.status,
            expected,
            "Expected {expected}, got {}\nBody: {}",
            self.status,
            self.text()
        );
        self
    }

    pub fn assert_json_path(self, path: &str, expected: impl Into<Value>) -> Self {
        let root: Value = self.json();
        let actual = resolve_path(&root, path);
        let expected = expected.into();
        assert_eq!(
            actual, expected,
            "JSON path \"{path}\" assertion failed\n  Expected: {expected}\n  Actual:   {actual}\n  Body: {root}",
        );
        self
    }

    pub fn assert_header(self, name: &str, expected: &str) -> Self {
        assert_eq!(
            self.header(name),
            Some(expected),
            "header `{name}` mismatch\n  Headers: {:?}",
            self.headers
        );
        self
    }

    pub fn json_path<T: DeserializeOwned>(&self, path: &str) -> T {
        let root: Value = self.json();
        let value = resolve_path(&root, path);
        serde_json::from_value(value.clone())
            .unwrap_or_else(|e| panic!("JSON path \"{path}\": {e}\n  Value: {value}\n  Body: {root}"))
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body)
            .unwrap_or_else(|e| panic!("Failed to parse JSON: {e}\nBody: {}", self.text()))
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }
}
