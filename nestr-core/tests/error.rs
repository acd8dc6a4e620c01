use http_body_util::BodyExt;
use nestr_core::http::{IntoResponse, StatusCode};
use nestr_core::HttpError;

async fn error_parts(err: HttpError) -> (StatusCode, serde_json::Value) {
    let resp = err.into_response();
    let status = resp.status();
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_status() {
    let (status, body) = error_parts(HttpError::NotFound("Book(id=b3) resource not found".into())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Book(id=b3) resource not found");
}

#[tokio::test]
async fn method_not_allowed_status() {
    let (status, body) = error_parts(HttpError::MethodNotAllowed("delete_many".into())).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "delete_many");
}

#[tokio::test]
async fn bad_request_status() {
    let (status, body) = error_parts(HttpError::BadRequest("invalid input".into())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid input");
}

#[tokio::test]
async fn internal_status() {
    let (status, body) = error_parts(HttpError::Internal("store unavailable".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "store unavailable");
}

#[test]
fn display_prefixes_variant() {
    assert_eq!(
        HttpError::MethodNotAllowed("update".into()).to_string(),
        "Method Not Allowed: update"
    );
    assert_eq!(HttpError::NotFound("x".into()).to_string(), "Not Found: x");
}

#[test]
fn json_errors_become_bad_request() {
    let err: HttpError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
    assert_eq!(err.status(), StatusCode::BAD_REQUEST);
}
