use nestr_core::http::header::{HeaderValue, LOCATION};
use nestr_core::http::response::{IntoResponse, Response};
use nestr_core::http::{Json, StatusCode};
use nestr_data::{Document, Page};
use serde_json::{json, Value};

/// Successful result of a view operation.
#[derive(Debug, Clone)]
pub enum ViewResponse {
    /// A single entity or raw attribute value; `null` when absent.
    Item(Value),
    Collection(Page<Document>),
    Created {
        location: Option<String>,
        resource: Value,
    },
    Status {
        message: String,
        count: Option<u64>,
        location: Option<String>,
    },
    /// Candidates of an unconfirmed `delete_many`. Nothing was removed.
    PendingConfirmation {
        items: Vec<Document>,
        count: u64,
        confirmation_key: String,
    },
}

impl ViewResponse {
    pub fn status(message: impl Into<String>) -> Self {
        ViewResponse::Status {
            message: message.into(),
            count: None,
            location: None,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ViewResponse::Created { .. } => StatusCode::CREATED,
            _ => StatusCode::OK,
        }
    }

    /// JSON body sent to the client.
    pub fn body(&self) -> Value {
        match self {
            ViewResponse::Item(value) => value.clone(),
            ViewResponse::Collection(page) => json!({
                "data": page.content,
                "count": page.content.len(),
                "total": page.total_elements,
                "page": page.page,
                "pages": page.total_pages(),
            }),
            ViewResponse::Created { location, resource } => {
                let mut body = json!({ "resource": resource });
                if let Some(location) = location {
                    body["location"] = json!(location);
                }
                body
            }
            ViewResponse::Status {
                message,
                count,
                location,
            } => {
                let mut body = json!({ "message": message });
                if let Some(count) = count {
                    body["count"] = json!(count);
                }
                if let Some(location) = location {
                    body["location"] = json!(location);
                }
                body
            }
            ViewResponse::PendingConfirmation {
                items,
                count,
                confirmation_key,
            } => json!({
                "pending_confirmation": true,
                "message": format!("Repeat the request with `{confirmation_key}` to delete {count} object(s)"),
                "count": count,
                "data": items,
            }),
        }
    }
}

impl IntoResponse for ViewResponse {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut response = (status, Json(self.body())).into_response();
        if let ViewResponse::Created {
            location: Some(location),
            ..
        } = &self
        {
            if let Ok(value) = HeaderValue::from_str(location) {
                response.headers_mut().insert(LOCATION, value);
            }
        }
        response
    }
}
