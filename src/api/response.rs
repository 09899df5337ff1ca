use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;

use crate::api::models::ResponseEnvelope;
use crate::error::ErrorResponse;

pub const ALLOW_HEADERS: &str = "Content-Type,Authorization,X-Requested-With";
pub const ALLOW_METHODS: &str = "OPTIONS,POST,GET";

fn base_headers() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("Content-Type".to_string(), "application/json".to_string()),
        ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
    ])
}

fn cors_headers() -> BTreeMap<String, String> {
    let mut headers = base_headers();
    headers.insert("Access-Control-Allow-Headers".to_string(), ALLOW_HEADERS.to_string());
    headers.insert("Access-Control-Allow-Methods".to_string(), ALLOW_METHODS.to_string());
    headers
}

fn to_body<T: Serialize>(data: &T) -> String {
    serde_json::to_string(data).unwrap_or_else(|e| json!({ "error": e.to_string() }).to_string())
}

pub fn preflight() -> ResponseEnvelope {
    ResponseEnvelope {
        status_code: StatusCode::OK.as_u16(),
        headers: cors_headers(),
        body: json!({ "message": "CORS OK" }).to_string(),
    }
}

pub fn success<T: Serialize>(data: &T) -> ResponseEnvelope {
    ResponseEnvelope {
        status_code: StatusCode::OK.as_u16(),
        headers: cors_headers(),
        body: to_body(data),
    }
}

pub fn error(status: u16, message: String) -> ResponseEnvelope {
    ResponseEnvelope {
        status_code: status,
        headers: base_headers(),
        body: to_body(&ErrorResponse { error: message }),
    }
}

impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, self.body).into_response();

        let headers = response.headers_mut();
        for (name, value) in self.headers {
            if let (Ok(name), Ok(value)) = (HeaderName::try_from(name), HeaderValue::try_from(value)) {
                headers.insert(name, value);
            }
        }

        response
    }
}
