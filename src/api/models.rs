use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::summarizer::SummaryMethod;

/// The parts of an invocation event the handler looks at besides the body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestEnvelope {
    pub http_method: Option<String>,
    pub query_url: Option<String>,
}

impl RequestEnvelope {
    /// Each field is read on its own; one that is missing or of the wrong type
    /// is treated as absent without affecting the others.
    pub fn from_event(event: &Value) -> Self {
        let http_method = event
            .get("httpMethod")
            .and_then(Value::as_str)
            .map(str::to_string);
        let query_url = event
            .get("queryStringParameters")
            .and_then(|params| params.get("url"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Self { http_method, query_url }
    }

    pub fn is_preflight(&self) -> bool {
        self.http_method
            .as_deref()
            .is_some_and(|method| method.eq_ignore_ascii_case("OPTIONS"))
    }

    pub fn query_url(&self) -> Option<&str> {
        self.query_url.as_deref()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizeRequest {
    pub url: Option<String>,
    pub method: Option<SummaryMethod>,
    pub max_sentences: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryResult {
    pub title: String,
    pub summary: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    /// JSON-encoded response body.
    pub body: String,
}

impl ResponseEnvelope {
    pub fn json_body(&self) -> serde_json::Result<Value> {
        serde_json::from_str(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn preflight_is_case_insensitive() {
        let envelope = RequestEnvelope::from_event(&json!({"httpMethod": "options"}));
        assert!(envelope.is_preflight());
        assert!(!RequestEnvelope::from_event(&json!({"httpMethod": "POST"})).is_preflight());
    }

    #[test]
    fn non_envelope_events_fall_back_to_defaults() {
        let envelope = RequestEnvelope::from_event(&json!({"httpMethod": 42, "url": "x"}));
        assert_eq!(envelope.http_method, None);
        assert_eq!(envelope.query_url(), None);
    }

    #[test]
    fn badly_typed_query_map_keeps_the_method() {
        let envelope = RequestEnvelope::from_event(&json!({
            "httpMethod": "OPTIONS",
            "queryStringParameters": {"tags": null, "url": 3}
        }));
        assert!(envelope.is_preflight());
        assert_eq!(envelope.query_url(), None);

        let envelope = RequestEnvelope::from_event(&json!({
            "httpMethod": "GET",
            "queryStringParameters": "url=https://example.com"
        }));
        assert_eq!(envelope.http_method.as_deref(), Some("GET"));
        assert_eq!(envelope.query_url(), None);
    }

    #[test]
    fn query_url_is_read_from_parameters() {
        let envelope = RequestEnvelope::from_event(&json!({
            "httpMethod": "GET",
            "queryStringParameters": {"url": "https://example.com"}
        }));
        assert_eq!(envelope.query_url(), Some("https://example.com"));
    }

    #[test]
    fn request_rejects_unknown_method() {
        let parsed = serde_json::from_value::<SummarizeRequest>(json!({"url": "x", "method": "llm"}));
        assert!(parsed.is_err());
    }

    #[test]
    fn envelope_serializes_camel_case() {
        let envelope = ResponseEnvelope {
            status_code: 200,
            headers: BTreeMap::new(),
            body: "{}".to_string(),
        };
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["statusCode"], 200);
    }
}
