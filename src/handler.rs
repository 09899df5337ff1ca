//! The synchronous request/response entry point.
//!
//! [`handle`] takes one invocation event (`{httpMethod, body,
//! queryStringParameters}` or the JSON payload itself), runs
//! fetch → extract → segment → summarize, and always hands back a
//! [`ResponseEnvelope`] with a JSON body, including when the pipeline panics.

use serde_json::Value;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error, info, warn};

use crate::api::models::{RequestEnvelope, ResponseEnvelope, SummarizeRequest, SummaryResult};
use crate::api::response;
use crate::config::PipelineConfig;
use crate::error::{AppError, Result};
use crate::extract::extract;
use crate::scraper::PageSource;
use crate::summarizer::summarize;

pub fn handle(event: &Value, source: &dyn PageSource, settings: &PipelineConfig) -> ResponseEnvelope {
    let envelope = RequestEnvelope::from_event(event);
    if envelope.is_preflight() {
        return response::preflight();
    }

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        process_request(event, &envelope, source, settings)
    }));

    match outcome {
        Ok(Ok(result)) => response::success(&result),
        Ok(Err(err)) => {
            warn!(status = err.status_code(), error = %err, "request failed");
            response::error(err.status_code(), err.to_string())
        }
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!(%message, "pipeline panicked");
            response::error(500, message)
        }
    }
}

fn process_request(
    event: &Value,
    envelope: &RequestEnvelope,
    source: &dyn PageSource,
    settings: &PipelineConfig,
) -> Result<SummaryResult> {
    let request = parse_payload(event)?;

    let url = non_blank(request.url.as_deref())
        .or_else(|| non_blank(envelope.query_url()))
        .ok_or(AppError::MissingUrl)?;

    let method = request.method.unwrap_or(settings.method);
    let max_sentences = match request.max_sentences {
        Some(0) => {
            return Err(AppError::InvalidRequest(
                "maxSentences must be at least 1".to_string(),
            ));
        }
        Some(n) => n,
        None => settings
            .max_sentences
            .unwrap_or_else(|| method.default_max_sentences()),
    };

    info!(%url, method = method.as_str(), max_sentences, "summarizing page");
    let html = source.fetch(&url)?;

    let article = extract(&html, &settings.extract);
    debug!(title = %article.title, chars = article.body_text.len(), "extracted article");

    let summary = summarize(method, &article.body_text, max_sentences);
    info!(%url, summary_chars = summary.len(), "summary ready");

    Ok(SummaryResult {
        title: article.title,
        summary,
        url,
        method: Some(method.as_str().to_string()),
    })
}

/// A string `body` is decoded as JSON, an object `body` is taken as is, and an
/// event without `body` is its own payload. Empty bodies count as `{}`.
fn parse_payload(event: &Value) -> Result<SummarizeRequest> {
    let payload = match event.get("body") {
        None => event.clone(),
        Some(Value::Null) => Value::Object(Default::default()),
        Some(Value::String(raw)) if raw.trim().is_empty() => Value::Object(Default::default()),
        Some(Value::String(raw)) => serde_json::from_str(raw).map_err(|e| {
            debug!(error = %e, "body is not JSON");
            AppError::InvalidJson
        })?,
        Some(other) => other.clone(),
    };

    serde_json::from_value(payload).map_err(|e| {
        debug!(error = %e, "body does not match request schema");
        AppError::InvalidJson
    })
}

fn non_blank(url: Option<&str>) -> Option<String> {
    url.map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Internal server error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_body_is_decoded() {
        let request = parse_payload(&json!({"body": "{\"url\": \"https://a.b\"}"})).unwrap();
        assert_eq!(request.url.as_deref(), Some("https://a.b"));
    }

    #[test]
    fn object_body_and_bare_payload_are_accepted() {
        let wrapped = parse_payload(&json!({"body": {"url": "x", "maxSentences": 2}})).unwrap();
        assert_eq!(wrapped.max_sentences, Some(2));

        let bare = parse_payload(&json!({"url": "y"})).unwrap();
        assert_eq!(bare.url.as_deref(), Some("y"));
    }

    #[test]
    fn empty_or_null_body_is_an_empty_object() {
        assert!(parse_payload(&json!({"body": ""})).unwrap().url.is_none());
        assert!(parse_payload(&json!({"body": null})).unwrap().url.is_none());
    }

    #[test]
    fn schema_mismatches_are_invalid_json() {
        assert!(matches!(parse_payload(&json!({"body": "[1, 2]"})), Err(AppError::InvalidJson)));
        assert!(matches!(parse_payload(&json!({"url": 7})), Err(AppError::InvalidJson)));
        assert!(matches!(parse_payload(&json!("just text")), Err(AppError::InvalidJson)));
    }

    #[test]
    fn blank_urls_are_absent() {
        assert_eq!(non_blank(Some("  ")), None);
        assert_eq!(non_blank(Some(" https://a.b ")), Some("https://a.b".to_string()));
    }

    #[test]
    fn panic_payloads_become_messages() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&17_u8), "Internal server error");
    }
}
