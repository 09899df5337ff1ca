use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::Method,
    response::{IntoResponse, Response},
    routing::{any, get},
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::AppState;
use crate::error::AppError;
use crate::handler;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/summarize", any(summarize_handler))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Turns the HTTP request into an invocation event and runs the synchronous
/// handler on the blocking pool.
async fn summarize_handler(
    State(state): State<AppState>,
    method: Method,
    query: Option<Query<HashMap<String, String>>>,
    body: Bytes,
) -> Response {
    let query = query.map(|Query(params)| params).unwrap_or_default();
    let event = json!({
        "httpMethod": method.as_str(),
        "body": String::from_utf8_lossy(&body),
        "queryStringParameters": query,
    });

    let start_time = Instant::now();
    let result = tokio::task::spawn_blocking(move || {
        handler::handle(&event, state.source.as_ref(), &state.config.pipeline)
    })
    .await;
    info!(%method, elapsed = ?start_time.elapsed(), "request processed");

    match result {
        Ok(envelope) => envelope.into_response(),
        Err(e) => {
            error!(error = %e, "handler task failed");
            AppError::Internal(e.to_string()).into_response()
        }
    }
}
