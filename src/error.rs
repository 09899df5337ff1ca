use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::api::response;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid JSON body")]
    InvalidJson,

    #[error("No URL provided")]
    MissingUrl,

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Error fetching URL: {0}")]
    Fetch(String),

    #[error("{0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn status_code(&self) -> u16 {
        match self {
            AppError::InvalidJson | AppError::MissingUrl | AppError::InvalidRequest(_) => 400,
            AppError::Fetch(_) | AppError::Internal(_) | AppError::Config(_) => 500,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        response::error(self.status_code(), self.to_string()).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Fetch(err.to_string())
    }
}

impl From<std::env::VarError> for AppError {
    fn from(err: std::env::VarError) -> Self {
        AppError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
