use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use crate::error::{AppError, Result};
use crate::extract::{ExtractOptions, ExtractStrategy};
use crate::summarizer::SummaryMethod;

/// Body-text budget used by the lean profile.
pub const LEAN_MAX_TEXT_CHARS: usize = 5000;

/// Everything the request handler needs to run the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineConfig {
    pub method: SummaryMethod,
    /// Overrides the method's default sentence budget when set.
    pub max_sentences: Option<usize>,
    pub extract: ExtractOptions,
}

impl PipelineConfig {
    /// Tag-scoped extraction capped at 5000 characters, summarized positionally.
    pub fn lean() -> Self {
        Self {
            method: SummaryMethod::Positional,
            max_sentences: None,
            extract: ExtractOptions {
                strategy: ExtractStrategy::TagScoped,
                max_chars: Some(LEAN_MAX_TEXT_CHARS),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub pipeline: PipelineConfig,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        // Load server configuration with defaults
        let host = var("HOST")?.unwrap_or_else(|| "127.0.0.1".to_string());
        let port = var("PORT")?.unwrap_or_else(|| "3000".to_string());
        let port = port
            .parse::<u16>()
            .map_err(|e| AppError::Config(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host)
            .map_err(|e| AppError::Config(format!("Invalid host address: {}", e)))?;

        let method = var("SUMMARY_METHOD")?
            .map(|value| value.parse::<SummaryMethod>())
            .transpose()?
            .unwrap_or_default();
        let max_sentences = var("SUMMARY_MAX_SENTENCES")?
            .map(|value| parse_positive("SUMMARY_MAX_SENTENCES", &value))
            .transpose()?;
        let strategy = var("EXTRACT_STRATEGY")?
            .map(|value| value.parse::<ExtractStrategy>())
            .transpose()?
            .unwrap_or_default();
        let max_chars = var("MAX_TEXT_CHARS")?
            .map(|value| parse_positive("MAX_TEXT_CHARS", &value))
            .transpose()?;

        Ok(Config {
            server_addr: SocketAddr::new(ip, port),
            pipeline: PipelineConfig {
                method,
                max_sentences,
                extract: ExtractOptions { strategy, max_chars },
            },
        })
    }
}

/// Unset variables are `None`; set but non-unicode ones are an error.
fn var(key: &str) -> Result<Option<String>> {
    match env::var(key) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(AppError::from(err)),
    }
}

fn parse_positive(key: &str, value: &str) -> Result<usize> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(AppError::Config(format!("{} must be a positive integer, got {:?}", key, value))),
    }
}
