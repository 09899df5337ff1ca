pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod handler;
pub mod scraper;
pub mod summarizer;

use std::sync::Arc;
use crate::config::Config;
use crate::scraper::PageSource;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub source: Arc<dyn PageSource>,
}
