use once_cell::sync::Lazy;
use reqwest::blocking::{Client, ClientBuilder};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::Result;

pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; NewsSummarizerBot/1.0)";
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

// Create a static client to reuse connections
static CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .timeout(FETCH_TIMEOUT)
        .user_agent(USER_AGENT)
        .build()
        .expect("Failed to build HTTP client")
});

/// Anything that can hand back the raw HTML for a URL.
pub trait PageSource: Send + Sync {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Fetches pages over HTTP(S) with the shared client.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpSource;

impl PageSource for HttpSource {
    fn fetch(&self, url: &str) -> Result<String> {
        fetch_html(url)
    }
}

/// One GET, no retries. Timeouts, transport failures and non-2xx statuses all
/// come back as `AppError::Fetch`.
pub fn fetch_html(url: &str) -> Result<String> {
    debug!(%url, "fetching page");
    let html = CLIENT
        .get(url)
        .send()
        .and_then(|response| response.error_for_status())
        .and_then(|response| response.text())
        .inspect_err(|e| warn!(%url, error = %e, "fetch failed"))?;
    debug!(%url, bytes = html.len(), "fetched page");
    Ok(html)
}
