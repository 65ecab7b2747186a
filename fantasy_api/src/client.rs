//! HTTP client for the Fantasy Premier League public API.

use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    backoff::RetryPolicy,
    types::{BootstrapStatic, ElementSummary, Fixture, Picks},
    Error,
};

/// Production API root. Every endpoint path is appended to it.
pub const DEFAULT_BASE_URL: &str = "https://fantasy.premierleague.com/api";

const USER_AGENT: &str = concat!("betterfantasy/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the read-only FPL endpoints.
///
/// Non-success statuses and transport failures are retried according to the
/// client's [`RetryPolicy`]; decode failures are not. One `reqwest::Client`
/// is shared across calls, so cloning this client is cheap and keeps the
/// connection pool.
#[derive(Clone)]
pub struct Client {
    /// Base URL for the API. Defaults to [`DEFAULT_BASE_URL`].
    base_api_url: String,
    http: reqwest::Client,
    retry: RetryPolicy,
}

impl Client {
    /// Creates a new client pointing at the production API with the default retry budget.
    pub fn new() -> Result<Self, Error> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::RequestFailed(e.to_string())
            })?;
        Ok(Self {
            base_api_url: base_url.trim_end_matches('/').to_string(),
            http,
            retry: RetryPolicy::default(),
        })
    }

    /// Replaces the retry policy used by every request from this client.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    fn get_url(&self, path: &str) -> Result<Url, Error> {
        Url::parse(format!("{}{}", &self.base_api_url, path).as_str()).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::InvalidUrl(format!("{}{}: {}", self.base_api_url, path, e))
        })
    }

    async fn attempt(&self, url: &Url) -> Result<Vec<u8>, Error> {
        let resp = self
            .http
            .get(url.clone())
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::RequestFailed(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| Error::RequestFailed(e.to_string()))?;
        Ok(body.to_vec())
    }

    /// Reads the raw body at `path`, retrying until the budget is spent.
    ///
    /// Each attempt is exactly one round trip; nothing is cached between calls.
    pub async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, Error> {
        let url = self.get_url(path)?;
        let mut retry = 0u32;
        loop {
            match self.attempt(&url).await {
                Ok(body) => return Ok(body),
                Err(err) => {
                    if retry >= self.retry.retries || !err.is_retryable() {
                        tracing::error!("GET {} failed after {} retries: {}", path, retry, err);
                        return Err(err);
                    }
                    retry += 1;
                    let delay = self.retry.delay_for_retry(retry);
                    tracing::warn!(
                        "GET {} failed ({}), retry {}/{} in {:.1}s",
                        path,
                        err,
                        retry,
                        self.retry.retries,
                        delay.as_secs_f64()
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
    }

    async fn get<T>(&self, path: &str) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let body = self.get_bytes(path).await?;
        serde_json::from_slice::<T>(&body).map_err(|e| {
            let snippet = truncate_body(&String::from_utf8_lossy(&body));
            tracing::error!("Failed to parse {}: {} | body: {}", path, e, snippet);
            Error::Decode {
                endpoint: path.to_string(),
                message: e.to_string(),
            }
        })
    }

    /// Fetches the bulk payload: teams, events, element types and elements.
    pub async fn get_bootstrap_static(&self) -> Result<BootstrapStatic, Error> {
        self.get::<BootstrapStatic>("/bootstrap-static/").await
    }

    /// Fetches every fixture of the season, scheduled or not.
    pub async fn get_fixtures(&self) -> Result<Vec<Fixture>, Error> {
        self.get::<Vec<Fixture>>("/fixtures/").await
    }

    /// Fetches the match-by-match history of one player.
    pub async fn get_element_summary(&self, element_id: i64) -> Result<ElementSummary, Error> {
        self.get::<ElementSummary>(format!("/element-summary/{}/", element_id).as_str())
            .await
    }

    /// Fetches a manager's squad for one gameweek.
    pub async fn get_manager_picks(&self, manager_id: i64, event_id: i64) -> Result<Picks, Error> {
        self.get::<Picks>(format!("/entry/{}/event/{}/picks/", manager_id, event_id).as_str())
            .await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}
