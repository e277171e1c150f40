//! Playtomic REST client: tournaments (v2) and academy classes (v1).

use async_trait::async_trait;
use courtwatch_core::config::{ApiConfig, ClassFilter, TournamentFilter};
use courtwatch_core::error::{CourtWatchError, Result};
use courtwatch_core::traits::Source;
use courtwatch_core::types::{Class, Tournament};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::params::{ClassQuery, TournamentQuery};

const DEFAULT_BACKOFF: Duration = Duration::from_millis(250);
const MAX_BACKOFF: Duration = Duration::from_secs(4);

pub struct PlaytomicClient {
    http: reqwest::Client,
    base_url_v1: String,
    base_url_v2: String,
    max_retries: u32,
    backoff: Duration,
}

impl PlaytomicClient {
    /// Build a client; `timeout` bounds each individual request attempt.
    pub fn new(api: &ApiConfig, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(api.user_agent.as_str())
            .build()
            .map_err(|e| CourtWatchError::Http(format!("building HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url_v1: api.base_url_v1.trim_end_matches('/').to_string(),
            base_url_v2: api.base_url_v2.trim_end_matches('/').to_string(),
            max_retries: api.max_retries,
            backoff: DEFAULT_BACKOFF,
        })
    }

    /// Override the initial retry delay (doubles per attempt).
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub async fn get_tournaments(&self, query: &TournamentQuery) -> Result<Vec<Tournament>> {
        let url = format!("{}/tournaments", self.base_url_v2);
        self.get_json(&url, &query.to_query())
            .await
            .map_err(|e| prefix(e, "fetching tournaments"))
    }

    pub async fn get_classes(&self, query: &ClassQuery) -> Result<Vec<Class>> {
        let url = format!("{}/classes", self.base_url_v1);
        self.get_json(&url, &query.to_query())
            .await
            .map_err(|e| prefix(e, "fetching classes"))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&'static str, String)]) -> Result<T> {
        let mut attempt: u32 = 0;
        loop {
            tracing::debug!(url, attempt, "GET");
            let err = match self.http.get(url).query(query).send().await {
                Ok(resp) if resp.status().is_success() => {
                    return resp
                        .json::<T>()
                        .await
                        .map_err(|e| CourtWatchError::Http(format!("decoding response from {url}: {e}")));
                }
                Ok(resp) => {
                    let status = resp.status();
                    let text = resp.text().await.unwrap_or_default();
                    let err = CourtWatchError::Api(format!("{status}: {}", truncate(&text, 200)));
                    if !is_retryable(status) {
                        return Err(err);
                    }
                    err
                }
                Err(e) => CourtWatchError::Http(format!("request to {url} failed: {e}")),
            };

            if attempt >= self.max_retries {
                return Err(err);
            }
            let delay = self.delay_for(attempt);
            tracing::warn!(url, attempt = attempt + 1, error = %err, "Retrying in {}ms", delay.as_millis());
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff
            .checked_mul(2u32.saturating_pow(attempt))
            .map_or(MAX_BACKOFF, |d| d.min(MAX_BACKOFF))
    }
}

#[async_trait]
impl Source<Tournament> for PlaytomicClient {
    async fn fetch(&self, rule: &TournamentFilter) -> Result<Vec<Tournament>> {
        self.get_tournaments(&TournamentQuery::from(rule)).await
    }
}

#[async_trait]
impl Source<Class> for PlaytomicClient {
    async fn fetch(&self, rule: &ClassFilter) -> Result<Vec<Class>> {
        self.get_classes(&ClassQuery::from(rule)).await
    }
}

fn is_retryable(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}

fn prefix(err: CourtWatchError, context: &str) -> CourtWatchError {
    match err {
        CourtWatchError::Api(msg) => CourtWatchError::Api(format!("{context}: {msg}")),
        CourtWatchError::Http(msg) => CourtWatchError::Http(format!("{context}: {msg}")),
        other => other,
    }
}
