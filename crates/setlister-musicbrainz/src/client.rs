// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{MusicBrainzError, Result};
use crate::models::{RecordingSearchResult, SearchQuery, SearchResponse};
use crate::rate_limiter::RateLimiter;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, trace, warn};
use url::Url;

const MUSICBRAINZ_API_BASE: &str = "https://musicbrainz.org/ws/2";
const USER_AGENT: &str = concat!(
    "Setlister/",
    env!("CARGO_PKG_VERSION"),
    " ( https://github.com/setlister/setlister )"
);

/// MusicBrainz web service client.
///
/// Requests are spaced by a shared [`RateLimiter`]; a `503 Service
/// Unavailable` (the service's throttling answer) is retried a bounded number
/// of times before surfacing as [`MusicBrainzError::RateLimitExceeded`].
#[derive(Debug, Clone)]
pub struct MusicBrainzClient {
    client: Client,
    base_url: String,
    rate_limiter: RateLimiter,
    max_retries: u32,
}

impl MusicBrainzClient {
    pub fn new() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> MusicBrainzClientBuilder {
        MusicBrainzClientBuilder::default()
    }

    /// Search recordings with a Lucene query.
    ///
    /// ```no_run
    /// # use setlister_musicbrainz::{MusicBrainzClient, SearchQuery};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = MusicBrainzClient::new()?;
    /// let query = SearchQuery::recording("Ghost of Perdition", "Opeth").limit(5);
    /// let response = client.search_recordings(query).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn search_recordings(
        &self,
        query: SearchQuery,
    ) -> Result<SearchResponse<RecordingSearchResult>> {
        let url = self.endpoint("recording", &query)?;
        debug!(target: "musicbrainz", query = %query.query, "searching recordings");
        self.fetch_json(url).await
    }

    fn endpoint(&self, entity: &str, query: &SearchQuery) -> Result<Url> {
        Ok(Url::parse_with_params(
            &format!("{}/{}", self.base_url, entity),
            query.to_params(),
        )?)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let mut attempt = 0;

        let response = loop {
            self.rate_limiter.acquire().await;
            trace!(target: "musicbrainz", %url, attempt, "GET");

            let response = self
                .client
                .get(url.clone())
                .header("Accept", "application/json")
                .send()
                .await?;

            if response.status() != StatusCode::SERVICE_UNAVAILABLE {
                break response;
            }
            if attempt >= self.max_retries {
                return Err(MusicBrainzError::RateLimitExceeded);
            }
            attempt += 1;
            warn!(target: "musicbrainz", attempt, "throttled by MusicBrainz, retrying");
        };

        let status = response.status();
        debug!(target: "musicbrainz", %status, "response received");

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MusicBrainzError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        trace!(target: "musicbrainz", body_len = body.len(), "response body");

        serde_json::from_str(&body)
            .map_err(|e| MusicBrainzError::InvalidResponse(format!("unexpected JSON: {e}")))
    }
}

#[derive(Debug)]
pub struct MusicBrainzClientBuilder {
    base_url: String,
    timeout: Duration,
    rate_limit_interval: Duration,
    max_retries: u32,
}

impl Default for MusicBrainzClientBuilder {
    fn default() -> Self {
        Self {
            base_url: MUSICBRAINZ_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
            rate_limit_interval: Duration::from_secs(1),
            max_retries: 2,
        }
    }
}

impl MusicBrainzClientBuilder {
    /// Web service root, e.g. a mirror or a mock server.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Minimum time between two requests.
    pub fn rate_limit_interval(mut self, interval: Duration) -> Self {
        self.rate_limit_interval = interval;
        self
    }

    /// How often a throttled request is retried.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn build(self) -> Result<MusicBrainzClient> {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)?;

        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(MusicBrainzClient {
            client,
            base_url,
            rate_limiter: RateLimiter::new(self.rate_limit_interval),
            max_retries: self.max_retries,
        })
    }
}
