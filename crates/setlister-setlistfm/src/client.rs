// SPDX-License-Identifier: GPL-3.0-or-later

use crate::error::{Result, SetlistFmError};
use crate::models::SetlistSearchResponse;
use reqwest::Client;
use setlister_domain::SetlistInfo;
use std::time::Duration;
use tracing::{debug, info, trace};

const SETLISTFM_API_BASE: &str = "https://api.setlist.fm/rest/1.0";
const USER_AGENT: &str = concat!("Setlister/", env!("CARGO_PKG_VERSION"));

/// setlist.fm API client.
///
/// One instance owns one HTTP connection pool; reuse it across requests.
#[derive(Debug, Clone)]
pub struct SetlistFmClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SetlistFmClient {
    /// Create a client with default settings.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder(api_key).build()
    }

    pub fn builder(api_key: impl Into<String>) -> SetlistFmClientBuilder {
        SetlistFmClientBuilder::new(api_key)
    }

    /// Search setlists for an artist, optionally restricted to an event date
    /// (`dd-MM-yyyy`).
    pub async fn search_setlists(
        &self,
        artist_name: &str,
        date: Option<&str>,
    ) -> Result<SetlistSearchResponse> {
        let url = format!("{}/search/setlists", self.base_url);

        let mut params = vec![("artistName", artist_name)];
        if let Some(date) = date {
            params.push(("date", date));
        }

        trace!(target: "setlistfm", url = %url, artist = artist_name, date = ?date, "GET");

        let response = self
            .client
            .get(&url)
            .query(&params)
            .header("Accept", "application/json")
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        let status = response.status();
        debug!(target: "setlistfm", "response status: {}", status);

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SetlistFmError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        trace!(target: "setlistfm", "response body: {}", body);

        serde_json::from_str(&body).map_err(|e| {
            SetlistFmError::InvalidResponse(format!("Failed to parse response: {}", e))
        })
    }

    /// Fetch the most recent setlist for an artist that lists any songs.
    ///
    /// setlist.fm lists announced and undocumented events with empty sets;
    /// those are skipped. Returns `Ok(None)` when no entry has songs.
    pub async fn fetch_setlist(
        &self,
        artist_name: &str,
        date: Option<&str>,
    ) -> Result<Option<SetlistInfo>> {
        let response = self.search_setlists(artist_name, date).await?;
        let setlist = response.first_complete(artist_name);

        match &setlist {
            Some(info) => info!(
                target: "setlistfm",
                artist = %info.artist_name,
                venue = ?info.venue_name,
                date = ?info.event_date,
                tracks = info.track_names.len(),
                "setlist selected"
            ),
            None => debug!(
                target: "setlistfm",
                artist = artist_name,
                entries = response.setlist.len(),
                "no setlist with songs"
            ),
        }

        Ok(setlist)
    }
}

/// Builder for configuring a setlist.fm client.
#[derive(Debug)]
pub struct SetlistFmClientBuilder {
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl SetlistFmClientBuilder {
    fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: SETLISTFM_API_BASE.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set a custom base URL (useful for testing with mock servers).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout duration.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<SetlistFmClient> {
        if self.api_key.trim().is_empty() {
            return Err(SetlistFmError::MissingApiKey);
        }

        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(SetlistFmClient {
            client,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            api_key: self.api_key,
        })
    }
}
