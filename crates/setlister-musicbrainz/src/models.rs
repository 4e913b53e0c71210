// SPDX-License-Identifier: GPL-3.0-or-later

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Recording (a distinct performance of a track) from MusicBrainz.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recording {
    /// MusicBrainz recording ID (MBID).
    pub id: Uuid,
    /// Recording title.
    pub title: String,
    /// Length in milliseconds.
    #[serde(default)]
    pub length: Option<u64>,
    /// Disambiguation comment (e.g., "live, 2006-11-09: Shepherd's Bush").
    #[serde(default)]
    pub disambiguation: Option<String>,
    /// Artist credit for the recording.
    #[serde(rename = "artist-credit", default)]
    pub artist_credit: Vec<ArtistCredit>,
    /// Search score (only present in search results).
    #[serde(default)]
    pub score: Option<u32>,
}

impl Recording {
    /// The artist credit as printed, e.g. `"Ozzy Osbourne feat. Slash"`.
    ///
    /// `None` when the recording carries no credit.
    pub fn artist_credit_phrase(&self) -> Option<String> {
        if self.artist_credit.is_empty() {
            return None;
        }
        let phrase = self
            .artist_credit
            .iter()
            .map(|credit| {
                format!(
                    "{}{}",
                    credit.name,
                    credit.joinphrase.as_deref().unwrap_or_default()
                )
            })
            .collect::<String>();
        Some(phrase)
    }
}

/// Artist credit entry (artist contribution to a recording).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtistCredit {
    /// Name as credited on the recording.
    pub name: String,
    /// Artist details.
    pub artist: ArtistRef,
    /// Join phrase (e.g., " & ", " feat. ").
    #[serde(default)]
    pub joinphrase: Option<String>,
}

/// Reference to an artist (minimal info).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtistRef {
    /// MusicBrainz artist ID.
    pub id: Uuid,
    /// Artist name.
    pub name: String,
    /// Artist sort name.
    #[serde(rename = "sort-name", default)]
    pub sort_name: Option<String>,
}

/// Search query parameters.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    /// Lucene search query string.
    pub query: String,
    /// Maximum number of results (default 25, max 100).
    pub limit: Option<u32>,
    /// Offset for pagination (default 0).
    pub offset: Option<u32>,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: None,
            offset: None,
        }
    }

    /// Build a recording search for a title credited to an artist.
    ///
    /// ```
    /// # use setlister_musicbrainz::SearchQuery;
    /// let query = SearchQuery::recording("Closure", "Opeth");
    /// assert_eq!(query.query, r#"recording:"Closure" AND artist:"Opeth""#);
    /// ```
    pub fn recording(title: &str, artist: &str) -> Self {
        let mut query = format!("recording:\"{}\"", escape_phrase(title));
        if !artist.trim().is_empty() {
            query.push_str(&format!(" AND artist:\"{}\"", escape_phrase(artist)));
        }
        Self::new(query)
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// URL query parameters for the web service, JSON format included.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("query", self.query.clone()), ("fmt", "json".to_string())];
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(offset) = self.offset {
            params.push(("offset", offset.to_string()));
        }
        params
    }
}

/// Escape a value for use inside a quoted Lucene phrase.
fn escape_phrase(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Generic search response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse<T> {
    /// Creation timestamp.
    pub created: String,
    /// Total number of results.
    pub count: u32,
    /// Offset used for this page.
    pub offset: u32,
    /// Results for this page.
    #[serde(flatten)]
    pub results: T,
}

/// Recording search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordingSearchResult {
    #[serde(default)]
    pub recordings: Vec<Recording>,
}
