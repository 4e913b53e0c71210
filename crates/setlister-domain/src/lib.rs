// SPDX-License-Identifier: GPL-3.0-or-later
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

// ============================================================================
// Value Objects & IDs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LibraryTrackId(pub Uuid);

impl LibraryTrackId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for LibraryTrackId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LibraryTrackId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Setlists
// ============================================================================

/// A concert setlist as published by the setlist service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetlistInfo {
    pub artist_name: String,
    pub venue_name: Option<String>,
    /// Event date as published, `dd-MM-yyyy`.
    pub event_date: Option<String>,
    /// Songs in performance order, flattened across sets and encores.
    pub track_names: Vec<String>,
}

impl SetlistInfo {
    pub fn new(artist_name: impl Into<String>) -> Self {
        Self {
            artist_name: artist_name.into(),
            venue_name: None,
            event_date: None,
            track_names: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.track_names.is_empty()
    }

    /// Human readable label, e.g. `Opeth at Royal Albert Hall (05-04-2010)`.
    ///
    /// Missing venue or date parts are left out rather than rendered as
    /// placeholders.
    pub fn label(&self) -> String {
        let mut label = self.artist_name.clone();
        if let Some(venue) = self.venue_name.as_deref().filter(|v| !v.is_empty()) {
            label.push_str(" at ");
            label.push_str(venue);
        }
        if let Some(date) = self.event_date.as_deref().filter(|d| !d.is_empty()) {
            label.push_str(" (");
            label.push_str(date);
            label.push(')');
        }
        label
    }
}

// ============================================================================
// Library
// ============================================================================

/// A track in the local music library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryTrack {
    pub id: LibraryTrackId,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    pub path: PathBuf,
    /// MusicBrainz recording id, when the file was tagged with one.
    pub musicbrainz_track_id: Option<String>,
}

impl LibraryTrack {
    pub fn new(title: impl Into<String>, artist: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: LibraryTrackId::new(),
            title: title.into(),
            artist: artist.into(),
            album: None,
            path: path.into(),
            musicbrainz_track_id: None,
        }
    }

    pub fn with_album(mut self, album: impl Into<String>) -> Self {
        self.album = Some(album.into());
        self
    }

    pub fn with_musicbrainz_track_id(mut self, id: impl Into<String>) -> Self {
        self.musicbrainz_track_id = Some(id.into());
        self
    }

    /// Value of a queryable field. `None` when the field is unset.
    pub fn field(&self, field: LibraryField) -> Option<&str> {
        match field {
            LibraryField::Title => Some(self.title.as_str()),
            LibraryField::Artist => Some(self.artist.as_str()),
            LibraryField::MusicBrainzTrackId => self.musicbrainz_track_id.as_deref(),
        }
    }
}

/// Fields of a [`LibraryTrack`] that can be queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LibraryField {
    Title,
    Artist,
    MusicBrainzTrackId,
}

impl LibraryField {
    pub fn as_str(&self) -> &'static str {
        match self {
            LibraryField::Title => "title",
            LibraryField::Artist => "artist",
            LibraryField::MusicBrainzTrackId => "mb_trackid",
        }
    }
}

impl std::fmt::Display for LibraryField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Query expression over library fields.
///
/// An empty `And` matches every track, an empty `Or` matches none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LibraryQuery {
    FieldEquals(LibraryField, String),
    And(Vec<LibraryQuery>),
    Or(Vec<LibraryQuery>),
}

impl LibraryQuery {
    pub fn title(value: impl Into<String>) -> Self {
        LibraryQuery::FieldEquals(LibraryField::Title, value.into())
    }

    pub fn artist(value: impl Into<String>) -> Self {
        LibraryQuery::FieldEquals(LibraryField::Artist, value.into())
    }

    pub fn musicbrainz_track_id(value: impl Into<String>) -> Self {
        LibraryQuery::FieldEquals(LibraryField::MusicBrainzTrackId, value.into())
    }

    /// Exact, case-sensitive evaluation against a single track.
    pub fn matches(&self, track: &LibraryTrack) -> bool {
        match self {
            LibraryQuery::FieldEquals(field, value) => track.field(*field) == Some(value.as_str()),
            LibraryQuery::And(queries) => queries.iter().all(|q| q.matches(track)),
            LibraryQuery::Or(queries) => queries.iter().any(|q| q.matches(track)),
        }
    }
}

// ============================================================================
// Matching
// ============================================================================

/// A library track scored against a target title/artist; lower is better.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    pub track: LibraryTrack,
    pub distance: f64,
}

/// Outcome of resolving one setlist entry against the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    Found(LibraryTrack),
    NotFound,
}

impl MatchResult {
    pub fn is_found(&self) -> bool {
        matches!(self, MatchResult::Found(_))
    }

    pub fn into_track(self) -> Option<LibraryTrack> {
        match self {
            MatchResult::Found(track) => Some(track),
            MatchResult::NotFound => None,
        }
    }
}
