// SPDX-License-Identifier: GPL-3.0-or-later

use serde::{Deserialize, Serialize};
use setlister_domain::SetlistInfo;

/// Response of `GET /search/setlists`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetlistSearchResponse {
    /// Setlists, most recent event first.
    #[serde(deserialize_with = "one_or_many")]
    pub setlist: Vec<Setlist>,
    #[serde(default)]
    pub total: Option<u32>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub items_per_page: Option<u32>,
}

impl SetlistSearchResponse {
    /// First setlist that lists at least one song, converted to a
    /// [`SetlistInfo`]. Later entries are not inspected.
    ///
    /// `queried_artist` is used when the selected entry carries no artist.
    pub fn first_complete(&self, queried_artist: &str) -> Option<SetlistInfo> {
        self.setlist
            .iter()
            .find(|setlist| setlist.has_songs())
            .map(|setlist| setlist.to_info(queried_artist))
    }
}

/// A single concert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setlist {
    #[serde(default)]
    pub id: Option<String>,
    /// `dd-MM-yyyy`.
    #[serde(default)]
    pub event_date: Option<String>,
    #[serde(default)]
    pub artist: Option<SetlistArtist>,
    #[serde(default)]
    pub venue: Option<Venue>,
    #[serde(default)]
    pub sets: Sets,
    #[serde(default)]
    pub url: Option<String>,
}

impl Setlist {
    /// Song names in performance order: set by set, song by song.
    /// Songs without a name are skipped.
    pub fn track_names(&self) -> Vec<String> {
        self.songs().map(|song| song.name.clone()).collect()
    }

    pub fn has_songs(&self) -> bool {
        self.songs().next().is_some()
    }

    fn songs(&self) -> impl Iterator<Item = &Song> {
        self.sets
            .set
            .iter()
            .flat_map(|set| set.song.iter())
            .filter(|song| !song.name.trim().is_empty())
    }

    fn to_info(&self, queried_artist: &str) -> SetlistInfo {
        let artist_name = self
            .artist
            .as_ref()
            .map(|artist| artist.name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| queried_artist.to_string());

        SetlistInfo {
            artist_name,
            venue_name: self.venue.as_ref().and_then(|venue| venue.name.clone()),
            event_date: self.event_date.clone(),
            track_names: self.track_names(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetlistArtist {
    #[serde(default)]
    pub mbid: Option<String>,
    pub name: String,
    #[serde(default)]
    pub sort_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sets {
    #[serde(default, deserialize_with = "one_or_many")]
    pub set: Vec<Set>,
}

/// A set within a concert; encores are separate sets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Set {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub encore: Option<u32>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub song: Vec<Song>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Song {
    /// Required; a blank name is tolerated and skipped.
    pub name: String,
    #[serde(default)]
    pub info: Option<String>,
    #[serde(default)]
    pub tape: bool,
}

/// setlist.fm collapses single-element arrays into bare objects in some responses.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    })
}
