// SPDX-License-Identifier: GPL-3.0-or-later

//! MusicBrainz API client for recording lookups.
//!
//! Setlist entries rarely carry the exact title a release uses. This crate
//! searches the MusicBrainz recording index so callers can recover the
//! canonical title, artist credit and recording MBID for a loosely named
//! track. Requests are rate limited to comply with MusicBrainz API
//! guidelines.

pub mod client;
#[cfg(test)]
mod client_tests;
pub mod error;
pub mod models;
pub mod rate_limiter;

pub use client::{MusicBrainzClient, MusicBrainzClientBuilder};
pub use error::{MusicBrainzError, Result};
pub use models::{ArtistCredit, ArtistRef, Recording, RecordingSearchResult, SearchQuery, SearchResponse};
