// SPDX-License-Identifier: GPL-3.0-or-later

//! setlist.fm API client.
//!
//! Searches the setlist.fm 1.0 REST API for an artist's setlists and picks
//! the most recent one that actually lists songs.

pub mod client;
pub mod error;
pub mod models;

pub use client::{SetlistFmClient, SetlistFmClientBuilder};
pub use error::{Result, SetlistFmError};
pub use models::{Set, Setlist, SetlistArtist, SetlistSearchResponse, Song, Venue};
