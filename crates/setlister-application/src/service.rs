// SPDX-License-Identifier: GPL-3.0-or-later

//! Setlist to playlist orchestration.
//!
//! [`SetlisterService::run`] fetches a setlist, resolves every song against
//! the library and writes the found tracks to an M3U playlist named after the
//! concert. All input and configuration checks happen before anything is
//! written.

use crate::lookup::MusicBrainzLookup;
use crate::matching::{LibraryMatcher, MatchingError};
use crate::player::{PlaylistPlayer, SystemPlayer};
use crate::playlist::{playlist_file_name, save_playlist};
use crate::setlist::SetlistSource;
use chrono::NaiveDate;
use setlister_config::AppConfig;
use setlister_domain::{LibraryTrack, MatchResult, SetlistInfo};
use setlister_infrastructure::LibraryRepository;
use setlister_musicbrainz::MusicBrainzClient;
use setlister_setlistfm::{SetlistFmClient, SetlistFmError};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

const DATE_FORMAT: &str = "%d-%m-%Y";

#[derive(Debug, Error)]
pub enum SetlisterError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to fetch setlist: {0}")]
    Fetch(#[from] SetlistFmError),

    #[error(transparent)]
    Library(#[from] MatchingError),

    #[error("failed to write playlist: {0}")]
    Io(#[from] io::Error),
}

pub type SetlisterResult<T> = Result<T, SetlisterError>;

/// Validated settings for a [`SetlisterService`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetlisterSettings {
    pub playlist_dir: PathBuf,
    pub api_key: String,
}

impl SetlisterSettings {
    /// Validate settings. `playlist_dir` may start with `~`; if it already
    /// exists it must be a directory, otherwise it is created on first write.
    pub fn new(playlist_dir: &str, api_key: &str) -> SetlisterResult<Self> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(SetlisterError::InvalidConfig(
                "setlist.fm API key is empty".to_string(),
            ));
        }

        if playlist_dir.trim().is_empty() {
            return Err(SetlisterError::InvalidConfig(
                "playlist directory is empty".to_string(),
            ));
        }

        let playlist_dir = expand_home(playlist_dir);
        if playlist_dir.exists() && !playlist_dir.is_dir() {
            return Err(SetlisterError::InvalidConfig(format!(
                "playlist directory {} is not a directory",
                playlist_dir.display()
            )));
        }

        Ok(Self {
            playlist_dir,
            api_key: api_key.to_string(),
        })
    }

    pub fn from_config(config: &AppConfig) -> SetlisterResult<Self> {
        let dir = config.playlist.dir.as_deref().ok_or_else(|| {
            SetlisterError::InvalidConfig("playlist.dir is not set".to_string())
        })?;
        let api_key = config.setlistfm.api_key.as_deref().ok_or_else(|| {
            SetlisterError::InvalidConfig("setlistfm.api_key is not set".to_string())
        })?;
        Self::new(dir, api_key)
    }
}

fn expand_home(path: &str) -> PathBuf {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return PathBuf::from(path),
    };

    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

/// A setlist entry that was found in the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoundTrack {
    /// 1-based position in the setlist.
    pub index: usize,
    pub name: String,
    pub track: LibraryTrack,
}

/// A setlist entry missing from the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingTrack {
    pub index: usize,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub setlist_name: String,
    pub playlist_path: PathBuf,
    pub found: Vec<FoundTrack>,
    pub missing: Vec<MissingTrack>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No setlist with songs could be fetched; nothing was written.
    NoSetlist,
    Completed(RunReport),
}

/// Join artist name arguments with single spaces, collapsing whitespace.
pub fn normalize_artist_name<S: AsRef<str>>(parts: &[S]) -> SetlisterResult<String> {
    let name = parts
        .iter()
        .flat_map(|part| part.as_ref().split_whitespace())
        .collect::<Vec<_>>()
        .join(" ");

    if name.is_empty() {
        return Err(SetlisterError::InvalidInput(
            "artist name is empty".to_string(),
        ));
    }
    Ok(name)
}

/// Check that `date` is a real calendar date written as `dd-MM-yyyy`.
pub fn validate_date(date: &str) -> SetlisterResult<()> {
    let valid = date.len() == 10 && NaiveDate::parse_from_str(date, DATE_FORMAT).is_ok();
    if valid {
        Ok(())
    } else {
        Err(SetlisterError::InvalidInput(format!(
            "date {date:?} is not a valid dd-MM-yyyy date"
        )))
    }
}

pub struct SetlisterService {
    settings: SetlisterSettings,
    setlists: Arc<dyn SetlistSource>,
    matcher: LibraryMatcher,
    player: Arc<dyn PlaylistPlayer>,
}

impl SetlisterService {
    pub fn new(
        settings: SetlisterSettings,
        setlists: Arc<dyn SetlistSource>,
        matcher: LibraryMatcher,
        player: Arc<dyn PlaylistPlayer>,
    ) -> Self {
        Self {
            settings,
            setlists,
            matcher,
            player,
        }
    }

    /// Wire the service to setlist.fm, MusicBrainz and the system player.
    pub fn from_config(
        config: &AppConfig,
        library: Arc<dyn LibraryRepository>,
    ) -> SetlisterResult<Self> {
        let settings = SetlisterSettings::from_config(config)?;

        let mut setlistfm = SetlistFmClient::builder(settings.api_key.clone())
            .timeout(Duration::from_secs(config.setlistfm.timeout_secs));
        if let Some(url) = &config.setlistfm.base_url {
            setlistfm = setlistfm.base_url(url.clone());
        }
        let setlistfm = setlistfm
            .build()
            .map_err(|e| SetlisterError::InvalidConfig(e.to_string()))?;

        let mut musicbrainz = MusicBrainzClient::builder()
            .timeout(Duration::from_secs(config.musicbrainz.timeout_secs))
            .rate_limit_interval(Duration::from_millis(config.musicbrainz.rate_limit_ms));
        if let Some(url) = &config.musicbrainz.base_url {
            musicbrainz = musicbrainz.base_url(url.clone());
        }
        let musicbrainz = musicbrainz
            .build()
            .map_err(|e| SetlisterError::InvalidConfig(e.to_string()))?;

        let lookup = MusicBrainzLookup::new(musicbrainz, config.musicbrainz.search_limit);
        let matcher = LibraryMatcher::new(library, Arc::new(lookup))
            .with_threshold(config.matching.threshold);

        Ok(Self::new(
            settings,
            Arc::new(setlistfm),
            matcher,
            Arc::new(SystemPlayer),
        ))
    }

    pub fn settings(&self) -> &SetlisterSettings {
        &self.settings
    }

    pub async fn fetch_setlist(
        &self,
        artist_name: &str,
        date: Option<&str>,
    ) -> SetlisterResult<Option<SetlistInfo>> {
        Ok(self.setlists.fetch_setlist(artist_name, date).await?)
    }

    pub async fn find_in_library(
        &self,
        track_name: &str,
        artist_name: &str,
    ) -> SetlisterResult<MatchResult> {
        Ok(self.matcher.find_in_library(track_name, artist_name).await?)
    }

    /// Build the playlist for an artist's most recent setlist, or the one
    /// played on `date` (`dd-MM-yyyy`), and optionally open it.
    pub async fn run<S: AsRef<str>>(
        &self,
        artist: &[S],
        date: Option<&str>,
        play: bool,
    ) -> SetlisterResult<RunOutcome> {
        let artist_name = normalize_artist_name(artist)?;
        if let Some(date) = date {
            validate_date(date)?;
        }

        let setlist = match self.fetch_setlist(&artist_name, date).await {
            Ok(Some(setlist)) if !setlist.is_empty() => setlist,
            Ok(_) => {
                info!(target: "playlist", artist = %artist_name, date = ?date, "setlist not found");
                return Ok(RunOutcome::NoSetlist);
            }
            Err(e) => {
                warn!(target: "playlist", artist = %artist_name, error = %e, "setlist not found");
                return Ok(RunOutcome::NoSetlist);
            }
        };

        let setlist_name = setlist.label();
        info!(target: "playlist", "setlist: {}", setlist_name);

        let mut found = Vec::new();
        let mut missing = Vec::new();
        let mut tracks = Vec::new();

        for (i, name) in setlist.track_names.iter().enumerate() {
            let index = i + 1;
            match self.find_in_library(name, &setlist.artist_name).await? {
                MatchResult::Found(track) => {
                    info!(target: "playlist", "{} {}: found", index, name);
                    debug!(target: "playlist", path = %track.path.display(), "matched file");
                    tracks.push(track.clone());
                    found.push(FoundTrack {
                        index,
                        name: name.clone(),
                        track,
                    });
                }
                MatchResult::NotFound => {
                    info!(target: "playlist", "{} {}: not found", index, name);
                    missing.push(MissingTrack {
                        index,
                        name: name.clone(),
                    });
                }
            }
        }

        if tracks.is_empty() {
            warn!(target: "playlist", setlist = %setlist_name, "no setlist tracks found in library");
        }

        let playlist_path = self
            .settings
            .playlist_dir
            .join(playlist_file_name(&setlist_name));
        save_playlist(&playlist_path, &tracks)?;
        info!(
            target: "playlist",
            path = %playlist_path.display(),
            found = found.len(),
            missing = missing.len(),
            "playlist saved"
        );

        if play {
            self.play(&playlist_path).await;
        }

        Ok(RunOutcome::Completed(RunReport {
            setlist_name,
            playlist_path,
            found,
            missing,
        }))
    }

    async fn play(&self, playlist: &Path) {
        if let Err(e) = self.player.open(playlist).await {
            warn!(target: "player", path = %playlist.display(), error = %e, "could not open playlist");
        }
    }
}
