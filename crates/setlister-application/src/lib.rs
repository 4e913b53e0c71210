// SPDX-License-Identifier: GPL-3.0-or-later
pub mod distance;
pub mod library_import;
pub mod lookup;
pub mod matching;
pub mod player;
pub mod playlist;
pub mod service;
pub mod setlist;

pub use distance::{string_distance, track_distance, within_threshold};
pub use library_import::{ImportSummary, LibraryImportError, LibraryImportService};
pub use lookup::{CandidateRecording, LookupError, MusicBrainzLookup, RecordingLookup};
pub use matching::{LibraryMatcher, MatchingError, MatchingResult};
pub use player::{PlaylistPlayer, SystemPlayer};
pub use playlist::{playlist_file_name, save_playlist};
pub use service::{
    normalize_artist_name, validate_date, FoundTrack, MissingTrack, RunOutcome, RunReport,
    SetlisterError, SetlisterResult, SetlisterService, SetlisterSettings,
};
pub use setlist::SetlistSource;
