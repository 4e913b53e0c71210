// SPDX-License-Identifier: GPL-3.0-or-later

//! Library matching for setlist track names.
//!
//! The matcher implements a fallback chain:
//! 1. Exact title lookup in the library
//! 2. Metadata lookup for the canonical recording, then a library lookup by
//!    canonical title/artist or recording id
//!
//! When either step yields several library tracks, the one closest to the
//! requested title/artist wins.

use crate::distance::track_distance;
use crate::lookup::{RecordingLookup, DEFAULT_CANDIDATE_THRESHOLD};
use setlister_domain::{LibraryQuery, LibraryTrack, MatchCandidate, MatchResult};
use setlister_infrastructure::LibraryRepository;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors that abort matching. A track that cannot be found is not an error.
#[derive(Debug, Error)]
pub enum MatchingError {
    #[error("library query failed: {0}")]
    Library(#[from] anyhow::Error),
}

pub type MatchingResult<T> = Result<T, MatchingError>;

/// Resolves setlist track names to library tracks.
pub struct LibraryMatcher {
    library: Arc<dyn LibraryRepository>,
    lookup: Arc<dyn RecordingLookup>,
    threshold: f64,
}

impl LibraryMatcher {
    pub fn new(library: Arc<dyn LibraryRepository>, lookup: Arc<dyn RecordingLookup>) -> Self {
        Self {
            library,
            lookup,
            threshold: DEFAULT_CANDIDATE_THRESHOLD,
        }
    }

    /// Maximum candidate distance accepted from the metadata lookup.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Find the library track for `track_name` by `artist_name`.
    ///
    /// Metadata lookup failures are logged and treated as "not found";
    /// only library failures are returned as errors.
    pub async fn find_in_library(
        &self,
        track_name: &str,
        artist_name: &str,
    ) -> MatchingResult<MatchResult> {
        let mut results = self.library.query(&LibraryQuery::title(track_name)).await?;

        if results.len() == 1 {
            debug!(target: "matching", track = track_name, "exact title match");
            return Ok(results.into_iter().next().map_or(MatchResult::NotFound, MatchResult::Found));
        }

        // Setlist titles are often not quite what the release uses
        // (abbreviations, "/" medleys, punctuation): ask for the canonical recording.
        if results.is_empty() {
            let Some(query) = self.fallback_query(track_name, artist_name).await else {
                return Ok(MatchResult::NotFound);
            };
            results = self.library.query(&query).await?;
        }

        Ok(pick_closest(results, track_name, artist_name)
            .map_or(MatchResult::NotFound, |best| MatchResult::Found(best.track)))
    }

    async fn fallback_query(&self, track_name: &str, artist_name: &str) -> Option<LibraryQuery> {
        let candidate = match self
            .lookup
            .best_candidate(track_name, artist_name, self.threshold)
            .await
        {
            Ok(Some(candidate)) => candidate,
            Ok(None) => {
                debug!(target: "matching", track = track_name, "no usable candidate");
                return None;
            }
            Err(e) => {
                warn!(
                    target: "matching",
                    track = track_name,
                    error = %e,
                    "metadata lookup failed"
                );
                return None;
            }
        };

        debug!(
            target: "matching",
            track = track_name,
            candidate_title = %candidate.title,
            candidate_artist = ?candidate.artist,
            candidate_id = %candidate.track_id,
            "retrying library with candidate"
        );

        let mut branches = Vec::with_capacity(2);
        if let Some(artist) = candidate.artist.filter(|a| !a.is_empty()) {
            branches.push(LibraryQuery::And(vec![
                LibraryQuery::title(candidate.title),
                LibraryQuery::artist(artist),
            ]));
        }
        branches.push(LibraryQuery::musicbrainz_track_id(candidate.track_id));

        Some(LibraryQuery::Or(branches))
    }
}

/// Closest track to `track_name`/`artist_name`; ties go to the first track.
pub fn pick_closest(
    tracks: Vec<LibraryTrack>,
    track_name: &str,
    artist_name: &str,
) -> Option<MatchCandidate> {
    let mut best: Option<MatchCandidate> = None;

    for track in tracks {
        let distance = track_distance(&track.title, Some(&track.artist), track_name, artist_name);
        if best.as_ref().map_or(true, |b| distance < b.distance) {
            best = Some(MatchCandidate { track, distance });
        }
    }

    if let Some(best) = &best {
        debug!(
            target: "matching",
            track = track_name,
            path = %best.track.path.display(),
            distance = best.distance,
            "closest library track"
        );
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{CandidateRecording, LookupError, LookupResult};
    use std::sync::Mutex;

    /// In-memory library that records every query it receives.
    #[derive(Default)]
    struct RecordingLibrary {
        tracks: Vec<LibraryTrack>,
        queries: Mutex<Vec<LibraryQuery>>,
    }

    impl RecordingLibrary {
        fn with(tracks: Vec<LibraryTrack>) -> Arc<Self> {
            Arc::new(Self {
                tracks,
                queries: Mutex::new(Vec::new()),
            })
        }

        fn queries(&self) -> Vec<LibraryQuery> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl LibraryRepository for RecordingLibrary {
        async fn query(&self, query: &LibraryQuery) -> anyhow::Result<Vec<LibraryTrack>> {
            self.queries.lock().unwrap().push(query.clone());
            Ok(self.tracks.iter().filter(|t| query.matches(t)).cloned().collect())
        }

        async fn upsert(&self, track: LibraryTrack) -> anyhow::Result<LibraryTrack> {
            Ok(track)
        }

        async fn count(&self) -> anyhow::Result<i64> {
            Ok(self.tracks.len() as i64)
        }
    }

    struct BrokenLibrary;

    #[async_trait::async_trait]
    impl LibraryRepository for BrokenLibrary {
        async fn query(&self, _: &LibraryQuery) -> anyhow::Result<Vec<LibraryTrack>> {
            Err(anyhow::anyhow!("database is locked"))
        }

        async fn upsert(&self, track: LibraryTrack) -> anyhow::Result<LibraryTrack> {
            Ok(track)
        }

        async fn count(&self) -> anyhow::Result<i64> {
            Ok(0)
        }
    }

    struct FixedLookup(Vec<CandidateRecording>);

    #[async_trait::async_trait]
    impl RecordingLookup for FixedLookup {
        async fn lookup_candidates(&self, _: &str, _: &str) -> LookupResult<Vec<CandidateRecording>> {
            Ok(self.0.clone())
        }
    }

    struct FailingLookup;

    #[async_trait::async_trait]
    impl RecordingLookup for FailingLookup {
        async fn lookup_candidates(&self, _: &str, _: &str) -> LookupResult<Vec<CandidateRecording>> {
            Err(LookupError::Other("connection refused".to_string()))
        }
    }

    fn no_candidates() -> Arc<FixedLookup> {
        Arc::new(FixedLookup(vec![]))
    }

    fn track(title: &str, artist: &str, path: &str) -> LibraryTrack {
        LibraryTrack::new(title, artist, path)
    }

    #[tokio::test]
    async fn single_exact_title_match() {
        let library = RecordingLibrary::with(vec![
            track("Ghost of Perdition", "Opeth", "/music/ghost.flac"),
            track("Closure", "Opeth", "/music/closure.flac"),
        ]);
        let matcher = LibraryMatcher::new(library.clone(), no_candidates());

        let result = matcher.find_in_library("Closure", "Opeth").await.unwrap();

        assert_eq!(result.into_track().unwrap().path.to_str(), Some("/music/closure.flac"));
        assert_eq!(library.queries(), vec![LibraryQuery::title("Closure")]);
    }

    #[tokio::test]
    async fn multiple_title_matches_are_disambiguated_by_artist() {
        let library = RecordingLibrary::with(vec![
            track("Closure", "Other Band", "/music/other.mp3"),
            track("Closure", "Opeth", "/music/opeth.flac"),
        ]);
        let matcher = LibraryMatcher::new(library.clone(), no_candidates());

        let result = matcher.find_in_library("Closure", "Opeth").await.unwrap();

        assert_eq!(result.into_track().unwrap().artist, "Opeth");
        assert_eq!(library.queries().len(), 1);
    }

    #[tokio::test]
    async fn fallback_issues_one_or_query() {
        let mut tagged = track("Reverie / Harlequin Forest", "Opeth", "/music/reverie.flac");
        tagged.musicbrainz_track_id = Some("mbid-reverie".to_string());
        let library = RecordingLibrary::with(vec![tagged]);
        let lookup = Arc::new(FixedLookup(vec![CandidateRecording {
            title: "Reverie/Harlequin Forest".to_string(),
            artist: Some("Opeth".to_string()),
            track_id: "mbid-reverie".to_string(),
        }]));
        let matcher = LibraryMatcher::new(library.clone(), lookup);

        let result = matcher
            .find_in_library("Reverie/Harlequin Forest", "Opeth")
            .await
            .unwrap();

        assert_eq!(result.into_track().unwrap().path.to_str(), Some("/music/reverie.flac"));
        assert_eq!(
            library.queries(),
            vec![
                LibraryQuery::title("Reverie/Harlequin Forest"),
                LibraryQuery::Or(vec![
                    LibraryQuery::And(vec![
                        LibraryQuery::title("Reverie/Harlequin Forest"),
                        LibraryQuery::artist("Opeth"),
                    ]),
                    LibraryQuery::musicbrainz_track_id("mbid-reverie"),
                ]),
            ]
        );
    }

    #[tokio::test]
    async fn fallback_results_are_disambiguated() {
        let library = RecordingLibrary::with(vec![
            track("Harvest", "Opeth", "/music/live/harvest.flac")
                .with_musicbrainz_track_id("mbid-harvest"),
            track("Harvest", "Opeth", "/music/studio/harvest.flac"),
        ]);
        let lookup = Arc::new(FixedLookup(vec![CandidateRecording {
            title: "Harvest".to_string(),
            artist: Some("Opeth".to_string()),
            track_id: "mbid-harvest".to_string(),
        }]));
        let matcher = LibraryMatcher::new(library.clone(), lookup);

        let result = matcher.find_in_library("Harvest (acoustic)", "Opeth").await.unwrap();

        // equal distances: first result wins
        assert_eq!(
            result.into_track().unwrap().path.to_str(),
            Some("/music/live/harvest.flac")
        );
        assert_eq!(library.queries().len(), 2);
    }

    #[tokio::test]
    async fn candidate_without_artist_only_matches_by_id() {
        let library = RecordingLibrary::with(vec![track("Harvest", "Someone Else", "/music/x.flac")]);
        let lookup = Arc::new(FixedLookup(vec![CandidateRecording {
            title: "Harvest".to_string(),
            artist: None,
            track_id: "mbid-harvest".to_string(),
        }]));
        let matcher = LibraryMatcher::new(library.clone(), lookup);

        let result = matcher.find_in_library("Harvest!", "Opeth").await.unwrap();

        assert_eq!(result, MatchResult::NotFound);
        assert_eq!(
            library.queries()[1],
            LibraryQuery::Or(vec![LibraryQuery::musicbrainz_track_id("mbid-harvest")])
        );
    }

    #[tokio::test]
    async fn no_candidate_means_not_found() {
        let library = RecordingLibrary::with(vec![track("Ghost of Perdition", "Opeth", "/a.flac")]);
        let matcher = LibraryMatcher::new(library.clone(), no_candidates());

        let result = matcher.find_in_library("Closure", "Opeth").await.unwrap();

        assert_eq!(result, MatchResult::NotFound);
        assert_eq!(library.queries().len(), 1);
    }

    #[tokio::test]
    async fn candidate_above_threshold_is_ignored() {
        let library = RecordingLibrary::with(vec![]);
        let lookup = Arc::new(FixedLookup(vec![CandidateRecording {
            title: "Something Else Entirely".to_string(),
            artist: Some("Opeth".to_string()),
            track_id: "mbid".to_string(),
        }]));
        let matcher = LibraryMatcher::new(library.clone(), lookup);

        let result = matcher.find_in_library("Closure", "Opeth").await.unwrap();

        assert_eq!(result, MatchResult::NotFound);
        assert_eq!(library.queries().len(), 1);
    }

    #[tokio::test]
    async fn lookup_failure_is_not_found() {
        let library = RecordingLibrary::with(vec![]);
        let matcher = LibraryMatcher::new(library, Arc::new(FailingLookup));

        let result = matcher.find_in_library("Closure", "Opeth").await;

        assert!(matches!(result, Ok(MatchResult::NotFound)));
    }

    #[tokio::test]
    async fn library_failure_is_an_error() {
        let matcher = LibraryMatcher::new(Arc::new(BrokenLibrary), no_candidates());

        let result = matcher.find_in_library("Closure", "Opeth").await;

        assert!(matches!(result, Err(MatchingError::Library(_))));
    }

    #[test]
    fn pick_closest_prefers_first_on_tie() {
        let best = pick_closest(
            vec![
                track("Closure", "Opeth", "/first.flac"),
                track("Closure", "Opeth", "/second.flac"),
            ],
            "Closure",
            "Opeth",
        )
        .unwrap();
        assert_eq!(best.track.path.to_str(), Some("/first.flac"));
        assert_eq!(best.distance, 0.0);
    }

    #[test]
    fn pick_closest_of_nothing() {
        assert!(pick_closest(vec![], "Closure", "Opeth").is_none());
    }
}
