// SPDX-License-Identifier: GPL-3.0-or-later

//! Recording lookup against an external metadata service.
//!
//! Used by the matcher when a setlist title does not appear verbatim in the
//! library: the service suggests canonical recordings, the closest one is
//! accepted if it is within the distance threshold.

use crate::distance::{track_distance, within_threshold};
use setlister_musicbrainz::{MusicBrainzClient, MusicBrainzError, SearchQuery};
use thiserror::Error;
use tracing::{debug, trace};

/// Default maximum distance for accepting a candidate recording.
pub const DEFAULT_CANDIDATE_THRESHOLD: f64 = 0.2;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("metadata lookup failed: {0}")]
    LookupFailed(#[from] MusicBrainzError),

    #[error("metadata lookup failed: {0}")]
    Other(String),
}

pub type LookupResult<T> = Result<T, LookupError>;

/// A recording suggested by the metadata service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRecording {
    pub title: String,
    pub artist: Option<String>,
    /// Recording id, compared against the library's `mb_trackid` field.
    pub track_id: String,
}

#[async_trait::async_trait]
pub trait RecordingLookup: Send + Sync {
    /// Candidate recordings for a track title by an artist, in service order.
    async fn lookup_candidates(
        &self,
        track_name: &str,
        artist_name: &str,
    ) -> LookupResult<Vec<CandidateRecording>>;

    /// Closest candidate, if its distance is within `threshold` (inclusive).
    async fn best_candidate(
        &self,
        track_name: &str,
        artist_name: &str,
        threshold: f64,
    ) -> LookupResult<Option<CandidateRecording>> {
        let candidates = self.lookup_candidates(track_name, artist_name).await?;
        Ok(select_candidate(candidates, track_name, artist_name, threshold))
    }
}

/// Score every candidate and keep the closest if it is close enough.
/// Ties go to the candidate listed first.
pub fn select_candidate(
    candidates: Vec<CandidateRecording>,
    track_name: &str,
    artist_name: &str,
    threshold: f64,
) -> Option<CandidateRecording> {
    let mut best: Option<(CandidateRecording, f64)> = None;

    for candidate in candidates {
        let distance = track_distance(
            &candidate.title,
            candidate.artist.as_deref(),
            track_name,
            artist_name,
        );
        trace!(
            target: "matching",
            title = %candidate.title,
            artist = ?candidate.artist,
            distance,
            "scored candidate"
        );

        let closer = match &best {
            Some((_, best_distance)) => distance < *best_distance,
            None => true,
        };
        if closer {
            best = Some((candidate, distance));
        }
    }

    let (candidate, distance) = best?;
    if within_threshold(distance, threshold) {
        debug!(
            target: "matching",
            track = track_name,
            title = %candidate.title,
            distance,
            "candidate accepted"
        );
        Some(candidate)
    } else {
        debug!(
            target: "matching",
            track = track_name,
            title = %candidate.title,
            distance,
            threshold,
            "closest candidate above threshold"
        );
        None
    }
}

/// [`RecordingLookup`] backed by the MusicBrainz recording search.
#[derive(Debug, Clone)]
pub struct MusicBrainzLookup {
    client: MusicBrainzClient,
    limit: u32,
}

impl MusicBrainzLookup {
    pub fn new(client: MusicBrainzClient, limit: u32) -> Self {
        Self { client, limit }
    }
}

#[async_trait::async_trait]
impl RecordingLookup for MusicBrainzLookup {
    async fn lookup_candidates(
        &self,
        track_name: &str,
        artist_name: &str,
    ) -> LookupResult<Vec<CandidateRecording>> {
        let query = SearchQuery::recording(track_name, artist_name).limit(self.limit);
        let response = self.client.search_recordings(query).await?;

        Ok(response
            .results
            .recordings
            .into_iter()
            .map(|recording| CandidateRecording {
                artist: recording.artist_credit_phrase(),
                title: recording.title,
                track_id: recording.id.to_string(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn candidate(title: &str, artist: Option<&str>, id: &str) -> CandidateRecording {
        CandidateRecording {
            title: title.to_string(),
            artist: artist.map(str::to_string),
            track_id: id.to_string(),
        }
    }

    struct FixedLookup(Vec<CandidateRecording>);

    #[async_trait::async_trait]
    impl RecordingLookup for FixedLookup {
        async fn lookup_candidates(&self, _: &str, _: &str) -> LookupResult<Vec<CandidateRecording>> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn picks_lowest_distance() {
        let best = select_candidate(
            vec![
                candidate("Closure (live)", Some("Opeth"), "live"),
                candidate("Closure", Some("Opeth"), "studio"),
            ],
            "Closure",
            "Opeth",
            DEFAULT_CANDIDATE_THRESHOLD,
        );
        assert_eq!(best.map(|c| c.track_id).as_deref(), Some("studio"));
    }

    #[test]
    fn ties_go_to_first_candidate() {
        let best = select_candidate(
            vec![
                candidate("Closure", Some("Opeth"), "first"),
                candidate("Closure", Some("Opeth"), "second"),
            ],
            "Closure",
            "Opeth",
            DEFAULT_CANDIDATE_THRESHOLD,
        );
        assert_eq!(best.map(|c| c.track_id).as_deref(), Some("first"));
    }

    #[test]
    fn title_only_exact_match_is_accepted() {
        let best = select_candidate(
            vec![candidate("Closure", None, "no-artist")],
            "Closure",
            "Opeth",
            DEFAULT_CANDIDATE_THRESHOLD,
        );
        assert!(best.is_some());
    }

    #[test]
    fn distance_equal_to_threshold_is_accepted() {
        let best = select_candidate(
            vec![candidate("abcdf", None, "edge")],
            "abcde",
            "Opeth",
            0.2,
        );
        assert_eq!(best.map(|c| c.track_id).as_deref(), Some("edge"));
    }

    #[test]
    fn distance_above_threshold_is_rejected() {
        let best = select_candidate(
            vec![candidate("Completely Different", Some("Someone"), "far")],
            "Closure",
            "Opeth",
            DEFAULT_CANDIDATE_THRESHOLD,
        );
        assert!(best.is_none());
    }

    #[test]
    fn no_candidates() {
        assert!(select_candidate(vec![], "Closure", "Opeth", 1.0).is_none());
    }

    #[tokio::test]
    async fn best_candidate_uses_lookup_results() {
        let lookup = FixedLookup(vec![
            candidate("Deliverance", Some("Opeth"), "other"),
            candidate("Ghost of Perdition", Some("Opeth"), "ghost"),
        ]);
        let best = lookup
            .best_candidate("Ghost Of Perdition", "Opeth", DEFAULT_CANDIDATE_THRESHOLD)
            .await
            .expect("lookup succeeds");
        assert_eq!(best.map(|c| c.track_id).as_deref(), Some("ghost"));
    }

    #[tokio::test]
    async fn musicbrainz_lookup_maps_recordings() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/recording"))
            .and(query_param("limit", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "created": "2026-01-08T12:00:00.000Z",
                "count": 1,
                "offset": 0,
                "recordings": [{
                    "id": "2f1b6f8d-3b0e-4a36-8e11-27ad1d1f6c9a",
                    "title": "Reverie / Harlequin Forest",
                    "artist-credit": [{
                        "name": "Opeth",
                        "artist": { "id": "c14b4180-dc87-481e-b17a-64e4150f90f6", "name": "Opeth" }
                    }]
                }]
            })))
            .mount(&server)
            .await;

        let client = MusicBrainzClient::builder()
            .base_url(server.uri())
            .rate_limit_interval(Duration::from_millis(1))
            .build()
            .expect("client builds");
        let lookup = MusicBrainzLookup::new(client, 3);

        let candidates = lookup
            .lookup_candidates("Reverie/Harlequin Forest", "Opeth")
            .await
            .expect("lookup succeeds");

        assert_eq!(
            candidates,
            vec![candidate(
                "Reverie / Harlequin Forest",
                Some("Opeth"),
                "2f1b6f8d-3b0e-4a36-8e11-27ad1d1f6c9a"
            )]
        );
    }

    #[tokio::test]
    async fn musicbrainz_errors_become_lookup_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/recording"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = MusicBrainzClient::builder()
            .base_url(server.uri())
            .rate_limit_interval(Duration::from_millis(1))
            .build()
            .expect("client builds");
        let lookup = MusicBrainzLookup::new(client, 5);

        let result = lookup.best_candidate("Closure", "Opeth", 0.2).await;
        assert!(matches!(result, Err(LookupError::LookupFailed(_))));
    }
}
