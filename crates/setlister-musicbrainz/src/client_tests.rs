// SPDX-License-Identifier: GPL-3.0-or-later

#[cfg(test)]
mod tests {
    use crate::{MusicBrainzClient, MusicBrainzError, SearchQuery};
    use std::time::Duration;
    use uuid::Uuid;
    use wiremock::matchers::{header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const OPETH_MBID: &str = "c14b4180-dc87-481e-b17a-64e4150f90f6";
    const CLOSURE_RECORDING_MBID: &str = "2f1b6f8d-3b0e-4a36-8e11-27ad1d1f6c9a";
    const CLOSURE_LIVE_RECORDING_MBID: &str = "7d9b3c61-55a2-4c4e-a1ea-0c6e3f3a9d12";

    fn recording_search_response() -> serde_json::Value {
        serde_json::json!({
            "created": "2026-01-08T12:00:00.000Z",
            "count": 2,
            "offset": 0,
            "recordings": [{
                "id": CLOSURE_RECORDING_MBID,
                "score": 100,
                "title": "Closure",
                "length": 315000,
                "artist-credit": [{
                    "name": "Opeth",
                    "artist": {
                        "id": OPETH_MBID,
                        "name": "Opeth",
                        "sort-name": "Opeth"
                    }
                }]
            }, {
                "id": CLOSURE_LIVE_RECORDING_MBID,
                "score": 87,
                "title": "Closure",
                "disambiguation": "live",
                "artist-credit": [{
                    "name": "Opeth",
                    "joinphrase": "",
                    "artist": {
                        "id": OPETH_MBID,
                        "name": "Opeth"
                    }
                }]
            }]
        })
    }

    fn test_client(server: &MockServer) -> MusicBrainzClient {
        MusicBrainzClient::builder()
            .base_url(server.uri())
            .rate_limit_interval(Duration::from_millis(1))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_search_recordings() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/recording"))
            .and(query_param("query", r#"recording:"Closure" AND artist:"Opeth""#))
            .and(query_param("fmt", "json"))
            .and(query_param("limit", "5"))
            .and(header_exists("User-Agent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(recording_search_response()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let query = SearchQuery::recording("Closure", "Opeth").limit(5);
        let response = client.search_recordings(query).await.unwrap();

        assert_eq!(response.count, 2);
        let recordings = &response.results.recordings;
        assert_eq!(recordings.len(), 2);

        let first = &recordings[0];
        assert_eq!(first.id, Uuid::parse_str(CLOSURE_RECORDING_MBID).unwrap());
        assert_eq!(first.title, "Closure");
        assert_eq!(first.length, Some(315000));
        assert_eq!(first.score, Some(100));
        assert_eq!(first.artist_credit_phrase().as_deref(), Some("Opeth"));

        assert_eq!(recordings[1].disambiguation.as_deref(), Some("live"));
        assert_eq!(recordings[1].artist_credit[0].artist.sort_name, None);
    }

    #[tokio::test]
    async fn test_search_recordings_empty() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/recording"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "created": "2026-01-08T12:00:00.000Z",
                "count": 0,
                "offset": 0,
                "recordings": []
            })))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let response = client
            .search_recordings(SearchQuery::recording("Nonexistent", "Nobody"))
            .await
            .unwrap();

        assert_eq!(response.count, 0);
        assert!(response.results.recordings.is_empty());
    }

    #[tokio::test]
    async fn test_rate_limit_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/recording"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let result = client
            .search_recordings(SearchQuery::recording("Closure", "Opeth"))
            .await;

        assert!(matches!(result, Err(MusicBrainzError::RateLimitExceeded)));
    }

    #[tokio::test]
    async fn test_throttled_request_is_retried() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/recording"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/recording"))
            .respond_with(ResponseTemplate::new(200).set_body_json(recording_search_response()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let response = client
            .search_recordings(SearchQuery::recording("Closure", "Opeth"))
            .await
            .unwrap();

        assert_eq!(response.results.recordings.len(), 2);
    }

    #[tokio::test]
    async fn test_no_retries() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/recording"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = MusicBrainzClient::builder()
            .base_url(mock_server.uri())
            .rate_limit_interval(Duration::from_millis(1))
            .max_retries(0)
            .build()
            .unwrap();
        let result = client
            .search_recordings(SearchQuery::recording("Closure", "Opeth"))
            .await;

        assert!(matches!(result, Err(MusicBrainzError::RateLimitExceeded)));
    }

    #[tokio::test]
    async fn test_api_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/recording"))
            .respond_with(ResponseTemplate::new(400).set_body_string("Invalid query"))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let result = client
            .search_recordings(SearchQuery::new("recording:\""))
            .await;

        match result {
            Err(MusicBrainzError::ApiError { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "Invalid query");
            }
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_json_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/recording"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let client = test_client(&mock_server);
        let result = client
            .search_recordings(SearchQuery::recording("Closure", "Opeth"))
            .await;

        assert!(matches!(result, Err(MusicBrainzError::InvalidResponse(_))));
    }

    #[test]
    fn test_builder_with_trailing_slash_base_url() {
        let client = MusicBrainzClient::builder()
            .base_url("http://localhost:1234/")
            .timeout(Duration::from_secs(5))
            .build();
        assert!(client.is_ok());
    }

    #[test]
    fn test_builder_rejects_invalid_base_url() {
        let client = MusicBrainzClient::builder().base_url("not a url").build();
        assert!(matches!(client, Err(MusicBrainzError::InvalidUrl(_))));
    }
}
