//! Wire-level tests for the Spotify catalog client, driven by a scripted
//! HTTP transport so no network access is needed.

mod common;

use artist_lens::{CatalogClient, EngineError};
use common::{
    artist_search_response, audio_features_response, scripted_catalog, token_response,
    top_tracks_response, ScriptedResponse,
};

#[test_log::test(tokio::test)]
async fn test_lookup_artist_exchanges_credentials_then_searches() {
    let (catalog, client) =
        scripted_catalog(vec![token_response(), artist_search_response()]);

    let artist = catalog.lookup_artist("Radiohead").await.unwrap();
    let artist = artist.expect("artist should be found");
    assert_eq!(artist.id, "4Z8W4fKeB5YxbusRsdQVPb");
    assert_eq!(artist.popularity, 79);

    let requests = client.recorded();
    assert_eq!(requests.len(), 2);

    // Client-credentials exchange with a Basic header over id:secret.
    assert_eq!(requests[0].method, "POST");
    assert!(requests[0].url.starts_with("https://accounts.spotify.com/api/token"));
    assert_eq!(
        requests[0].authorization.as_deref(),
        Some("Basic dGVzdC1pZDp0ZXN0LXNlY3JldA==")
    );

    // Search carries the bearer token from the exchange.
    assert_eq!(requests[1].method, "GET");
    assert!(requests[1].url.contains("/search?q=Radiohead&type=artist&limit=1"));
    assert_eq!(
        requests[1].authorization.as_deref(),
        Some("Bearer test-token-abc")
    );
}

#[test_log::test(tokio::test)]
async fn test_queries_are_url_encoded() {
    let (catalog, client) =
        scripted_catalog(vec![token_response(), artist_search_response()]);

    catalog.lookup_artist("Daft Punk & Friends").await.unwrap();

    let requests = client.recorded();
    assert!(requests[1].url.contains("q=Daft%20Punk%20%26%20Friends"));
}

#[test_log::test(tokio::test)]
async fn test_token_is_cached_across_calls() {
    let (catalog, client) = scripted_catalog(vec![
        token_response(),
        artist_search_response(),
        artist_search_response(),
    ]);

    catalog.lookup_artist("Radiohead").await.unwrap();
    catalog.lookup_artist("Radiohead").await.unwrap();

    // One token exchange, two searches.
    let requests = client.recorded();
    assert_eq!(requests.len(), 3);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[1].method, "GET");
    assert_eq!(requests[2].method, "GET");
}

#[test_log::test(tokio::test)]
async fn test_stale_token_is_refreshed_once() {
    let (catalog, client) = scripted_catalog(vec![
        token_response(),
        ScriptedResponse::status_only(401),
        token_response(),
        artist_search_response(),
    ]);

    let artist = catalog.lookup_artist("Radiohead").await.unwrap();
    assert!(artist.is_some());

    // token, rejected search, fresh token, retried search
    let requests = client.recorded();
    assert_eq!(requests.len(), 4);
    assert_eq!(requests[2].method, "POST");
}

#[test_log::test(tokio::test)]
async fn test_rate_limit_surfaces_the_retry_after_hint() {
    let (catalog, _client) = scripted_catalog(vec![
        token_response(),
        ScriptedResponse::status_only(429).with_header("Retry-After", "30"),
    ]);

    let result = catalog.lookup_artist("Radiohead").await;
    match result {
        Err(EngineError::RateLimited { retry_after }) => assert_eq!(retry_after, 30),
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[test_log::test(tokio::test)]
async fn test_top_track_features_full_flow() {
    let (catalog, client) = scripted_catalog(vec![
        token_response(),
        top_tracks_response(),
        audio_features_response(),
    ]);

    let fetched = catalog.top_track_features("artist-1").await.unwrap();
    assert_eq!(fetched.features.len(), 2);
    assert_eq!(fetched.unavailable, 0);
    assert!(!fetched.is_partial());

    let requests = client.recorded();
    assert!(requests[1].url.contains("/artists/artist-1/top-tracks?market=US"));
    assert!(requests[2].url.contains("/audio-features?ids=track-1,track-2"));
}

#[test_log::test(tokio::test)]
async fn test_forbidden_features_degrade_to_partial_data() {
    let (catalog, _client) = scripted_catalog(vec![
        token_response(),
        top_tracks_response(),
        ScriptedResponse::status_only(403),
    ]);

    let fetched = catalog.top_track_features("artist-1").await.unwrap();
    assert!(fetched.features.is_empty());
    assert_eq!(fetched.unavailable, 2);
    assert!(fetched.is_partial());
}

#[test_log::test(tokio::test)]
async fn test_artist_without_top_tracks_skips_the_features_call() {
    let (catalog, client) = scripted_catalog(vec![
        token_response(),
        ScriptedResponse::json(200, r#"{"tracks":[]}"#),
    ]);

    let fetched = catalog.top_track_features("artist-1").await.unwrap();
    assert!(fetched.features.is_empty());
    assert_eq!(fetched.unavailable, 0);

    assert_eq!(client.recorded().len(), 2);
}

#[test_log::test(tokio::test)]
async fn test_rejected_credentials_surface_as_auth_error() {
    let (catalog, _client) = scripted_catalog(vec![ScriptedResponse::json(
        400,
        r#"{"error":"invalid_client"}"#,
    )]);

    let result = catalog.lookup_artist("Radiohead").await;
    assert!(matches!(result, Err(EngineError::Auth(_))));
}

#[test_log::test(tokio::test)]
async fn test_server_errors_surface_as_http_errors() {
    let (catalog, _client) = scripted_catalog(vec![
        token_response(),
        ScriptedResponse::status_only(500),
    ]);

    let result = catalog.lookup_artist("Radiohead").await;
    assert!(matches!(result, Err(EngineError::Http(_))));
}

#[test_log::test(tokio::test)]
async fn test_ping_probes_the_token_endpoint() {
    let (catalog, _client) = scripted_catalog(vec![token_response()]);
    assert!(catalog.ping().await);

    let (catalog, _client) = scripted_catalog(vec![ScriptedResponse::status_only(503)]);
    assert!(!catalog.ping().await);
}
