//! Spotify-backed implementation of [`CatalogClient`].
//!
//! Speaks the Web API's client-credentials flow: a cached bearer token is
//! obtained from the accounts service and attached to every catalog request,
//! with a single transparent refresh when the catalog rejects a stale token.
//! Rate limiting (HTTP 429) is surfaced as [`EngineError::RateLimited`] so
//! the retry layer can honor the server's `Retry-After` hint.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use http_client::HttpClient;
use http_types::{Method, Request, Response, Url};
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::catalog::CatalogClient;
use crate::{
    ArtistRef, EngineError, EngineEvent, EngineEventReceiver, RequestInfo, Result,
    SharedEventBroadcaster, TopTracks, TrackFeatures,
};

const DEFAULT_BASE_URL: &str = "https://api.spotify.com/v1";
const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_MARKET: &str = "US";

/// Fallback delay when a 429 response carries no usable `Retry-After` header.
const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// Refresh tokens this many seconds before their advertised expiry.
const TOKEN_EXPIRY_MARGIN_SECS: u64 = 30;

/// Number of top tracks requested per artist.
const TOP_TRACK_LIMIT: usize = 10;

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

/// Spotify Web API catalog client.
///
/// Cloning is cheap and clones share the token cache and event broadcaster.
///
/// # Examples
///
/// ```rust,no_run
/// use artist_lens::SpotifyCatalog;
///
/// let catalog = SpotifyCatalog::new(
///     Box::new(http_client::native::NativeClient::new()),
///     "client-id",
///     "client-secret",
/// );
/// ```
#[derive(Clone)]
pub struct SpotifyCatalog {
    client: Arc<dyn HttpClient + Send + Sync>,
    client_id: String,
    client_secret: String,
    base_url: String,
    token_url: String,
    market: String,
    token: Arc<Mutex<Option<CachedToken>>>,
    broadcaster: Arc<SharedEventBroadcaster>,
}

impl std::fmt::Debug for SpotifyCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyCatalog")
            .field("base_url", &self.base_url)
            .field("market", &self.market)
            .finish()
    }
}

impl SpotifyCatalog {
    /// Create a client that authenticates with the given application
    /// credentials. No network traffic happens until the first request.
    pub fn new(
        client: Box<dyn HttpClient + Send + Sync>,
        client_id: &str,
        client_secret: &str,
    ) -> Self {
        Self {
            client: Arc::from(client),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            market: DEFAULT_MARKET.to_string(),
            token: Arc::new(Mutex::new(None)),
            broadcaster: Arc::new(SharedEventBroadcaster::new()),
        }
    }

    /// Point the client at a different catalog root. Useful for tests and
    /// proxies.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Point the token exchange at a different accounts service.
    pub fn with_token_url(mut self, token_url: &str) -> Self {
        self.token_url = token_url.trim_end_matches('/').to_string();
        self
    }

    /// Market passed to the top-tracks endpoint (default `US`).
    pub fn with_market(mut self, market: &str) -> Self {
        self.market = market.to_string();
        self
    }

    /// Subscribe to request lifecycle events emitted by this client.
    pub fn subscribe(&self) -> EngineEventReceiver {
        self.broadcaster.subscribe()
    }

    /// Most recent event, if any. Useful for polling UIs.
    pub fn latest_event(&self) -> Option<EngineEvent> {
        self.broadcaster.latest_event()
    }

    // =============================================================================
    // Token handling
    // =============================================================================

    async fn access_token(&self) -> Result<String> {
        let mut guard = self.token.lock().await;
        if let Some(token) = guard.as_ref() {
            if token.is_valid() {
                return Ok(token.access_token.clone());
            }
        }
        let token = self.request_token().await?;
        let access = token.access_token.clone();
        *guard = Some(token);
        Ok(access)
    }

    async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    async fn request_token(&self) -> Result<CachedToken> {
        use base64::engine::general_purpose::STANDARD;
        use base64::Engine as _;

        let credentials =
            STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret));
        let url = parse_url(&self.token_url)?;

        let mut request = Request::new(Method::Post, url);
        let _ = request.insert_header("Authorization", format!("Basic {credentials}"));
        let _ = request.insert_header("Content-Type", "application/x-www-form-urlencoded");
        request.set_body("grant_type=client_credentials");

        let info = RequestInfo::new("POST", &self.token_url, "token");
        let mut response = self.dispatch(request, info).await?;

        if response.status() == 429 {
            return Err(rate_limit_error(&response));
        }
        if !response.status().is_success() {
            return Err(EngineError::Auth(format!(
                "token exchange failed with status {}",
                response.status()
            )));
        }

        let body = response
            .body_string()
            .await
            .map_err(|e| EngineError::Http(e.to_string()))?;
        let parsed: ApiTokenResponse =
            serde_json::from_str(&body).map_err(|e| EngineError::Parse(e.to_string()))?;

        log::debug!("Obtained catalog token valid for {}s", parsed.expires_in);
        Ok(CachedToken {
            access_token: parsed.access_token,
            expires_at: Instant::now()
                + Duration::from_secs(parsed.expires_in.saturating_sub(TOKEN_EXPIRY_MARGIN_SECS)),
        })
    }

    // =============================================================================
    // Request plumbing
    // =============================================================================

    /// Send a request, broadcasting start/completion events around it.
    async fn dispatch(&self, request: Request, info: RequestInfo) -> Result<Response> {
        self.broadcaster.broadcast_event(EngineEvent::FetchStarted {
            request: info.clone(),
        });

        let started = Instant::now();
        let result = self.client.send(request).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(response) => {
                self.broadcaster.broadcast_event(EngineEvent::FetchCompleted {
                    request: info,
                    status_code: response.status().into(),
                    duration_ms,
                });
                Ok(response)
            }
            Err(e) => Err(EngineError::Http(format!(
                "{} failed: {e}",
                info.short_description()
            ))),
        }
    }

    async fn send_get(
        &self,
        url: &str,
        endpoint: &'static str,
        token: &str,
    ) -> Result<Response> {
        let parsed = parse_url(url)?;
        let mut request = Request::new(Method::Get, parsed);
        let _ = request.insert_header("Authorization", format!("Bearer {token}"));

        let info = RequestInfo::new("GET", url, endpoint);
        self.dispatch(request, info).await
    }

    /// GET with a bearer token, refreshing the token once if the catalog
    /// rejects it as stale.
    async fn authorized_get(&self, url: &str, endpoint: &'static str) -> Result<Response> {
        let token = self.access_token().await?;
        let response = self.send_get(url, endpoint, &token).await?;

        if response.status() == 401 {
            log::debug!("Catalog rejected token on {endpoint}; refreshing and retrying once");
            self.invalidate_token().await;
            let token = self.access_token().await?;
            return self.send_get(url, endpoint, &token).await;
        }
        Ok(response)
    }

    fn ensure_success(&self, response: &Response, context: &str) -> Result<()> {
        if response.status() == 429 {
            return Err(rate_limit_error(response));
        }
        if response.status() == 401 || response.status() == 403 {
            return Err(EngineError::Auth(format!(
                "{context} denied with status {}",
                response.status()
            )));
        }
        if !response.status().is_success() {
            return Err(EngineError::Http(format!(
                "{context} failed with status {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn read_body(&self, response: &mut Response) -> Result<String> {
        response
            .body_string()
            .await
            .map_err(|e| EngineError::Http(e.to_string()))
    }

    // =============================================================================
    // Endpoints
    // =============================================================================

    async fn fetch_top_track_ids(&self, artist_id: &str) -> Result<Vec<String>> {
        let url = format!(
            "{}/artists/{}/top-tracks?market={}",
            self.base_url,
            urlencoding::encode(artist_id),
            self.market
        );
        let mut response = self.authorized_get(&url, "top-tracks").await?;
        self.ensure_success(&response, "top tracks request")?;

        let body = self.read_body(&mut response).await?;
        let mut ids = parse_top_tracks_response(&body)?;
        ids.truncate(TOP_TRACK_LIMIT);
        Ok(ids)
    }

    async fn fetch_audio_features(&self, track_ids: &[String]) -> Result<TopTracks> {
        let url = format!(
            "{}/audio-features?ids={}",
            self.base_url,
            track_ids.join(",")
        );
        let mut response = self.authorized_get(&url, "audio-features").await?;

        // Some catalog tiers withhold audio features entirely. That is
        // degraded data, not a failed analysis.
        if response.status() == 403 {
            log::warn!(
                "Catalog withheld audio features for {} tracks; continuing with partial data",
                track_ids.len()
            );
            return Ok(TopTracks {
                features: Vec::new(),
                unavailable: track_ids.len(),
            });
        }
        self.ensure_success(&response, "audio features request")?;

        let body = self.read_body(&mut response).await?;
        parse_audio_features_response(&body, track_ids.len())
    }
}

#[async_trait]
impl CatalogClient for SpotifyCatalog {
    async fn lookup_artist(&self, name: &str) -> Result<Option<ArtistRef>> {
        let url = format!(
            "{}/search?q={}&type=artist&limit=1",
            self.base_url,
            urlencoding::encode(name)
        );
        let mut response = self.authorized_get(&url, "artist-search").await?;
        self.ensure_success(&response, "artist search")?;

        let body = self.read_body(&mut response).await?;
        parse_artist_search_response(&body)
    }

    async fn top_track_features(&self, artist_id: &str) -> Result<TopTracks> {
        let track_ids = self.fetch_top_track_ids(artist_id).await?;
        if track_ids.is_empty() {
            log::info!("Artist {artist_id} has no top tracks in market {}", self.market);
            return Ok(TopTracks::default());
        }
        self.fetch_audio_features(&track_ids).await
    }

    async fn ping(&self) -> bool {
        // A successful token exchange proves the provider is reachable and
        // our credentials are accepted.
        self.access_token().await.is_ok()
    }
}

fn parse_url(url: &str) -> Result<Url> {
    url.parse::<Url>()
        .map_err(|e| EngineError::Parse(format!("invalid url '{url}': {e}")))
}

/// Build a [`EngineError::RateLimited`] from a 429 response, honoring the
/// `Retry-After` header when the server sends one.
fn rate_limit_error(response: &Response) -> EngineError {
    let retry_after = response
        .header("Retry-After")
        .and_then(|values| values.last().as_str().parse::<u64>().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
    EngineError::RateLimited { retry_after }
}

// =============================================================================
// Wire format
// =============================================================================

#[derive(Debug, Deserialize)]
struct ApiTokenResponse {
    access_token: String,
    #[serde(default = "default_token_lifetime")]
    expires_in: u64,
}

fn default_token_lifetime() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
struct ApiArtistSearchResponse {
    artists: ApiArtistPage,
}

#[derive(Debug, Deserialize)]
struct ApiArtistPage {
    #[serde(default)]
    items: Vec<ApiArtist>,
}

#[derive(Debug, Deserialize)]
struct ApiArtist {
    id: String,
    name: String,
    #[serde(default)]
    genres: Vec<String>,
    #[serde(default)]
    popularity: u8,
}

#[derive(Debug, Deserialize)]
struct ApiTopTracksResponse {
    #[serde(default)]
    tracks: Vec<ApiTopTrack>,
}

#[derive(Debug, Deserialize)]
struct ApiTopTrack {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ApiAudioFeaturesResponse {
    #[serde(default)]
    audio_features: Vec<Option<ApiAudioFeatures>>,
}

#[derive(Debug, Deserialize)]
struct ApiAudioFeatures {
    id: String,
    energy: f64,
    danceability: f64,
    valence: f64,
    acousticness: f64,
    instrumentalness: f64,
    tempo: f64,
}

fn parse_artist_search_response(json: &str) -> Result<Option<ArtistRef>> {
    let response: ApiArtistSearchResponse =
        serde_json::from_str(json).map_err(|e| EngineError::Parse(e.to_string()))?;

    Ok(response.artists.items.into_iter().next().map(|artist| ArtistRef {
        id: artist.id,
        name: artist.name,
        genres: artist.genres.into_iter().collect(),
        popularity: artist.popularity,
    }))
}

fn parse_top_tracks_response(json: &str) -> Result<Vec<String>> {
    let response: ApiTopTracksResponse =
        serde_json::from_str(json).map_err(|e| EngineError::Parse(e.to_string()))?;
    Ok(response.tracks.into_iter().map(|track| track.id).collect())
}

/// Parse a batch audio-features response. The array mirrors the requested
/// ids, with `null` holes for tracks the catalog has no analysis for; holes
/// and missing tail entries both count as unavailable.
fn parse_audio_features_response(json: &str, requested: usize) -> Result<TopTracks> {
    let response: ApiAudioFeaturesResponse =
        serde_json::from_str(json).map_err(|e| EngineError::Parse(e.to_string()))?;

    let features: Vec<TrackFeatures> = response
        .audio_features
        .into_iter()
        .flatten()
        .map(|f| TrackFeatures {
            track_id: f.id,
            energy: f.energy,
            danceability: f.danceability,
            valence: f.valence,
            acousticness: f.acousticness,
            instrumentalness: f.instrumentalness,
            tempo: f.tempo,
        })
        .collect();

    let unavailable = requested.saturating_sub(features.len());
    Ok(TopTracks {
        features,
        unavailable,
    })
}
