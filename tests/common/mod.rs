#![allow(dead_code)]
use artist_lens::{
    ArtistRef, CatalogClient, EngineError, Result, SpotifyCatalog, TopTracks, TrackFeatures,
};
use async_trait::async_trait;
use http_types::{Request, Response};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A catalog that serves scripted responses, for driving the engine through
/// specific scenarios without any network access.
pub struct ScriptedCatalog {
    artist: Option<ArtistRef>,
    fetched: TopTracks,
    reachable: bool,
    /// Errors served by `lookup_artist` before the scripted answer, in order.
    lookup_failures: Mutex<VecDeque<EngineError>>,
}

impl ScriptedCatalog {
    pub fn found(artist: ArtistRef, fetched: TopTracks) -> Self {
        Self {
            artist: Some(artist),
            fetched,
            reachable: true,
            lookup_failures: Mutex::new(VecDeque::new()),
        }
    }

    pub fn missing() -> Self {
        Self {
            artist: None,
            fetched: TopTracks::default(),
            reachable: true,
            lookup_failures: Mutex::new(VecDeque::new()),
        }
    }

    pub fn unreachable() -> Self {
        let mut catalog = Self::missing();
        catalog.reachable = false;
        catalog
    }

    pub fn with_lookup_failures(self, failures: Vec<EngineError>) -> Self {
        *self.lookup_failures.lock().unwrap() = failures.into();
        self
    }
}

#[async_trait]
impl CatalogClient for ScriptedCatalog {
    async fn lookup_artist(&self, _name: &str) -> Result<Option<ArtistRef>> {
        if let Some(error) = self.lookup_failures.lock().unwrap().pop_front() {
            return Err(error);
        }
        Ok(self.artist.clone())
    }

    async fn top_track_features(&self, _artist_id: &str) -> Result<TopTracks> {
        Ok(self.fetched.clone())
    }

    async fn ping(&self) -> bool {
        self.reachable
    }
}

pub fn artist(id: &str, name: &str, genres: &[&str], popularity: u8) -> ArtistRef {
    ArtistRef {
        id: id.to_string(),
        name: name.to_string(),
        genres: genres.iter().map(|g| g.to_string()).collect(),
        popularity,
    }
}

pub fn track(
    id: &str,
    energy: f64,
    danceability: f64,
    valence: f64,
    acousticness: f64,
    tempo: f64,
) -> TrackFeatures {
    TrackFeatures {
        track_id: id.to_string(),
        energy,
        danceability,
        valence,
        acousticness,
        instrumentalness: 0.0,
        tempo,
    }
}

/// `count` identical tracks, which keeps every per-dimension deviation at
/// zero and makes expected scores easy to reason about.
pub fn uniform_tracks(
    count: usize,
    energy: f64,
    danceability: f64,
    valence: f64,
    acousticness: f64,
    tempo: f64,
) -> TopTracks {
    let features = (0..count)
        .map(|i| {
            track(
                &format!("track-{i}"),
                energy,
                danceability,
                valence,
                acousticness,
                tempo,
            )
        })
        .collect();
    TopTracks {
        features,
        unavailable: 0,
    }
}

/// What the scripted transport saw for one request, for asserting on the wire.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub authorization: Option<String>,
}

#[derive(Debug)]
pub struct ScriptedResponse {
    status: u16,
    body: String,
    headers: Vec<(String, String)>,
}

impl ScriptedResponse {
    pub fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
        }
    }

    pub fn status_only(status: u16) -> Self {
        Self {
            status,
            body: String::new(),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// Serves canned responses in order and records every request it sees.
#[derive(Debug, Clone)]
pub struct ScriptedHttpClient {
    responses: Arc<Mutex<VecDeque<ScriptedResponse>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl ScriptedHttpClient {
    pub fn new(responses: Vec<ScriptedResponse>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses.into())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn recorded(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl http_client::HttpClient for ScriptedHttpClient {
    async fn send(&self, req: Request) -> std::result::Result<Response, http_types::Error> {
        let responses = Arc::clone(&self.responses);
        let requests = Arc::clone(&self.requests);
        requests.lock().unwrap().push(RecordedRequest {
            method: req.method().to_string(),
            url: req.url().to_string(),
            authorization: req
                .header("Authorization")
                .map(|values| values.last().as_str().to_string()),
        });

        let scripted = responses.lock().unwrap().pop_front();
        match scripted {
            Some(scripted) => {
                let mut response = Response::new(scripted.status);
                for (name, value) in &scripted.headers {
                    let _ = response.insert_header(name.as_str(), value.as_str());
                }
                response.set_body(scripted.body);
                Ok(response)
            }
            None => Err(http_types::Error::from_str(
                http_types::StatusCode::ServiceUnavailable,
                "no scripted response left",
            )),
        }
    }
}

/// A catalog wired to a scripted transport, plus a handle for inspecting the
/// requests it sent.
pub fn scripted_catalog(responses: Vec<ScriptedResponse>) -> (SpotifyCatalog, ScriptedHttpClient) {
    let client = ScriptedHttpClient::new(responses);
    let catalog = SpotifyCatalog::new(Box::new(client.clone()), "test-id", "test-secret");
    (catalog, client)
}

pub fn token_response() -> ScriptedResponse {
    ScriptedResponse::json(
        200,
        r#"{"access_token":"test-token-abc","token_type":"Bearer","expires_in":3600}"#,
    )
}

pub fn artist_search_response() -> ScriptedResponse {
    ScriptedResponse::json(
        200,
        r#"{"artists":{"items":[{"id":"4Z8W4fKeB5YxbusRsdQVPb","name":"Radiohead","genres":["art rock","rock"],"popularity":79}]}}"#,
    )
}

pub fn top_tracks_response() -> ScriptedResponse {
    ScriptedResponse::json(
        200,
        r#"{"tracks":[{"id":"track-1","name":"First"},{"id":"track-2","name":"Second"}]}"#,
    )
}

pub fn audio_features_response() -> ScriptedResponse {
    ScriptedResponse::json(
        200,
        r#"{"audio_features":[
            {"id":"track-1","energy":0.9,"danceability":0.7,"valence":0.85,"acousticness":0.1,"instrumentalness":0.0,"tempo":128.0},
            {"id":"track-2","energy":0.8,"danceability":0.6,"valence":0.8,"acousticness":0.15,"instrumentalness":0.05,"tempo":124.0}
        ]}"#,
    )
}
