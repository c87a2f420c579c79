//! Data types for artist analysis.
//!
//! This module contains the core data structures used throughout the crate:
//! catalog metadata, per-track audio features, derived aggregate statistics,
//! mood/complexity scores, persona insights, configuration, and the event
//! system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tokio::sync::{broadcast, watch};

// ================================================================================================
// CATALOG METADATA
// ================================================================================================

/// A resolved artist, as returned by the catalog search.
///
/// Immutable once fetched; every analysis request resolves its own copy.
///
/// # Examples
///
/// ```rust
/// use artist_lens::ArtistRef;
///
/// let artist = ArtistRef {
///     id: "4Z8W4fKeB5YxbusRsdQVPb".to_string(),
///     name: "Radiohead".to_string(),
///     genres: ["art rock", "oxford indie"]
///         .into_iter()
///         .map(String::from)
///         .collect(),
///     popularity: 82,
/// };
///
/// println!("{} ({} genres)", artist.name, artist.genres.len());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtistRef {
    /// Catalog identifier, unique within the provider
    pub id: String,
    /// Display name
    pub name: String,
    /// Genre labels attached by the catalog, deduplicated and ordered
    pub genres: BTreeSet<String>,
    /// Catalog popularity score, 0-100
    pub popularity: u8,
}

/// Audio feature descriptors for a single track.
///
/// All unit dimensions are in `[0.0, 1.0]`; `tempo` is in BPM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackFeatures {
    /// Catalog identifier of the track
    pub track_id: String,
    /// Intensity and activity
    pub energy: f64,
    /// Rhythmic suitability for dancing
    pub danceability: f64,
    /// Musical positiveness
    pub valence: f64,
    /// Confidence the track is acoustic
    pub acousticness: f64,
    /// Likelihood the track has no vocals
    pub instrumentalness: f64,
    /// Estimated tempo in beats per minute
    pub tempo: f64,
}

/// The feature set fetched for an artist's top tracks.
///
/// The catalog may decline to describe some tracks (missing feature rows,
/// or an authorization denial on the features endpoint). Those tracks are
/// counted in `unavailable` rather than failing the request; downstream
/// scoring sees a smaller sample and reports the result as partial.
///
/// # Examples
///
/// ```rust
/// use artist_lens::TopTracks;
///
/// let fetched = TopTracks {
///     features: vec![],
///     unavailable: 4,
/// };
/// assert!(fetched.is_partial());
/// assert!(fetched.features.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopTracks {
    /// Feature rows the catalog produced
    pub features: Vec<TrackFeatures>,
    /// Number of top tracks the catalog refused to describe
    pub unavailable: usize,
}

impl TopTracks {
    /// Whether any of the artist's top tracks came back without features.
    pub fn is_partial(&self) -> bool {
        self.unavailable > 0
    }
}

// ================================================================================================
// DERIVED ANALYSIS
// ================================================================================================

/// A feature dimension of [`AggregateStats`], used by trigger predicates.
///
/// Tempo is addressed separately since it is not unit-scaled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Dimension {
    Energy,
    Danceability,
    Valence,
    Acousticness,
    Instrumentalness,
}

/// Aggregate audio statistics over an artist's fetched top tracks.
///
/// Derived and immutable; recomputed for every request, never cached. When
/// no feature rows were available the *neutral* value is used: unit-range
/// means sit at the 0.5 midpoint, tempo at 120 BPM, all deviations at zero,
/// and `track_count` is 0 so downstream scorers treat the sample as
/// insufficient data.
///
/// # Examples
///
/// ```rust
/// use artist_lens::AggregateStats;
///
/// let neutral = AggregateStats::neutral();
/// assert_eq!(neutral.track_count, 0);
/// assert_eq!(neutral.mean_energy, 0.5);
/// assert_eq!(neutral.mean_tempo, 120.0);
/// assert!(neutral.is_insufficient());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub mean_energy: f64,
    pub mean_danceability: f64,
    pub mean_valence: f64,
    pub mean_acousticness: f64,
    pub mean_instrumentalness: f64,
    /// Mean tempo in BPM
    pub mean_tempo: f64,
    pub std_dev_energy: f64,
    pub std_dev_danceability: f64,
    pub std_dev_valence: f64,
    pub std_dev_acousticness: f64,
    pub std_dev_instrumentalness: f64,
    /// Tempo standard deviation in BPM
    pub std_dev_tempo: f64,
    /// Number of tracks the statistics were computed from
    pub track_count: usize,
}

impl AggregateStats {
    /// Neutral statistics for an artist with no describable tracks.
    pub fn neutral() -> Self {
        Self {
            mean_energy: 0.5,
            mean_danceability: 0.5,
            mean_valence: 0.5,
            mean_acousticness: 0.5,
            mean_instrumentalness: 0.5,
            mean_tempo: 120.0,
            std_dev_energy: 0.0,
            std_dev_danceability: 0.0,
            std_dev_valence: 0.0,
            std_dev_acousticness: 0.0,
            std_dev_instrumentalness: 0.0,
            std_dev_tempo: 0.0,
            track_count: 0,
        }
    }

    /// Whether the sample was too small to say anything meaningful.
    pub fn is_insufficient(&self) -> bool {
        self.track_count == 0
    }

    /// Mean of the given unit dimension.
    pub fn mean(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Energy => self.mean_energy,
            Dimension::Danceability => self.mean_danceability,
            Dimension::Valence => self.mean_valence,
            Dimension::Acousticness => self.mean_acousticness,
            Dimension::Instrumentalness => self.mean_instrumentalness,
        }
    }

    /// Standard deviation of the given unit dimension.
    pub fn std_dev(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::Energy => self.std_dev_energy,
            Dimension::Danceability => self.std_dev_danceability,
            Dimension::Valence => self.std_dev_valence,
            Dimension::Acousticness => self.std_dev_acousticness,
            Dimension::Instrumentalness => self.std_dev_instrumentalness,
        }
    }
}

/// Fixed mood vocabulary.
///
/// Declaration order is the tie-break priority: when two centroids are at
/// exactly the same distance, the earlier variant wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoodLabel {
    Energetic,
    Euphoric,
    Aggressive,
    Brooding,
    Melancholic,
    Contemplative,
    Serene,
    Balanced,
}

impl std::fmt::Display for MoodLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MoodLabel::Energetic => "Energetic",
            MoodLabel::Euphoric => "Euphoric",
            MoodLabel::Aggressive => "Aggressive",
            MoodLabel::Brooding => "Brooding",
            MoodLabel::Melancholic => "Melancholic",
            MoodLabel::Contemplative => "Contemplative",
            MoodLabel::Serene => "Serene",
            MoodLabel::Balanced => "Balanced",
        };
        write!(f, "{name}")
    }
}

/// The dominant mood of a discography, with a confidence in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodProfile {
    /// Nearest mood centroid
    pub label: MoodLabel,
    /// Separation-based confidence; floored at 0.1 for insufficient data
    pub confidence: f64,
}

/// One weighted contribution to a complexity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityFactor {
    /// Factor name, stable across releases
    pub name: String,
    /// Weighted contribution on the 0-100 scale
    pub contribution: f64,
}

/// Musical complexity on a 0-100 scale, with its contributing factors.
///
/// Factors are reported in declaration order so output is reproducible.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityScore {
    /// Clamped to `[0, 100]`
    pub value: f64,
    /// Ordered factor breakdown
    pub factors: Vec<ComplexityFactor>,
}

/// A rendered persona viewpoint over one analysis.
///
/// Freshly rendered per request; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaInsight {
    /// Stable persona identifier
    pub persona_id: String,
    /// Human-readable persona name
    pub persona_name: String,
    /// The persona's narrative for this artist
    pub narrative: String,
    /// Topic tags for grouping in a UI
    pub tags: BTreeSet<String>,
}

/// The complete outcome of one analysis request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// The resolved artist
    pub artist: ArtistRef,
    /// Aggregate audio statistics
    pub stats: AggregateStats,
    /// Dominant mood
    pub mood: MoodProfile,
    /// Complexity score with factor breakdown
    pub complexity: ComplexityScore,
    /// Selected persona insights, highest priority first
    pub insights: Vec<PersonaInsight>,
    /// When the analysis completed
    pub analyzed_at: DateTime<Utc>,
    /// Whether the catalog withheld features for some tracks
    pub partial_data: bool,
}

/// Overall service health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Degraded,
}

/// Health probe outcome.
///
/// Serializes with the documented field names:
/// `{"status": "ok", "catalogReachable": true}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: HealthStatus,
    pub catalog_reachable: bool,
}

// ================================================================================================
// CONFIGURATION
// ================================================================================================

/// Backoff policy for rate-limited catalog calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Retry budget; 0 means fail on the first rate limit.
    pub max_retries: u32,
    /// Starting wait in seconds, doubled on each retry.
    pub base_delay: u64,
    /// Ceiling in seconds for any single wait.
    pub max_delay: u64,
    /// Turns the whole retry loop on or off.
    pub enabled: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: 2,
            max_delay: 60,
            enabled: true,
        }
    }
}

impl RetryConfig {
    /// Policy that never retries.
    pub fn disabled() -> Self {
        Self {
            max_retries: 0,
            enabled: false,
            ..Default::default()
        }
    }

    /// Policy with a specific retry budget.
    pub fn with_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            enabled: max_retries > 0,
            ..Default::default()
        }
    }

    /// Policy with specific wait bounds.
    pub fn with_delays(base_delay: u64, max_delay: u64) -> Self {
        Self {
            base_delay,
            max_delay,
            ..Default::default()
        }
    }
}

/// Engine-wide configuration.
///
/// # Examples
///
/// ```rust
/// use artist_lens::EngineConfig;
///
/// let config = EngineConfig::new()
///     .with_max_retries(5)
///     .with_fetch_timeout(15)
///     .with_max_insights(8);
///
/// assert_eq!(config.retry.max_retries, 5);
/// assert_eq!(config.fetch_timeout, 15);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Retry configuration for catalog fetches
    pub retry: RetryConfig,
    /// Per-attempt fetch timeout (in seconds)
    pub fetch_timeout: u64,
    /// Insight cap per response, clamped to the 8-12 band on use
    pub max_insights: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            retry: RetryConfig::default(),
            fetch_timeout: 10,
            max_insights: 10,
        }
    }
}

impl EngineConfig {
    /// Fresh config with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Config whose retry loop is switched off.
    pub fn with_retries_disabled() -> Self {
        Self {
            retry: RetryConfig::disabled(),
            ..Default::default()
        }
    }

    /// Replace the whole retry policy.
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Adjust the retry budget, flipping `enabled` to match.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry.max_retries = max_retries;
        self.retry.enabled = max_retries > 0;
        self
    }

    /// Adjust backoff waits without touching the budget.
    pub fn with_retry_delays(mut self, base_delay: u64, max_delay: u64) -> Self {
        self.retry.base_delay = base_delay;
        self.retry.max_delay = max_delay;
        self
    }

    /// Set the per-attempt fetch timeout in seconds
    pub fn with_fetch_timeout(mut self, seconds: u64) -> Self {
        self.fetch_timeout = seconds;
        self
    }

    /// Set the insight cap (values outside 8-12 are clamped when applied)
    pub fn with_max_insights(mut self, max_insights: usize) -> Self {
        self.max_insights = max_insights;
        self
    }
}

// ================================================================================================
// EVENT SYSTEM
// ================================================================================================

/// Identifies one catalog request inside fetch events.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestInfo {
    /// HTTP method the request used.
    pub method: String,
    /// Complete request URL.
    pub url: String,
    /// Short endpoint label, "artist-search", "audio-features" and so on.
    pub endpoint: String,
}

impl RequestInfo {
    pub fn new(method: &str, url: &str, endpoint: &str) -> Self {
        Self {
            method: method.to_string(),
            url: url.to_string(),
            endpoint: endpoint.to_string(),
        }
    }

    /// Compact "METHOD endpoint" form for log lines.
    pub fn short_description(&self) -> String {
        format!("{} {}", self.method, self.endpoint)
    }
}

/// Pipeline stage of one analysis request.
///
/// `Failed` is reachable from `Fetching` only; once the fetch has
/// succeeded the remaining stages are pure and always complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalysisStage {
    Received,
    Fetching,
    Aggregating,
    Scoring,
    Rendering,
    Completed,
    Failed,
}

impl std::fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AnalysisStage::Received => "received",
            AnalysisStage::Fetching => "fetching",
            AnalysisStage::Aggregating => "aggregating",
            AnalysisStage::Scoring => "scoring",
            AnalysisStage::Rendering => "rendering",
            AnalysisStage::Completed => "completed",
            AnalysisStage::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

/// Activity notifications emitted while a request runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// An analysis request moved to a new pipeline stage
    StageChanged {
        /// The stage just entered
        stage: AnalysisStage,
    },
    /// Catalog request started
    FetchStarted {
        /// The request being made
        request: RequestInfo,
    },
    /// Catalog request completed
    FetchCompleted {
        /// The request that finished
        request: RequestInfo,
        /// Status returned by the catalog
        status_code: u16,
        /// Wall time spent on the request, in milliseconds
        duration_ms: u64,
    },
    /// Rate limiting detected; the engine is backing off
    RateLimited {
        /// Seconds the engine will sleep before the next attempt
        delay_seconds: u64,
        /// Retry attempt number (1-based)
        attempt: u32,
        /// Configured retry limit
        max_attempts: u32,
        /// The throttled request, when known
        request: Option<RequestInfo>,
    },
    /// An analysis request completed successfully
    AnalysisCompleted {
        /// Catalog id of the analyzed artist
        artist_id: String,
        /// Display name of the analyzed artist
        artist_name: String,
        /// Whether feature data was partial
        partial_data: bool,
        /// Number of insights rendered
        insight_count: usize,
        /// Completion time
        timestamp: DateTime<Utc>,
    },
}

/// Receiver half of the live event stream.
pub type EngineEventReceiver = broadcast::Receiver<EngineEvent>;

/// Receiver that always holds the most recent event.
pub type EngineEventWatcher = watch::Receiver<Option<EngineEvent>>;

/// Event fan-out shared by every clone of an engine or catalog.
#[derive(Clone)]
pub struct SharedEventBroadcaster {
    event_tx: broadcast::Sender<EngineEvent>,
    last_event_tx: watch::Sender<Option<EngineEvent>>,
}

impl SharedEventBroadcaster {
    /// Broadcaster with no subscribers and no event history.
    pub fn new() -> Self {
        let (event_tx, _) = broadcast::channel(64);
        let (last_event_tx, _) = watch::channel(None);

        Self {
            event_tx,
            last_event_tx,
        }
    }

    /// Push an event to live subscribers and remember it as the latest.
    pub fn broadcast_event(&self, event: EngineEvent) {
        let _ = self.event_tx.send(event.clone());
        let _ = self.last_event_tx.send(Some(event));
    }

    /// Open a new live subscription.
    pub fn subscribe(&self) -> EngineEventReceiver {
        self.event_tx.subscribe()
    }

    /// Most recent event, if any has fired.
    pub fn latest_event(&self) -> Option<EngineEvent> {
        self.last_event_tx.borrow().clone()
    }
}

impl Default for SharedEventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SharedEventBroadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedEventBroadcaster")
            .field("subscribers", &self.event_tx.receiver_count())
            .finish()
    }
}

// ================================================================================================
// TESTS
// ================================================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neutral_stats_midpoints() {
        let neutral = AggregateStats::neutral();
        assert_eq!(neutral.track_count, 0);
        assert!(neutral.is_insufficient());
        assert_eq!(neutral.mean(Dimension::Energy), 0.5);
        assert_eq!(neutral.mean(Dimension::Instrumentalness), 0.5);
        assert_eq!(neutral.mean_tempo, 120.0);
        assert_eq!(neutral.std_dev(Dimension::Valence), 0.0);
        assert_eq!(neutral.std_dev_tempo, 0.0);
    }

    #[test]
    fn test_partial_top_tracks() {
        let complete = TopTracks {
            features: vec![],
            unavailable: 0,
        };
        assert!(!complete.is_partial());

        let partial = TopTracks {
            features: vec![],
            unavailable: 3,
        };
        assert!(partial.is_partial());
    }

    #[test]
    fn test_health_report_serialization() {
        let report = HealthReport {
            status: HealthStatus::Ok,
            catalog_reachable: true,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(json, r#"{"status":"ok","catalogReachable":true}"#);

        let degraded = HealthReport {
            status: HealthStatus::Degraded,
            catalog_reachable: false,
        };
        let json = serde_json::to_string(&degraded).unwrap();
        assert!(json.contains(r#""status":"degraded""#));
    }

    #[test]
    fn test_engine_config_builder() {
        let config = EngineConfig::new()
            .with_max_retries(5)
            .with_retry_delays(1, 30)
            .with_fetch_timeout(20)
            .with_max_insights(12);

        assert_eq!(config.retry.max_retries, 5);
        assert!(config.retry.enabled);
        assert_eq!(config.retry.base_delay, 1);
        assert_eq!(config.retry.max_delay, 30);
        assert_eq!(config.fetch_timeout, 20);
        assert_eq!(config.max_insights, 12);

        let disabled = EngineConfig::new().with_max_retries(0);
        assert!(!disabled.retry.enabled);
    }

    #[test]
    fn test_request_info_description() {
        let info = RequestInfo::new(
            "GET",
            "https://api.spotify.com/v1/search?q=radiohead&type=artist",
            "artist-search",
        );
        assert_eq!(info.short_description(), "GET artist-search");
    }

    #[test]
    fn test_mood_label_display() {
        assert_eq!(MoodLabel::Euphoric.to_string(), "Euphoric");
        assert_eq!(MoodLabel::Contemplative.to_string(), "Contemplative");
    }

    #[test]
    fn test_broadcaster_latest_event() {
        let broadcaster = SharedEventBroadcaster::new();
        assert!(broadcaster.latest_event().is_none());

        broadcaster.broadcast_event(EngineEvent::StageChanged {
            stage: AnalysisStage::Fetching,
        });

        match broadcaster.latest_event() {
            Some(EngineEvent::StageChanged { stage }) => {
                assert_eq!(stage, AnalysisStage::Fetching);
            }
            other => panic!("unexpected latest event: {other:?}"),
        }
    }
}
