//! Analysis orchestrator.
//!
//! [`AnalysisEngine`] drives a query through the full pipeline: validation,
//! catalog fetches (with rate-limit retries), feature aggregation, mood and
//! complexity scoring, and persona rendering. Stage transitions and retry
//! waits are broadcast as [`EngineEvent`]s so UIs can follow along.
//!
//! The engine is deliberately stateless about history: callers own the
//! query log and decide what gets recorded (see [`crate::history`]).

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::aggregate::aggregate;
use crate::cancel::CancelToken;
use crate::catalog::CatalogClient;
use crate::persona::{AnalysisContext, PersonaLibrary};
use crate::retry::run_with_retries;
use crate::scoring::{score_complexity, score_mood};
use crate::{
    AnalysisResult, AnalysisStage, ArtistRef, EngineConfig, EngineError, EngineEvent,
    EngineEventReceiver, HealthReport, HealthStatus, Result, SharedEventBroadcaster, TopTracks,
};

/// Maximum accepted query length, in characters.
pub const MAX_QUERY_CHARS: usize = 100;

/// The analysis pipeline, generic over any [`CatalogClient`].
///
/// Cloning is cheap; clones share the catalog, persona library, event
/// broadcaster, and cancellation flag.
///
/// # Examples
///
/// ```rust,no_run
/// use artist_lens::{AnalysisEngine, EngineConfig, SpotifyCatalog};
///
/// # tokio_test::block_on(async {
/// let catalog = SpotifyCatalog::new(
///     Box::new(http_client::native::NativeClient::new()),
///     "client-id",
///     "client-secret",
/// );
/// let engine = AnalysisEngine::new(Box::new(catalog))
///     .with_config(EngineConfig::new().with_max_insights(12));
///
/// let result = engine.analyze("nina simone").await?;
/// println!("{} reads as {}", result.artist.name, result.mood.label);
/// for insight in &result.insights {
///     println!("[{}] {}", insight.persona_name, insight.narrative);
/// }
/// # Ok::<(), artist_lens::EngineError>(())
/// # });
/// ```
#[derive(Clone)]
pub struct AnalysisEngine {
    catalog: Arc<dyn CatalogClient>,
    config: EngineConfig,
    library: Arc<PersonaLibrary>,
    broadcaster: Arc<SharedEventBroadcaster>,
    cancel: CancelToken,
}

impl std::fmt::Debug for AnalysisEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalysisEngine")
            .field("config", &self.config)
            .field("personas", &self.library.len())
            .finish()
    }
}

impl AnalysisEngine {
    /// Create an engine with the default configuration and the standard
    /// persona library.
    pub fn new(catalog: Box<dyn CatalogClient>) -> Self {
        Self {
            catalog: Arc::from(catalog),
            config: EngineConfig::new(),
            library: Arc::new(PersonaLibrary::standard()),
            broadcaster: Arc::new(SharedEventBroadcaster::new()),
            cancel: CancelToken::new(),
        }
    }

    /// Replace the engine configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the persona library, e.g. with [`PersonaLibrary::custom`].
    pub fn with_library(mut self, library: PersonaLibrary) -> Self {
        self.library = Arc::new(library);
        self
    }

    /// Current engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Subscribe to stage transitions, retry waits, and completion events.
    pub fn subscribe(&self) -> EngineEventReceiver {
        self.broadcaster.subscribe()
    }

    /// Most recent event, if any.
    pub fn latest_event(&self) -> Option<EngineEvent> {
        self.broadcaster.latest_event()
    }

    /// Abort in-flight retry waits. Analyses already past their fetches run
    /// to completion; the flag stays set until [`reset_cancellation`] is
    /// called.
    ///
    /// [`reset_cancellation`]: AnalysisEngine::reset_cancellation
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Clear the cancellation flag so new analyses can retry again.
    pub fn reset_cancellation(&self) {
        self.cancel.reset();
    }

    /// Validate a raw artist query, returning the trimmed form.
    ///
    /// Rejections are [`EngineError::InvalidInput`] and happen before any
    /// catalog traffic.
    pub fn validate_query(query: &str) -> Result<String> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(EngineError::InvalidInput(
                "artist query must not be empty".to_string(),
            ));
        }
        if trimmed.chars().count() > MAX_QUERY_CHARS {
            return Err(EngineError::InvalidInput(format!(
                "artist query exceeds {MAX_QUERY_CHARS} characters"
            )));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(EngineError::InvalidInput(
                "artist query must not contain control characters".to_string(),
            ));
        }
        Ok(trimmed.to_string())
    }

    /// Run the full pipeline for one artist query.
    ///
    /// A successful analysis always carries scores and insights, even when
    /// the catalog had no per-track features (the result is then marked as
    /// low confidence rather than failing). Errors surface as
    /// [`EngineError::InvalidInput`], [`EngineError::NotFound`], or
    /// [`EngineError::ProviderUnavailable`].
    pub async fn analyze(&self, query: &str) -> Result<AnalysisResult> {
        self.set_stage(AnalysisStage::Received);
        let query = Self::validate_query(query)?;

        self.set_stage(AnalysisStage::Fetching);
        let artist = match self.fetch_artist(&query).await {
            Ok(Some(artist)) => artist,
            Ok(None) => {
                log::info!("No artist found for query '{query}'");
                self.set_stage(AnalysisStage::Failed);
                return Err(EngineError::NotFound(query));
            }
            Err(e) => return Err(self.fail_fetch(e)),
        };
        let fetched = match self.fetch_features(&artist.id).await {
            Ok(fetched) => fetched,
            Err(e) => return Err(self.fail_fetch(e)),
        };

        // From here on the pipeline is pure and cannot fail.
        self.set_stage(AnalysisStage::Aggregating);
        let stats = aggregate(&fetched.features);

        self.set_stage(AnalysisStage::Scoring);
        let mood = score_mood(&stats);
        let complexity = score_complexity(&stats, artist.genres.len());

        self.set_stage(AnalysisStage::Rendering);
        let ctx = AnalysisContext {
            artist: &artist,
            stats: &stats,
            mood: &mood,
            complexity: &complexity,
        };
        let insights = self.library.render(&ctx, self.config.max_insights);

        let result = AnalysisResult {
            partial_data: fetched.is_partial(),
            analyzed_at: Utc::now(),
            artist,
            stats,
            mood,
            complexity,
            insights,
        };

        self.set_stage(AnalysisStage::Completed);
        self.broadcaster
            .broadcast_event(EngineEvent::AnalysisCompleted {
                artist_id: result.artist.id.clone(),
                artist_name: result.artist.name.clone(),
                partial_data: result.partial_data,
                insight_count: result.insights.len(),
                timestamp: result.analyzed_at,
            });
        log::info!(
            "Analysis of '{}' completed: mood {} ({:.0}% confidence), complexity {:.0}, {} insights{}",
            result.artist.name,
            result.mood.label,
            result.mood.confidence * 100.0,
            result.complexity.value,
            result.insights.len(),
            if result.partial_data { " [partial data]" } else { "" }
        );
        Ok(result)
    }

    /// Check whether the catalog is reachable.
    pub async fn health(&self) -> HealthReport {
        let reachable = self.catalog.ping().await;
        if !reachable {
            log::warn!("Catalog ping failed; reporting degraded health");
        }
        HealthReport {
            status: if reachable {
                HealthStatus::Ok
            } else {
                HealthStatus::Degraded
            },
            catalog_reachable: reachable,
        }
    }

    // =============================================================================
    // Fetch plumbing
    // =============================================================================

    async fn fetch_artist(&self, query: &str) -> Result<Option<ArtistRef>> {
        let catalog = Arc::clone(&self.catalog);
        let timeout = Duration::from_secs(self.config.fetch_timeout);
        self.fetch_with_retry("artist lookup", move || {
            let catalog = Arc::clone(&catalog);
            let query = query.to_string();
            async move { bounded(timeout, catalog.lookup_artist(&query)).await }
        })
        .await
    }

    async fn fetch_features(&self, artist_id: &str) -> Result<TopTracks> {
        let catalog = Arc::clone(&self.catalog);
        let timeout = Duration::from_secs(self.config.fetch_timeout);
        self.fetch_with_retry("feature fetch", move || {
            let catalog = Arc::clone(&catalog);
            let artist_id = artist_id.to_string();
            async move { bounded(timeout, catalog.top_track_features(&artist_id)).await }
        })
        .await
    }

    /// Run one catalog operation under the retry policy, surfacing backoff
    /// waits as [`EngineEvent::RateLimited`].
    async fn fetch_with_retry<T, F, Fut>(&self, operation_name: &str, operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let broadcaster = Arc::clone(&self.broadcaster);
        let max_attempts = self.config.retry.max_retries;
        let outcome = run_with_retries(
            self.config.retry.clone(),
            self.cancel.watch(),
            operation_name,
            operation,
            |delay_seconds, attempt| {
                broadcaster.broadcast_event(EngineEvent::RateLimited {
                    delay_seconds,
                    attempt,
                    max_attempts,
                    request: None,
                });
            },
        )
        .await?;
        Ok(outcome.value)
    }

    fn fail_fetch(&self, error: EngineError) -> EngineError {
        let folded = fold_provider_error(error);
        if !folded.is_cancelled() {
            log::warn!("Catalog fetch failed: {folded}");
        }
        self.set_stage(AnalysisStage::Failed);
        folded
    }

    fn set_stage(&self, stage: AnalysisStage) {
        log::debug!("Analysis stage: {stage}");
        self.broadcaster
            .broadcast_event(EngineEvent::StageChanged { stage });
    }
}

async fn bounded<T>(limit: Duration, operation: impl Future<Output = Result<T>>) -> Result<T> {
    match tokio::time::timeout(limit, operation).await {
        Ok(result) => result,
        Err(_) => Err(EngineError::Http(format!(
            "catalog request timed out after {}s",
            limit.as_secs()
        ))),
    }
}

/// Collapse transport-level failures into the caller-facing taxonomy.
/// Cancellation and the pre-fetch errors pass through untouched.
fn fold_provider_error(error: EngineError) -> EngineError {
    match error {
        EngineError::Http(message) => EngineError::ProviderUnavailable(message),
        EngineError::Auth(message) => {
            EngineError::ProviderUnavailable(format!("authentication failed: {message}"))
        }
        EngineError::Parse(message) => {
            EngineError::ProviderUnavailable(format!("unexpected catalog response: {message}"))
        }
        EngineError::RateLimited { retry_after } => EngineError::ProviderUnavailable(format!(
            "rate limited by provider; retry after {retry_after}s"
        )),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MoodLabel, TrackFeatures};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    enum LookupScript {
        Found(ArtistRef),
        Missing,
        HttpError,
        RateLimitedForever,
        RateLimitedTimes(u32),
    }

    struct StubCatalog {
        script: LookupScript,
        fetched: TopTracks,
        reachable: bool,
        lookup_calls: Arc<AtomicU32>,
    }

    impl StubCatalog {
        fn new(script: LookupScript, fetched: TopTracks) -> Self {
            Self {
                script,
                fetched,
                reachable: true,
                lookup_calls: Arc::new(AtomicU32::new(0)),
            }
        }
    }

    #[async_trait]
    impl CatalogClient for StubCatalog {
        async fn lookup_artist(&self, _name: &str) -> Result<Option<ArtistRef>> {
            let call = self.lookup_calls.fetch_add(1, Ordering::SeqCst);
            match &self.script {
                LookupScript::Found(artist) => Ok(Some(artist.clone())),
                LookupScript::Missing => Ok(None),
                LookupScript::HttpError => {
                    Err(EngineError::Http("connection refused".to_string()))
                }
                LookupScript::RateLimitedForever => {
                    Err(EngineError::RateLimited { retry_after: 0 })
                }
                LookupScript::RateLimitedTimes(failures) => {
                    if call < *failures {
                        Err(EngineError::RateLimited { retry_after: 0 })
                    } else {
                        Ok(Some(test_artist()))
                    }
                }
            }
        }

        async fn top_track_features(&self, _artist_id: &str) -> Result<TopTracks> {
            Ok(self.fetched.clone())
        }

        async fn ping(&self) -> bool {
            self.reachable
        }
    }

    fn test_artist() -> ArtistRef {
        ArtistRef {
            id: "artist-1".to_string(),
            name: "Test Artist".to_string(),
            genres: ["indie rock".to_string()].into_iter().collect(),
            popularity: 55,
        }
    }

    fn energetic_tracks(count: usize) -> TopTracks {
        let features = (0..count)
            .map(|i| TrackFeatures {
                track_id: format!("track-{i}"),
                energy: 0.9,
                danceability: 0.7,
                valence: 0.85,
                acousticness: 0.1,
                instrumentalness: 0.0,
                tempo: 128.0,
            })
            .collect();
        TopTracks {
            features,
            unavailable: 0,
        }
    }

    fn fast_engine(stub: StubCatalog) -> AnalysisEngine {
        AnalysisEngine::new(Box::new(stub))
            .with_config(EngineConfig::new().with_retry_delays(0, 0))
    }

    fn drain_stages(rx: &mut EngineEventReceiver) -> Vec<AnalysisStage> {
        let mut stages = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let EngineEvent::StageChanged { stage } = event {
                stages.push(stage);
            }
        }
        stages
    }

    #[tokio::test]
    async fn test_empty_query_rejected_before_any_fetch() {
        let stub = StubCatalog::new(LookupScript::Found(test_artist()), energetic_tracks(3));
        let lookup_calls = Arc::clone(&stub.lookup_calls);
        let engine = AnalysisEngine::new(Box::new(stub));

        for query in ["", "   ", "\t \t"] {
            let result = engine.analyze(query).await;
            assert!(matches!(result, Err(EngineError::InvalidInput(_))));
        }
        assert_eq!(lookup_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_overlong_query_rejected() {
        let stub = StubCatalog::new(LookupScript::Found(test_artist()), energetic_tracks(3));
        let engine = AnalysisEngine::new(Box::new(stub));

        let query = "x".repeat(MAX_QUERY_CHARS + 1);
        let result = engine.analyze(&query).await;
        assert!(matches!(result, Err(EngineError::InvalidInput(_))));

        // Exactly at the limit is fine.
        let query = "x".repeat(MAX_QUERY_CHARS);
        assert!(AnalysisEngine::validate_query(&query).is_ok());
    }

    #[tokio::test]
    async fn test_control_characters_rejected() {
        let result = AnalysisEngine::validate_query("bjork\n; drop table artists");
        assert!(matches!(result, Err(EngineError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_validation_trims_whitespace() {
        let trimmed = AnalysisEngine::validate_query("  daft punk  ").unwrap();
        assert_eq!(trimmed, "daft punk");
    }

    #[tokio::test]
    async fn test_happy_path_produces_full_result() {
        let stub = StubCatalog::new(LookupScript::Found(test_artist()), energetic_tracks(10));
        let engine = fast_engine(stub);
        let mut rx = engine.subscribe();

        let result = engine.analyze("test artist").await.unwrap();

        assert_eq!(result.artist.id, "artist-1");
        assert_eq!(result.stats.track_count, 10);
        assert_eq!(result.mood.label, MoodLabel::Euphoric);
        assert!(result.mood.confidence > 0.6);
        assert!(!result.insights.is_empty());
        assert!(!result.partial_data);

        let stages = drain_stages(&mut rx);
        assert_eq!(
            stages,
            vec![
                AnalysisStage::Received,
                AnalysisStage::Fetching,
                AnalysisStage::Aggregating,
                AnalysisStage::Scoring,
                AnalysisStage::Rendering,
                AnalysisStage::Completed,
            ]
        );
    }

    #[tokio::test]
    async fn test_completion_event_carries_summary() {
        let stub = StubCatalog::new(LookupScript::Found(test_artist()), energetic_tracks(5));
        let engine = fast_engine(stub);
        let mut rx = engine.subscribe();

        let result = engine.analyze("test artist").await.unwrap();

        let mut completion = None;
        while let Ok(event) = rx.try_recv() {
            if let EngineEvent::AnalysisCompleted {
                artist_id,
                insight_count,
                ..
            } = event
            {
                completion = Some((artist_id, insight_count));
            }
        }
        let (artist_id, insight_count) = completion.expect("completion event not broadcast");
        assert_eq!(artist_id, "artist-1");
        assert_eq!(insight_count, result.insights.len());
    }

    #[tokio::test]
    async fn test_unknown_artist_is_not_found() {
        let stub = StubCatalog::new(LookupScript::Missing, TopTracks::default());
        let engine = fast_engine(stub);
        let mut rx = engine.subscribe();

        let result = engine.analyze("zzzznotanartist000").await;
        match result {
            Err(EngineError::NotFound(query)) => assert_eq!(query, "zzzznotanartist000"),
            other => panic!("expected NotFound, got {other:?}"),
        }

        let stages = drain_stages(&mut rx);
        assert_eq!(
            stages,
            vec![
                AnalysisStage::Received,
                AnalysisStage::Fetching,
                AnalysisStage::Failed,
            ]
        );
    }

    #[tokio::test]
    async fn test_transport_errors_fold_to_provider_unavailable() {
        let stub = StubCatalog::new(LookupScript::HttpError, TopTracks::default());
        let engine = fast_engine(stub);

        let result = engine.analyze("test artist").await;
        assert!(matches!(result, Err(EngineError::ProviderUnavailable(_))));
    }

    #[tokio::test]
    async fn test_rate_limit_exhaustion_folds_to_provider_unavailable() {
        let stub = StubCatalog::new(LookupScript::RateLimitedForever, TopTracks::default());
        let engine = AnalysisEngine::new(Box::new(stub)).with_config(
            EngineConfig::new()
                .with_max_retries(2)
                .with_retry_delays(0, 0),
        );

        let result = engine.analyze("test artist").await;
        match result {
            Err(EngineError::ProviderUnavailable(message)) => {
                assert!(message.contains("rate limited"), "message: {message}")
            }
            other => panic!("expected ProviderUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rate_limited_lookup_recovers_after_retry() {
        let stub = StubCatalog::new(LookupScript::RateLimitedTimes(1), energetic_tracks(4));
        let engine = fast_engine(stub);
        let mut rx = engine.subscribe();

        let result = engine.analyze("test artist").await.unwrap();
        assert_eq!(result.artist.id, "artist-1");

        let mut saw_rate_limit_event = false;
        while let Ok(event) = rx.try_recv() {
            if let EngineEvent::RateLimited { attempt, .. } = event {
                assert_eq!(attempt, 1);
                saw_rate_limit_event = true;
            }
        }
        assert!(saw_rate_limit_event);
    }

    #[tokio::test]
    async fn test_zero_tracks_still_yields_a_result() {
        let stub = StubCatalog::new(LookupScript::Found(test_artist()), TopTracks::default());
        let engine = fast_engine(stub);

        let result = engine.analyze("test artist").await.unwrap();

        assert_eq!(result.stats.track_count, 0);
        assert!((result.mood.confidence - 0.1).abs() < f64::EPSILON);
        assert!((result.complexity.value - 50.0).abs() < f64::EPSILON);
        assert!(!result.partial_data);
        assert!(!result.insights.is_empty());
    }

    #[tokio::test]
    async fn test_partial_features_flagged_on_result() {
        let mut fetched = energetic_tracks(6);
        fetched.unavailable = 4;
        let stub = StubCatalog::new(LookupScript::Found(test_artist()), fetched);
        let engine = fast_engine(stub);

        let result = engine.analyze("test artist").await.unwrap();
        assert!(result.partial_data);
        assert_eq!(result.stats.track_count, 6);
    }

    #[tokio::test]
    async fn test_cancelled_engine_abandons_retries() {
        let stub = StubCatalog::new(LookupScript::RateLimitedForever, TopTracks::default());
        let engine = AnalysisEngine::new(Box::new(stub)).with_config(
            EngineConfig::new()
                .with_max_retries(3)
                .with_retry_delays(30, 60),
        );
        engine.cancel();

        let started = std::time::Instant::now();
        let result = engine.analyze("test artist").await;
        assert!(result.unwrap_err().is_cancelled());
        assert!(started.elapsed() < Duration::from_secs(5));

        engine.reset_cancellation();
    }

    #[tokio::test]
    async fn test_health_reflects_catalog_reachability() {
        let mut stub = StubCatalog::new(LookupScript::Found(test_artist()), energetic_tracks(1));
        stub.reachable = false;
        let engine = fast_engine(stub);

        let report = engine.health().await;
        assert_eq!(report.status, HealthStatus::Degraded);
        assert!(!report.catalog_reachable);

        let stub = StubCatalog::new(LookupScript::Found(test_artist()), energetic_tracks(1));
        let engine = fast_engine(stub);
        let report = engine.health().await;
        assert_eq!(report.status, HealthStatus::Ok);
        assert!(report.catalog_reachable);
    }
}
