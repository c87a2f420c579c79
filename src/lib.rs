pub mod aggregate;
pub mod cancel;
pub mod catalog;
#[cfg(feature = "curl")]
pub mod commands;
pub mod engine;
pub mod error;
pub mod history;
pub mod persona;
pub mod retry;
pub mod scoring;
pub mod spotify;
pub mod types;

pub use aggregate::aggregate;
pub use cancel::{sleep_unless_cancelled, CancelToken};
pub use catalog::CatalogClient;
pub use engine::{AnalysisEngine, MAX_QUERY_CHARS};
pub use error::EngineError;
pub use history::{HistoryEntry, HistoryLog, HistoryStore, HISTORY_CAPACITY};
pub use persona::{AnalysisContext, Persona, PersonaKind, PersonaLibrary, Trigger};
pub use retry::{run_with_retries, RetryOutcome};
pub use scoring::{score_complexity, score_mood, INSUFFICIENT_DATA_CONFIDENCE, NEUTRAL_COMPLEXITY};
pub use spotify::SpotifyCatalog;
pub use types::{
    AggregateStats, AnalysisResult, AnalysisStage, ArtistRef, ComplexityFactor, ComplexityScore,
    Dimension, EngineConfig, EngineEvent, EngineEventReceiver, EngineEventWatcher, HealthReport,
    HealthStatus, MoodLabel, MoodProfile, PersonaInsight, RequestInfo, RetryConfig,
    SharedEventBroadcaster, TopTracks, TrackFeatures,
};

// Re-export the generated mock for testing against the catalog boundary
#[cfg(feature = "mock")]
pub use catalog::MockCatalogClient;

pub type Result<T> = std::result::Result<T, EngineError>;
