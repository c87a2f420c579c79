use thiserror::Error;

/// Error types for analysis operations.
///
/// This enum covers all failure modes of an analysis request, from input
/// validation through catalog fetching to response parsing. Partial feature
/// data is *not* an error: when the catalog declines to describe some tracks
/// the engine degrades the result instead of failing (see
/// [`TopTracks::unavailable`](crate::TopTracks)).
///
/// # Matching on failures
///
/// ```rust,no_run
/// use artist_lens::{AnalysisEngine, EngineError, SpotifyCatalog};
///
/// #[tokio::main]
/// async fn main() {
///     let catalog = SpotifyCatalog::new(
///         Box::new(http_client::native::NativeClient::new()),
///         "client-id",
///         "client-secret",
///     );
///     let engine = AnalysisEngine::new(Box::new(catalog));
///
///     match engine.analyze("radiohead").await {
///         Ok(result) => println!("{} → {}", result.artist.name, result.mood.label),
///         Err(EngineError::InvalidInput(msg)) => eprintln!("Bad query: {msg}"),
///         Err(EngineError::NotFound(query)) => eprintln!("No artist matched '{query}'"),
///         Err(EngineError::ProviderUnavailable(msg)) => {
///             eprintln!("Catalog unreachable: {msg}");
///         }
///         Err(e) => eprintln!("Other error: {e}"),
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum EngineError {
    /// The search query was rejected before any fetch was attempted.
    ///
    /// # Common Causes
    /// - Empty or whitespace-only query
    /// - Query longer than the accepted bound
    /// - Control characters in the query
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No artist in the catalog matched the query.
    ///
    /// This is a clean miss, not a transport problem. Callers should not
    /// record a history entry for it.
    #[error("No artist found for '{0}'")]
    NotFound(String),

    /// The catalog could not be reached or kept refusing us.
    ///
    /// Produced after network failures, authentication failures during the
    /// token exchange, or once rate-limit retries are exhausted.
    #[error("Catalog provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Transport-level HTTP failures.
    ///
    /// Connection failures, timeouts, DNS errors and other low-level
    /// transport issues, before the orchestrator folds them into
    /// [`EngineError::ProviderUnavailable`].
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Authentication failure against the catalog.
    ///
    /// Raised when the client-credentials token exchange is rejected. An
    /// authorization failure on the audio-features endpoint alone is treated
    /// as partial data instead, since the rest of the catalog still works.
    #[error("Catalog authentication failed: {0}")]
    Auth(String),

    /// Rate limiting from the catalog.
    ///
    /// The `retry_after` field carries the provider's Retry-After hint in
    /// seconds; the retry layer waits at least that long before the next
    /// attempt.
    #[error("Rate limited by the catalog, retry after {retry_after}s")]
    RateLimited {
        /// Seconds to wait before the next attempt.
        retry_after: u64,
    },

    /// Failed to parse a catalog response.
    ///
    /// The provider returned a payload that does not match the documented
    /// wire shape.
    #[error("Unparseable catalog response: {0}")]
    Parse(String),

    /// Local I/O and cancellation.
    ///
    /// Raised by history persistence and by cancelled operations (an
    /// interrupted sleep surfaces as `ErrorKind::Interrupted`).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Whether this error means the request was abandoned by cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, EngineError::Io(e) if e.kind() == std::io::ErrorKind::Interrupted)
    }
}
