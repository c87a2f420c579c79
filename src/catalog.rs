use crate::{ArtistRef, Result, TopTracks};
use async_trait::async_trait;

/// Boundary trait for the music catalog the engine fetches from.
///
/// The engine only ever talks to the catalog through this trait, which keeps
/// the analysis pipeline testable against scripted implementations (enable
/// the `mock` feature for a generated `MockCatalogClient`). Methods return
/// `Send` futures so whole analyses can be spawned onto a multi-threaded
/// runtime.
///
/// # Examples
///
/// ```rust,no_run
/// use artist_lens::{CatalogClient, SpotifyCatalog};
///
/// # tokio_test::block_on(async {
/// let catalog = SpotifyCatalog::new(
///     Box::new(http_client::native::NativeClient::new()),
///     "client-id",
///     "client-secret",
/// );
///
/// if let Some(artist) = catalog.lookup_artist("radiohead").await? {
///     let fetched = catalog.top_track_features(&artist.id).await?;
///     println!("{} tracks described", fetched.features.len());
/// }
/// # Ok::<(), artist_lens::EngineError>(())
/// # });
/// ```
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Resolve a free-text query to the best-matching artist.
    ///
    /// `Ok(None)` is a clean miss (no such artist), distinct from transport
    /// or authentication failures which surface as errors.
    async fn lookup_artist(&self, name: &str) -> Result<Option<ArtistRef>>;

    /// Fetch audio features for the artist's top tracks.
    ///
    /// May legitimately return an empty or partial feature set; see
    /// [`TopTracks::unavailable`].
    async fn top_track_features(&self, artist_id: &str) -> Result<TopTracks>;

    /// Cheap reachability probe for health checks. Never errors; an
    /// unreachable catalog is simply `false`.
    async fn ping(&self) -> bool;
}
