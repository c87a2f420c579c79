use crate::SpotifyCatalog;

/// Read Spotify application credentials from the environment.
pub fn get_credentials() -> Result<(String, String), std::env::VarError> {
    let client_id = std::env::var("SPOTIFY_CLIENT_ID")?;
    let client_secret = std::env::var("SPOTIFY_CLIENT_SECRET")?;
    Ok((client_id, client_secret))
}

/// Build a catalog client over the default curl-backed HTTP client.
pub fn build_catalog(client_id: &str, client_secret: &str) -> SpotifyCatalog {
    let http_client = http_client::native::NativeClient::new();
    SpotifyCatalog::new(Box::new(http_client), client_id, client_secret)
}
