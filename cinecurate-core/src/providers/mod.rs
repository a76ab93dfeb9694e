pub mod letterboxd;
pub mod plex;
pub mod tmdb;

pub use letterboxd::LetterboxdScraper;
pub use plex::{PlexLibrary, PlexMovie};
pub use tmdb::TmdbClient;

use cinecurate_config::HttpConfig;

use crate::error::ProviderError;

/// Shared HTTP client settings for every outbound provider.
pub(crate) fn build_http_client(
    config: &HttpConfig,
) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(config.timeout)
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(ProviderError::from)
}
