use async_trait::async_trait;
use cinecurate_config::Config;
use cinecurate_core::{
    CollectionWriter, LetterboxdScraper, LibraryError, ListSource,
    MetadataCatalog, PlexLibrary, ProviderError, TmdbClient,
};

/// Builds the collaborators a session talks to from the current config.
///
/// Each call receives the config in effect at that moment, so credential
/// changes made in the session apply to the next connection.
#[async_trait]
pub trait Backend: Send + Sync {
    type Library: CollectionWriter;

    async fn connect_library(
        &self,
        config: &Config,
    ) -> Result<Self::Library, LibraryError>;

    /// `None` when no TMDB key is configured.
    fn metadata_catalog(
        &self,
        config: &Config,
    ) -> Result<Option<Box<dyn MetadataCatalog>>, ProviderError>;

    fn list_source(
        &self,
        config: &Config,
    ) -> Result<Box<dyn ListSource>, ProviderError>;
}

/// Plex, TMDB and Letterboxd over the network.
#[derive(Debug, Default, Clone, Copy)]
pub struct LiveBackend;

#[async_trait]
impl Backend for LiveBackend {
    type Library = PlexLibrary;

    async fn connect_library(
        &self,
        config: &Config,
    ) -> Result<PlexLibrary, LibraryError> {
        PlexLibrary::connect(config).await
    }

    fn metadata_catalog(
        &self,
        config: &Config,
    ) -> Result<Option<Box<dyn MetadataCatalog>>, ProviderError> {
        if config.tmdb.api_key.is_none() {
            return Ok(None);
        }
        Ok(Some(Box::new(TmdbClient::from_config(config)?)))
    }

    fn list_source(
        &self,
        config: &Config,
    ) -> Result<Box<dyn ListSource>, ProviderError> {
        Ok(Box::new(LetterboxdScraper::new(&config.http)?))
    }
}
