use thiserror::Error;

/// Failures talking to a remote metadata or list provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Not found")]
    NotFound,

    #[error("Rate limited")]
    RateLimited,

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Parse error: {0}")]
    ParseError(String),
}

/// Failures searching or writing the media library.
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Library section '{0}' not found")]
    SectionNotFound(String),

    #[error("Plex rejected the token")]
    Unauthorized,

    #[error("Refusing to create a collection with no items")]
    EmptyCollection,

    #[error("Collection name must not be blank")]
    BlankCollectionName,

    #[error("Invalid library URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<reqwest::Error> for LibraryError {
    fn from(err: reqwest::Error) -> Self {
        LibraryError::Provider(ProviderError::NetworkError(err))
    }
}

/// Failures producing a list of raw titles.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid fallback catalog: {0}")]
    Catalog(#[from] serde_json::Error),
}
