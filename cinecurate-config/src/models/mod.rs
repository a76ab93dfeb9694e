pub mod sources;

use std::path::PathBuf;
use std::time::Duration;

use sources::FileConfig;

pub const DEFAULT_PLEX_LIBRARY: &str = "Movies";
pub const DEFAULT_TMDB_LANGUAGE: &str = "en-US";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; PlexCollectionBot/1.0)";

/// Effective configuration, built once at startup and never mutated in
/// place. Credential updates go through the `with_*` builders, which return a
/// new value.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub plex: PlexConfig,
    pub tmdb: TmdbConfig,
    pub http: HttpConfig,
    pub catalog: CatalogConfig,
    pub dry_run: bool,
    pub metadata: ConfigMetadata,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            plex: PlexConfig::default(),
            tmdb: TmdbConfig::default(),
            http: HttpConfig::default(),
            catalog: CatalogConfig::default(),
            dry_run: false,
            metadata: ConfigMetadata::default(),
        }
    }
}

impl Config {
    pub fn credential_status(&self) -> CredentialStatus {
        CredentialStatus {
            plex_token: self.plex.token.is_some(),
            plex_url: self.plex.url.is_some(),
            tmdb_api_key: self.tmdb.api_key.is_some(),
        }
    }

    // Builders update the effective value and the file snapshot together.
    pub fn with_plex_token(&self, token: Option<String>) -> Self {
        let token = token.and_then(crate::util::non_empty);
        let mut next = self.clone();
        next.metadata.file.plex.token = token.clone();
        next.plex.token = token;
        next
    }

    pub fn with_plex_url(&self, url: Option<String>) -> Self {
        let url = url.and_then(crate::util::non_empty);
        let mut next = self.clone();
        next.metadata.file.plex.url = url.clone();
        next.plex.url = url;
        next
    }

    pub fn with_tmdb_api_key(&self, api_key: Option<String>) -> Self {
        let api_key = api_key.and_then(crate::util::non_empty);
        let mut next = self.clone();
        next.metadata.file.tmdb.api_key = api_key.clone();
        next.tmdb.api_key = api_key;
        next
    }

    /// The shape written back to disk: the file as it was read, plus any
    /// credential edits. Environment overrides and a command-line dry run
    /// never end up here.
    pub fn to_file_config(&self) -> FileConfig {
        self.metadata.file.clone()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlexConfig {
    /// Base URL of the Plex server, e.g. `http://127.0.0.1:32400`.
    pub url: Option<String>,
    pub token: Option<String>,
    /// Title of the movie library section to reconcile against.
    pub library: String,
}

impl Default for PlexConfig {
    fn default() -> Self {
        Self {
            url: None,
            token: None,
            library: DEFAULT_PLEX_LIBRARY.to_string(),
        }
    }
}

impl PlexConfig {
    pub fn is_configured(&self) -> bool {
        self.url.is_some() && self.token.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TmdbConfig {
    pub api_key: Option<String>,
    pub language: String,
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            language: DEFAULT_TMDB_LANGUAGE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpConfig {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogConfig {
    /// Optional override for the bundled franchise/studio fallback lists.
    pub fallback_path: Option<PathBuf>,
}

/// Which credentials are present, for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialStatus {
    pub plex_token: bool,
    pub plex_url: bool,
    pub tmdb_api_key: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub file_loaded: bool,
    pub env_file_loaded: bool,
    /// Names of environment variables that overrode file values.
    pub env_overrides: Vec<&'static str>,
    /// The config file contents as read, before environment overrides.
    pub file: FileConfig,
}
