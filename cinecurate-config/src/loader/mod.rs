pub mod error;

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};
use url::Url;

use crate::models::sources::{EnvConfig, FileConfig};
use crate::models::{
    CatalogConfig, Config, ConfigMetadata, DEFAULT_HTTP_TIMEOUT_SECS,
    DEFAULT_PLEX_LIBRARY, DEFAULT_TMDB_LANGUAGE, DEFAULT_USER_AGENT,
    HttpConfig, PlexConfig, TmdbConfig,
};
use crate::util::non_empty;
use error::ConfigLoadError;

pub const DEFAULT_CONFIG_FILE: &str = "cinecurate.toml";

/// Composes a [`Config`] from an optional TOML file and the environment.
/// Environment values win over file values.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: PathBuf,
    load_dotenv: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_FILE)
    }
}

impl ConfigLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            load_dotenv: true,
        }
    }

    /// Skip reading `.env` from the working directory.
    pub fn without_dotenv(mut self) -> Self {
        self.load_dotenv = false;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Config, ConfigLoadError> {
        let env_file_loaded = self.load_dotenv && dotenvy::dotenv().is_ok();
        let mut config = self.load_with_env(EnvConfig::gather())?;
        config.metadata.env_file_loaded = env_file_loaded;
        Ok(config)
    }

    /// Compose a config from the file at `path` and an explicit environment
    /// snapshot.
    pub fn load_with_env(
        &self,
        env: EnvConfig,
    ) -> Result<Config, ConfigLoadError> {
        let (file, file_loaded) = self.read_file()?;
        let persisted = file.clone();
        let mut overrides = Vec::new();

        let plex_url = pick(
            env.plex_url,
            file.plex.url,
            "PLEX_URL",
            &mut overrides,
        );
        if let Some(url) = plex_url.as_deref() {
            Url::parse(url).map_err(|source| {
                ConfigLoadError::InvalidPlexUrl {
                    value: url.to_string(),
                    source,
                }
            })?;
        }

        let plex = PlexConfig {
            url: plex_url,
            token: pick(
                env.plex_token,
                file.plex.token,
                "PLEX_TOKEN",
                &mut overrides,
            ),
            library: pick(
                env.plex_library,
                file.plex.library,
                "PLEX_LIBRARY",
                &mut overrides,
            )
            .unwrap_or_else(|| DEFAULT_PLEX_LIBRARY.to_string()),
        };

        let tmdb = TmdbConfig {
            api_key: pick(
                env.tmdb_api_key,
                file.tmdb.api_key,
                "TMDB_API_KEY",
                &mut overrides,
            ),
            language: pick(
                env.tmdb_language,
                file.tmdb.language,
                "TMDB_LANG",
                &mut overrides,
            )
            .unwrap_or_else(|| DEFAULT_TMDB_LANGUAGE.to_string()),
        };

        let timeout_secs = match env.http_timeout_secs {
            Some(secs) => {
                overrides.push("CINECURATE_HTTP_TIMEOUT_SECS");
                secs
            }
            None => file.http.timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
        };
        if timeout_secs == 0 {
            return Err(ConfigLoadError::InvalidTimeout);
        }

        let http = HttpConfig {
            timeout: Duration::from_secs(timeout_secs),
            user_agent: file
                .http
                .user_agent
                .and_then(non_empty)
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        };

        let fallback_path = match env.fallback_path {
            Some(path) => {
                overrides.push("CINECURATE_FALLBACK_PATH");
                Some(path)
            }
            None => file.catalog.fallback_path,
        };

        let dry_run = match env.dry_run {
            Some(flag) => {
                overrides.push("CINECURATE_DRY_RUN");
                flag
            }
            None => file.dry_run.unwrap_or(false),
        };

        if !overrides.is_empty() {
            debug!("Environment overrides applied: {}", overrides.join(", "));
        }

        Ok(Config {
            plex,
            tmdb,
            http,
            catalog: CatalogConfig { fallback_path },
            dry_run,
            metadata: ConfigMetadata {
                config_path: Some(self.path.clone()),
                file_loaded,
                env_file_loaded: false,
                env_overrides: overrides,
                file: persisted,
            },
        })
    }

    fn read_file(&self) -> Result<(FileConfig, bool), ConfigLoadError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(
                    "No config file at {}, starting with empty credentials",
                    self.path.display()
                );
                return Ok((FileConfig::default(), false));
            }
            Err(source) => {
                return Err(ConfigLoadError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let file = toml::from_str::<FileConfig>(&raw).map_err(|source| {
            ConfigLoadError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;
        Ok((file, true))
    }
}

fn pick(
    env: Option<String>,
    file: Option<String>,
    key: &'static str,
    overrides: &mut Vec<&'static str>,
) -> Option<String> {
    if let Some(value) = env.and_then(non_empty) {
        overrides.push(key);
        return Some(value);
    }
    file.and_then(non_empty)
}
