use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::util::{non_empty_var, parse_bool_var};

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub plex: FilePlexConfig,
    #[serde(default)]
    pub tmdb: FileTmdbConfig,
    #[serde(default)]
    pub http: FileHttpConfig,
    #[serde(default)]
    pub catalog: FileCatalogConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, PartialEq)]
pub struct FilePlexConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, PartialEq)]
pub struct FileTmdbConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, PartialEq)]
pub struct FileHttpConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize, PartialEq)]
pub struct FileCatalogConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_path: Option<PathBuf>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub plex_url: Option<String>,
    pub plex_token: Option<String>,
    pub plex_library: Option<String>,
    pub tmdb_api_key: Option<String>,
    pub tmdb_language: Option<String>,
    pub http_timeout_secs: Option<u64>,
    pub fallback_path: Option<PathBuf>,
    pub dry_run: Option<bool>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self {
            plex_url: non_empty_var("PLEX_URL"),
            plex_token: non_empty_var("PLEX_TOKEN"),
            plex_library: non_empty_var("PLEX_LIBRARY"),
            tmdb_api_key: non_empty_var("TMDB_API_KEY"),
            tmdb_language: non_empty_var("TMDB_LANG"),
            http_timeout_secs: non_empty_var("CINECURATE_HTTP_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok()),
            fallback_path: non_empty_var("CINECURATE_FALLBACK_PATH")
                .map(PathBuf::from),
            dry_run: parse_bool_var("CINECURATE_DRY_RUN"),
        }
    }
}
