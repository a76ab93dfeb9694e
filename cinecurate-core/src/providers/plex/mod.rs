//! Plex Media Server access over its HTTP API.
//!
//! Only the calls needed for reconciliation are covered: resolving the movie
//! section, searching it by title and year, and creating a static collection
//! from matched items.

pub mod models;

pub use models::{PlexMovie, PlexSection};

use std::fmt;

use async_trait::async_trait;
use cinecurate_config::Config;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{LibraryError, ProviderError};
use crate::traits::{CollectionWriter, LibrarySearch};
use models::{
    IdentityContainer, MediaContainerResponse, MetadataContainer,
    SectionsContainer,
};

const TOKEN_HEADER: &str = "X-Plex-Token";

/// Plex metadata type id for movies.
const MOVIE_TYPE: &str = "1";

/// A connected Plex movie library section.
#[derive(Clone)]
pub struct PlexLibrary {
    http: reqwest::Client,
    base_url: Url,
    token: String,
    section: PlexSection,
    machine_identifier: String,
}

impl fmt::Debug for PlexLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlexLibrary")
            .field("base_url", &self.base_url.as_str())
            .field("section", &self.section)
            .field("machine_identifier", &self.machine_identifier)
            .finish_non_exhaustive()
    }
}

impl PlexLibrary {
    /// Resolve the configured library section and the server identity.
    pub async fn connect(config: &Config) -> Result<Self, LibraryError> {
        let url = config
            .plex
            .url
            .as_deref()
            .ok_or(ProviderError::MissingCredential("PLEX_URL"))?;
        let token = config
            .plex
            .token
            .clone()
            .ok_or(ProviderError::MissingCredential("PLEX_TOKEN"))?;

        let http = super::build_http_client(&config.http)?;
        let base_url = normalize_base_url(url)?;

        let sections: MediaContainerResponse<SectionsContainer> =
            get_json(&http, &base_url, &token, "library/sections", &[])
                .await?;
        let section = find_section(
            sections.media_container.directories,
            &config.plex.library,
        )?;
        if section.kind != "movie" {
            warn!(
                "Plex section '{}' has type '{}', expected 'movie'",
                section.title, section.kind
            );
        }

        let identity: MediaContainerResponse<IdentityContainer> =
            get_json(&http, &base_url, &token, "identity", &[]).await?;

        info!(
            "Connected to Plex section '{}' (key {}) on server {}",
            section.title,
            section.key,
            identity.media_container.machine_identifier
        );

        Ok(Self {
            http,
            base_url,
            token,
            section,
            machine_identifier: identity.media_container.machine_identifier,
        })
    }

    pub fn section(&self) -> &PlexSection {
        &self.section
    }

    pub fn machine_identifier(&self) -> &str {
        &self.machine_identifier
    }
}

#[async_trait]
impl LibrarySearch for PlexLibrary {
    type Item = PlexMovie;

    async fn search(
        &self,
        title: &str,
        year: Option<u16>,
    ) -> Result<Vec<PlexMovie>, LibraryError> {
        let mut query = vec![
            ("type", MOVIE_TYPE.to_string()),
            ("title", title.to_string()),
        ];
        if let Some(year) = year {
            query.push(("year", year.to_string()));
        }

        let path = format!("library/sections/{}/all", self.section.key);
        let response: MediaContainerResponse<MetadataContainer> =
            get_json(&self.http, &self.base_url, &self.token, &path, &query)
                .await?;

        debug!(
            "Plex search '{}' ({:?}) returned {} items",
            title,
            year,
            response.media_container.metadata.len()
        );
        Ok(response.media_container.metadata)
    }
}

#[async_trait]
impl CollectionWriter for PlexLibrary {
    async fn create_collection(
        &self,
        name: &str,
        items: &[PlexMovie],
    ) -> Result<(), LibraryError> {
        if items.is_empty() {
            return Err(LibraryError::EmptyCollection);
        }
        if name.trim().is_empty() {
            return Err(LibraryError::BlankCollectionName);
        }

        let keys: Vec<&str> =
            items.iter().map(|item| item.rating_key.as_str()).collect();
        let query = [
            ("type", MOVIE_TYPE.to_string()),
            ("title", name.trim().to_string()),
            ("smart", "0".to_string()),
            ("sectionId", self.section.key.clone()),
            ("uri", collection_uri(&self.machine_identifier, &keys)),
        ];

        let url = self.base_url.join("library/collections")?;
        let response = self
            .http
            .post(url)
            .header(ACCEPT, "application/json")
            .header(TOKEN_HEADER, &self.token)
            .query(&query)
            .send()
            .await?;
        check_status(response.status(), "library/collections")?;

        info!("Created Plex collection '{}' ({} items)", name, items.len());
        Ok(())
    }
}

/// The `server://` URI Plex expects when adding items to a collection.
pub fn collection_uri(machine_identifier: &str, rating_keys: &[&str]) -> String {
    format!(
        "server://{}/com.plexapp.plugins.library/library/metadata/{}",
        machine_identifier,
        rating_keys.join(",")
    )
}

/// Parse the configured server URL so relative endpoints join beneath it.
fn normalize_base_url(raw: &str) -> Result<Url, LibraryError> {
    let mut url = Url::parse(raw.trim())?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn find_section(
    sections: Vec<PlexSection>,
    wanted: &str,
) -> Result<PlexSection, LibraryError> {
    let wanted_lower = wanted.to_lowercase();
    sections
        .into_iter()
        .find(|section| section.title.to_lowercase() == wanted_lower)
        .ok_or_else(|| LibraryError::SectionNotFound(wanted.to_string()))
}

fn check_status(
    status: reqwest::StatusCode,
    path: &str,
) -> Result<(), LibraryError> {
    if status.is_success() {
        return Ok(());
    }
    match status.as_u16() {
        401 => Err(LibraryError::Unauthorized),
        404 => Err(ProviderError::NotFound.into()),
        429 => Err(ProviderError::RateLimited.into()),
        _ => Err(ProviderError::ApiError(format!(
            "Plex request to {path} failed with status {status}"
        ))
        .into()),
    }
}

async fn get_json<T>(
    http: &reqwest::Client,
    base_url: &Url,
    token: &str,
    path: &str,
    query: &[(&str, String)],
) -> Result<T, LibraryError>
where
    T: DeserializeOwned,
{
    let url = base_url.join(path)?;
    let response = http
        .get(url)
        .header(ACCEPT, "application/json")
        .header(TOKEN_HEADER, token)
        .query(query)
        .send()
        .await?;
    check_status(response.status(), path)?;

    response.json::<T>().await.map_err(|err| {
        ProviderError::ParseError(format!("Plex {path}: {err}")).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_uri_joins_rating_keys() {
        assert_eq!(
            collection_uri("abc123", &["10", "42"]),
            "server://abc123/com.plexapp.plugins.library/library/metadata/10,42"
        );
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let url = normalize_base_url("http://nas.local:32400/plex")
            .expect("valid url");
        assert_eq!(
            url.join("identity").expect("join").as_str(),
            "http://nas.local:32400/plex/identity"
        );

        let root =
            normalize_base_url(" http://127.0.0.1:32400 ").expect("valid url");
        assert_eq!(
            root.join("library/sections").expect("join").as_str(),
            "http://127.0.0.1:32400/library/sections"
        );
    }

    #[test]
    fn section_lookup_ignores_case() {
        let sections = vec![
            PlexSection {
                key: "2".into(),
                title: "TV Shows".into(),
                kind: "show".into(),
            },
            PlexSection {
                key: "1".into(),
                title: "Movies".into(),
                kind: "movie".into(),
            },
        ];
        let found =
            find_section(sections.clone(), "movies").expect("movie section");
        assert_eq!(found.key, "1");

        let err = find_section(sections, "Films").expect_err("absent");
        assert!(matches!(err, LibraryError::SectionNotFound(name) if name == "Films"));
    }

    #[test]
    fn status_mapping() {
        assert!(check_status(reqwest::StatusCode::OK, "x").is_ok());
        assert!(matches!(
            check_status(reqwest::StatusCode::UNAUTHORIZED, "x"),
            Err(LibraryError::Unauthorized)
        ));
        assert!(matches!(
            check_status(reqwest::StatusCode::BAD_GATEWAY, "x"),
            Err(LibraryError::Provider(ProviderError::ApiError(_)))
        ));
    }
}
