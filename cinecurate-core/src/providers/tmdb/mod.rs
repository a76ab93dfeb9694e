//! Thin TMDB v3 client covering the three lookups the title sources use:
//! collection parts, discover by company/keyword, and free-text search.

pub mod models;

use std::fmt;

use async_trait::async_trait;
use cinecurate_config::Config;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ProviderError, SourceError};
use crate::sources::TitleStream;
use crate::traits::{DiscoverFilter, MetadataCatalog};
use models::{
    CollectionDetails, DiscoverMovieQuery, DiscoverPage, LanguageQuery,
    MovieSummary, SearchMovieQuery,
};

pub const TMDB_API_BASE: &str = "https://api.themoviedb.org/3";

/// TMDB refuses page numbers above this.
pub const MAX_PAGES: u32 = 500;

#[derive(Clone)]
pub struct TmdbClient {
    http: reqwest::Client,
    api_key: String,
    language: String,
    base_url: String,
}

impl fmt::Debug for TmdbClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TmdbClient")
            .field("language", &self.language)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl TmdbClient {
    /// Build a client from the effective config. Fails when no API key is
    /// configured.
    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        let api_key = config
            .tmdb
            .api_key
            .clone()
            .ok_or(ProviderError::MissingCredential("TMDB_API_KEY"))?;

        Ok(Self {
            http: super::build_http_client(&config.http)?,
            api_key,
            language: config.tmdb.language.clone(),
            base_url: TMDB_API_BASE.to_string(),
        })
    }

    /// Point the client at another API root, e.g. a local test server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn get_tmdb_json<Q, T>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T, ProviderError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self.http.get(&url).query(query).send().await?;

        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(|err| {
                ProviderError::ParseError(format!("{path}: {err}"))
            });
        }

        #[derive(Debug, Deserialize)]
        struct TmdbErrorBody {
            #[serde(default)]
            status_message: Option<String>,
        }

        let message = response
            .json::<TmdbErrorBody>()
            .await
            .ok()
            .and_then(|body| body.status_message)
            .unwrap_or_else(|| {
                format!("TMDB request failed with status {}", status)
            });

        match status.as_u16() {
            401 => Err(ProviderError::InvalidApiKey),
            404 => Err(ProviderError::NotFound),
            429 => Err(ProviderError::RateLimited),
            _ => Err(ProviderError::ApiError(message)),
        }
    }

    pub async fn collection(
        &self,
        collection_id: u64,
    ) -> Result<CollectionDetails, ProviderError> {
        let query = LanguageQuery {
            api_key: &self.api_key,
            language: &self.language,
        };
        self.get_tmdb_json(&format!("/collection/{collection_id}"), &query)
            .await
    }

    pub async fn discover_page(
        &self,
        filter: DiscoverFilter,
        page: u32,
    ) -> Result<DiscoverPage<MovieSummary>, ProviderError> {
        let (with_companies, with_keywords) = match filter {
            DiscoverFilter::Company(id) => (Some(id), None),
            DiscoverFilter::Keyword(id) => (None, Some(id)),
        };
        let query = DiscoverMovieQuery {
            api_key: &self.api_key,
            language: &self.language,
            sort_by: "popularity.desc",
            include_adult: false,
            page: page.max(1),
            with_companies,
            with_keywords,
        };
        self.get_tmdb_json("/discover/movie", &query).await
    }

    pub async fn search_movies(
        &self,
        query: &str,
        page: u32,
    ) -> Result<DiscoverPage<MovieSummary>, ProviderError> {
        let query = SearchMovieQuery {
            api_key: &self.api_key,
            language: &self.language,
            query,
            include_adult: false,
            page: page.max(1),
        };
        self.get_tmdb_json("/search/movie", &query).await
    }
}

#[async_trait]
impl MetadataCatalog for TmdbClient {
    async fn collection_titles(
        &self,
        collection_id: u64,
    ) -> Result<Vec<String>, ProviderError> {
        let details = self.collection(collection_id).await?;
        debug!(
            "TMDB collection {} ({}) has {} parts",
            details.id,
            details.name,
            details.parts.len()
        );
        Ok(details
            .parts
            .iter()
            .filter_map(MovieSummary::labelled_title)
            .collect())
    }

    fn discover_titles(&self, filter: DiscoverFilter) -> TitleStream<'_> {
        async_stream::stream! {
            let mut page = 1;
            loop {
                let response = match self.discover_page(filter, page).await {
                    Ok(response) => response,
                    Err(err) => {
                        yield Err(SourceError::from(err));
                        break;
                    }
                };

                debug!(
                    "TMDB discover {:?}: page {}/{}",
                    filter, response.page, response.total_pages
                );
                let titles: Vec<String> = response
                    .results
                    .iter()
                    .filter_map(MovieSummary::labelled_title)
                    .collect();
                for title in titles {
                    yield Ok::<String, SourceError>(title);
                }

                if response.is_last() {
                    break;
                }
                if response.page >= MAX_PAGES {
                    warn!(
                        "TMDB discover {:?} truncated at page {}",
                        filter, MAX_PAGES
                    );
                    break;
                }
                page = response.page.max(page) + 1;
            }
        }
        .boxed()
    }

    async fn search_titles(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<String>, ProviderError> {
        let mut titles = Vec::new();
        let mut page = 1;

        while titles.len() < limit {
            let response = self.search_movies(query, page).await?;
            titles.extend(
                response
                    .results
                    .iter()
                    .filter_map(MovieSummary::labelled_title),
            );
            if response.is_last() || response.page >= MAX_PAGES {
                break;
            }
            page = response.page.max(page) + 1;
        }

        titles.truncate(limit);
        Ok(titles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_api_key_is_reported() {
        let err = TmdbClient::from_config(&Config::default())
            .expect_err("no key configured");
        assert!(matches!(
            err,
            ProviderError::MissingCredential("TMDB_API_KEY")
        ));
    }

    #[test]
    fn debug_output_hides_api_key() {
        let config = Config::default().with_tmdb_api_key(Some("s3cret".into()));
        let client = TmdbClient::from_config(&config)
            .expect("client")
            .with_base_url("http://127.0.0.1:9/3/");
        let rendered = format!("{client:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("http://127.0.0.1:9/3\""));
    }
}
