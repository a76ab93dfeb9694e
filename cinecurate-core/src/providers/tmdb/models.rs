use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").ok()
}

fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_date))
}

fn first_page() -> u32 {
    1
}

/// One page of a paginated TMDB listing (discover, search).
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct DiscoverPage<T> {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<T>,
    #[serde(default = "first_page")]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

impl<T> DiscoverPage<T> {
    pub fn is_last(&self) -> bool {
        self.page >= self.total_pages
    }
}

/// The subset of a TMDB movie record the title sources need.
#[derive(Debug, Clone, Deserialize)]
pub struct MovieSummary {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub release_date: Option<NaiveDate>,
}

impl MovieSummary {
    /// `Title (YYYY)` when the release date is known, so the year reaches the
    /// library search. `None` for records without a usable title.
    pub fn labelled_title(&self) -> Option<String> {
        let title = self.title.as_deref()?.trim();
        if title.is_empty() {
            return None;
        }
        Some(match self.release_date {
            Some(date) => format!("{} ({:04})", title, date.year()),
            None => title.to_string(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CollectionDetails {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parts: Vec<MovieSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscoverMovieQuery<'a> {
    pub api_key: &'a str,
    pub language: &'a str,
    pub sort_by: &'a str,
    pub include_adult: bool,
    pub page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_companies: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_keywords: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchMovieQuery<'a> {
    pub api_key: &'a str,
    pub language: &'a str,
    pub query: &'a str,
    pub include_adult: bool,
    pub page: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LanguageQuery<'a> {
    pub api_key: &'a str,
    pub language: &'a str,
}
