//! Producers of raw title lists.
//!
//! Every source is a lazy, finite stream of raw titles. Sources that page
//! over a remote service do so inside the stream, so a consumer that stops
//! early never triggers the remaining requests.

use std::collections::HashSet;

use futures::stream::{self, BoxStream};
use futures::{StreamExt, TryStreamExt};

use crate::error::SourceError;

pub type TitleStream<'a> = BoxStream<'a, Result<String, SourceError>>;

/// Wrap an already materialized list, for manual entry and fallback data.
pub fn titles_from_vec(titles: Vec<String>) -> TitleStream<'static> {
    stream::iter(titles.into_iter().map(Ok)).boxed()
}

/// Drain a source, keeping duplicates and order.
pub async fn collect_titles(
    stream: TitleStream<'_>,
) -> Result<Vec<String>, SourceError> {
    stream.try_collect().await
}

/// Drain a source, keeping only the first occurrence of each title.
///
/// Titles are compared exactly after trimming; order of first appearance is
/// kept.
pub async fn collect_unique_titles(
    mut stream: TitleStream<'_>,
) -> Result<Vec<String>, SourceError> {
    let mut seen = HashSet::new();
    let mut titles = Vec::new();

    while let Some(title) = stream.try_next().await? {
        let title = title.trim().to_string();
        if title.is_empty() {
            continue;
        }
        if seen.insert(title.clone()) {
            titles.push(title);
        }
    }

    Ok(titles)
}

/// Titles typed one per line, ending at the first blank line.
pub fn manual_titles<I, S>(lines: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .map(|line| line.as_ref().trim().to_string())
        .take_while(|line| !line.is_empty())
        .collect()
}
