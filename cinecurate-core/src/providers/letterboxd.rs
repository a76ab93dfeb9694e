//! Scrapes film titles from public Letterboxd lists.
//!
//! Lists are paginated as `<list>/page/N/`. Titles come from poster tooltips
//! in the grid view and from headlines in the detailed view; both may appear
//! on one page, so consumers should deduplicate with
//! [`collect_unique_titles`](crate::sources::collect_unique_titles).

use cinecurate_config::HttpConfig;
use futures::StreamExt;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::error::{ProviderError, SourceError};
use crate::sources::{TitleStream, collect_unique_titles};
use crate::traits::ListSource;

/// Stop following `next` links past this many pages.
pub const MAX_LIST_PAGES: u32 = 500;

static FILM_NAME_ATTR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bdata-(?:film|item)-name="([^"]*)""#)
        .expect("film name regex should compile")
});

static TOOLTIP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"<div\b[^>]*\bclass="(?:[^"]*\s)?tooltip(?:\s[^"]*)?"[^>]*>\s*<a\b[^>]*\btitle="([^"]*)""#,
    )
    .expect("tooltip regex should compile")
});

static HEADLINE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"<h2\b[^>]*\bclass="(?:[^"]*\s)?headline-2(?:\s[^"]*)?"[^>]*>[^<]*(?:<(?:[^a/]|/[^ah])[^>]*>[^<]*)*<a\b[^>]*>([^<]*)</a>"#,
    )
    .expect("headline regex should compile")
});

static NEXT_LINK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<a\b[^>]*\bclass="(?:[^"]*\s)?next(?:\s[^"]*)?""#)
        .expect("next link regex should compile")
});

static ENTITY_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]+);")
        .expect("entity regex should compile")
});

#[derive(Debug, Clone)]
pub struct LetterboxdScraper {
    http: reqwest::Client,
}

impl LetterboxdScraper {
    pub fn new(config: &HttpConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            http: super::build_http_client(config)?,
        })
    }

    /// Fetch one list page. `None` when the server answers with anything
    /// other than 200, which ends the list.
    pub async fn fetch_page(
        &self,
        url: &str,
    ) -> Result<Option<String>, ProviderError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            warn!("Letterboxd returned {} for {}", status, url);
            return Ok(None);
        }
        Ok(Some(response.text().await?))
    }

    /// Every distinct title on the list, in first-seen order.
    pub async fn scrape_list(
        &self,
        list_url: &str,
    ) -> Result<Vec<String>, SourceError> {
        let titles = collect_unique_titles(self.list_titles(list_url)).await?;
        if titles.is_empty() {
            warn!(
                "No titles found at {}; the list may be empty, private or \
                 the page layout may have changed",
                list_url
            );
        }
        Ok(titles)
    }
}

impl ListSource for LetterboxdScraper {
    fn list_titles<'a>(&'a self, list_url: &'a str) -> TitleStream<'a> {
        async_stream::stream! {
            let mut page = 1;
            loop {
                let url = page_url(list_url, page);
                let html = match self.fetch_page(&url).await {
                    Ok(Some(html)) => html,
                    Ok(None) => break,
                    Err(err) => {
                        yield Err(SourceError::from(err));
                        break;
                    }
                };

                let titles = extract_titles(&html);
                debug!("Letterboxd page {}: {} titles", page, titles.len());
                for title in titles {
                    yield Ok::<String, SourceError>(title);
                }

                if !has_next_page(&html) {
                    break;
                }
                if page >= MAX_LIST_PAGES {
                    warn!("Stopping {} at page {}", list_url, page);
                    break;
                }
                page += 1;
            }
        }
        .boxed()
    }
}

/// The URL of page `page` (1-based) of a list.
pub fn page_url(list_url: &str, page: u32) -> String {
    if page <= 1 {
        return list_url.to_string();
    }
    let base = list_url.trim_end_matches('/');
    format!("{base}/page/{page}/")
}

/// Titles on one page in document order, entities decoded. May contain
/// duplicates when a film appears in more than one markup form.
pub fn extract_titles(html: &str) -> Vec<String> {
    let mut found: Vec<(usize, &str)> = Vec::new();

    for regex in [&*FILM_NAME_ATTR_REGEX, &*TOOLTIP_REGEX, &*HEADLINE_REGEX] {
        found.extend(
            regex
                .captures_iter(html)
                .filter_map(|caps| caps.get(1))
                .map(|m| (m.start(), m.as_str())),
        );
    }

    found.sort_by_key(|(start, _)| *start);
    found
        .into_iter()
        .map(|(_, raw)| unescape_html(raw).trim().to_string())
        .filter(|title| !title.is_empty())
        .collect()
}

pub fn has_next_page(html: &str) -> bool {
    NEXT_LINK_REGEX.is_match(html)
}

/// Decode the HTML character references that show up in film titles.
/// Unknown named entities are left untouched.
pub fn unescape_html(raw: &str) -> String {
    ENTITY_REGEX
        .replace_all(raw, |caps: &Captures<'_>| {
            let entity = &caps[1];
            decode_entity(entity).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_entity(entity: &str) -> Option<String> {
    let code = if let Some(hex) = entity
        .strip_prefix("#x")
        .or_else(|| entity.strip_prefix("#X"))
    {
        u32::from_str_radix(hex, 16).ok()?
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse().ok()?
    } else {
        let named = match entity {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            "nbsp" => ' ',
            "ndash" => '\u{2013}',
            "mdash" => '\u{2014}',
            "hellip" => '\u{2026}',
            "rsquo" => '\u{2019}',
            "lsquo" => '\u{2018}',
            _ => return None,
        };
        return Some(named.to_string());
    };
    char::from_u32(code).map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    const GRID_PAGE: &str = r#"
        <ul class="poster-list -p125 -grid film-list">
          <li class="poster-container">
            <div class="really-lazy-load poster film-poster"
                 data-film-name="Paris, Texas" data-film-slug="paris-texas"></div>
          </li>
          <li class="poster-container">
            <div class="tooltip"><a href="/film/amelie/" title="Am&#233;lie"></a></div>
            <div class="tooltip"><a href="/film/x/" title="Ocean&#39;s Eleven"></a></div>
          </li>
        </ul>
        <div class="pagination">
          <a class="next" href="/someone/list/faves/page/2/">Older</a>
        </div>
    "#;

    const DETAIL_PAGE: &str = r##"
        <h2 class="headline-2 prettify"><a href="/film/alien/">Alien</a> <small>1979</small></h2>
        <h2 class="headline-2"><span class="rank">2</span><a href="/film/heat/">Heat</a></h2>
        <h2 class="headline-3"><a href="/film/nope/">Not a title</a></h2>
        <div class="paginate-nextprev"><a class="previous" href="#">Newer</a></div>
    "##;

    #[test]
    fn grid_titles_in_document_order() {
        assert_eq!(
            extract_titles(GRID_PAGE),
            vec!["Paris, Texas", "Amélie", "Ocean's Eleven"]
        );
        assert!(has_next_page(GRID_PAGE));
    }

    #[test]
    fn detail_view_headlines() {
        assert_eq!(extract_titles(DETAIL_PAGE), vec!["Alien", "Heat"]);
        assert!(!has_next_page(DETAIL_PAGE));
    }

    #[test]
    fn entity_decoding() {
        assert_eq!(unescape_html("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(unescape_html("&quot;Q&quot; &#x27;s"), "\"Q\" 's");
        assert_eq!(unescape_html("Caf&#233;"), "Café");
        assert_eq!(unescape_html("&bogus; &amp"), "&bogus; &amp");
        assert_eq!(unescape_html("&#xD800;"), "&#xD800;");
    }

    #[test]
    fn page_urls() {
        let list = "https://letterboxd.com/someone/list/faves/";
        assert_eq!(page_url(list, 1), list);
        assert_eq!(
            page_url(list, 3),
            "https://letterboxd.com/someone/list/faves/page/3/"
        );
        assert_eq!(
            page_url("https://letterboxd.com/someone/list/faves", 2),
            "https://letterboxd.com/someone/list/faves/page/2/"
        );
    }

    #[test]
    fn empty_markup_yields_nothing() {
        assert!(extract_titles("<html><body></body></html>").is_empty());
        assert!(extract_titles(r#"<div data-film-name="  "></div>"#).is_empty());
    }
}
