use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

// `\d` would accept any Unicode digit; years are ASCII only.
static TRAILING_YEAR_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^(.*?)\s+\(([0-9]{4})\)$")
        .expect("trailing year regex should compile")
});

/// A user-typed title split into its searchable parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParsedTitle {
    pub title: String,
    pub year: Option<u16>,
}

impl ParsedTitle {
    pub fn new(title: impl Into<String>, year: Option<u16>) -> Self {
        Self {
            title: title.into(),
            year,
        }
    }

    /// `Title (YYYY)` when a year is known, otherwise just the title.
    pub fn display(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ParsedTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.year {
            Some(year) => write!(f, "{} ({:04})", self.title, year),
            None => f.write_str(&self.title),
        }
    }
}

/// Split `"Inception (2010)"` into `("Inception", Some(2010))`.
///
/// Only a trailing `(YYYY)` group preceded by whitespace counts as a year;
/// anything else stays part of the title. Never fails: blank input yields an
/// empty title with no year.
pub fn parse_title(raw: &str) -> ParsedTitle {
    let trimmed = raw.trim();

    if let Some(caps) = TRAILING_YEAR_REGEX.captures(trimmed)
        && let Some(body) = caps.get(1)
        && let Some(year) = caps.get(2).and_then(|m| m.as_str().parse().ok())
    {
        return ParsedTitle::new(body.as_str().trim(), Some(year));
    }

    ParsedTitle::new(trimmed, None)
}
