//! Static lookup tables for the franchise and studio pickers, plus offline
//! title lists used when no TMDB key is configured.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::SourceError;
use crate::traits::DiscoverFilter;

/// Franchise name to TMDB collection id.
pub const KNOWN_COLLECTIONS: &[(&str, u64)] = &[
    ("Alien", 8091),
    ("Back to the Future", 264),
    ("Despicable Me", 86066),
    ("Evil Dead", 1960),
    ("Fast & Furious", 9485),
    ("Harry Potter", 1241),
    ("The Hunger Games", 131635),
    ("Indiana Jones", 84),
    ("James Bond", 645),
    ("John Wick", 404609),
    ("Jurassic Park", 328),
    ("The Lord of the Rings", 119),
    ("The Matrix", 2344),
    ("Mission: Impossible", 87359),
    ("Ocean's", 304),
    ("Pirates of the Caribbean", 295),
    ("Planet of the Apes", 173710),
    ("Scream", 2602),
    ("Shrek", 2150),
    ("Sonic the Hedgehog", 720879),
    ("Star Trek", 115575),
    ("Star Wars", 10),
    ("The Dark Knight", 263),
    ("The Twilight Saga", 33514),
];

/// A studio or franchise universe reachable through TMDB discover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Studio {
    pub key: &'static str,
    pub filter: DiscoverFilter,
}

pub const STUDIOS: &[Studio] = &[
    Studio {
        key: "a24",
        filter: DiscoverFilter::Company(41077),
    },
    Studio {
        key: "pixar",
        filter: DiscoverFilter::Company(3),
    },
    Studio {
        key: "studio ghibli",
        filter: DiscoverFilter::Company(10342),
    },
    Studio {
        key: "mcu",
        filter: DiscoverFilter::Keyword(180547),
    },
    Studio {
        key: "dceu",
        filter: DiscoverFilter::Keyword(229266),
    },
];

impl Studio {
    /// `MCU`/`DCEU` are acronyms; everything else is title-cased.
    pub fn display_name(&self) -> String {
        match self.key {
            "mcu" | "dceu" => self.key.to_uppercase(),
            key => title_case(key),
        }
    }
}

pub fn collection_id(name: &str) -> Option<u64> {
    KNOWN_COLLECTIONS
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, id)| *id)
}

/// Look a studio up by key or display name, ignoring case.
pub fn find_studio(name: &str) -> Option<&'static Studio> {
    let wanted = name.trim().to_lowercase();
    STUDIOS.iter().find(|studio| {
        studio.key == wanted || studio.display_name().to_lowercase() == wanted
    })
}

/// Resolve user input to one of `choices`, ignoring case and surrounding
/// whitespace. Returns the canonical spelling.
pub fn pick_case_insensitive<'a, I>(input: &str, choices: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let wanted = input.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }
    choices
        .into_iter()
        .find(|choice| choice.to_lowercase() == wanted)
}

fn title_case(value: &str) -> String {
    value
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

const BUNDLED_FALLBACK: &str = include_str!("../data/fallback_collections.json");

/// Offline franchise and studio title lists.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FallbackData {
    #[serde(rename = "Franchises", default)]
    pub franchises: BTreeMap<String, Vec<String>>,
    #[serde(rename = "Studios", default)]
    pub studios: BTreeMap<String, Vec<String>>,
}

impl FallbackData {
    pub fn bundled() -> Result<Self, SourceError> {
        Ok(serde_json::from_str(BUNDLED_FALLBACK)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let raw =
            std::fs::read_to_string(path).map_err(|source| SourceError::Io {
                path: path.display().to_string(),
                source,
            })?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// The file at `path` when given, otherwise the bundled lists.
    pub fn load(path: Option<&Path>) -> Result<Self, SourceError> {
        match path {
            Some(path) => {
                debug!("Loading fallback catalog from {}", path.display());
                Self::from_path(path)
            }
            None => Self::bundled(),
        }
    }

    pub fn franchise_names(&self) -> impl Iterator<Item = &str> {
        self.franchises.keys().map(String::as_str)
    }

    pub fn studio_names(&self) -> impl Iterator<Item = &str> {
        self.studios.keys().map(String::as_str)
    }

    /// Titles listed under `name`, trimmed, with blank entries dropped.
    pub fn franchise_titles(&self, name: &str) -> Option<Vec<String>> {
        self.franchises.get(name).map(|titles| non_blank(titles))
    }

    pub fn studio_titles(&self, name: &str) -> Option<Vec<String>> {
        self.studios.get(name).map(|titles| non_blank(titles))
    }
}

// A blank title would reach the library search as an empty filter.
fn non_blank(titles: &[String]) -> Vec<String> {
    titles
        .iter()
        .map(|title| title.trim())
        .filter(|title| !title.is_empty())
        .map(String::from)
        .collect()
}
