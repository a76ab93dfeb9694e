use serde::Deserialize;

use crate::traits::DisplayTitle;

/// Every Plex JSON response wraps its payload in `MediaContainer`.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaContainerResponse<T> {
    #[serde(rename = "MediaContainer")]
    pub media_container: T,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SectionsContainer {
    #[serde(rename = "Directory", default)]
    pub directories: Vec<PlexSection>,
}

/// A library section (`/library/sections`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlexSection {
    pub key: String,
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdentityContainer {
    #[serde(rename = "machineIdentifier")]
    pub machine_identifier: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetadataContainer {
    #[serde(rename = "Metadata", default)]
    pub metadata: Vec<PlexMovie>,
}

/// A movie in a Plex library section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlexMovie {
    #[serde(rename = "ratingKey")]
    pub rating_key: String,
    pub title: String,
    #[serde(default)]
    pub year: Option<u16>,
}

impl DisplayTitle for PlexMovie {
    fn display_title(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({})", self.title, year),
            None => self.title.clone(),
        }
    }
}
