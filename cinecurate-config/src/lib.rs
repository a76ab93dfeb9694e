//! Shared configuration library for cinecurate.
//!
//! Credentials and connection settings are read once at startup from a TOML
//! file plus environment overrides, producing an immutable [`Config`] that is
//! handed to the collaborators that need it (Plex connection, TMDB client).
//! Updating a credential produces a new [`Config`] value which can be
//! persisted with [`save_config`].

#![allow(missing_docs)]

pub mod loader;
pub mod models;
pub mod util;
pub mod writer;

pub use loader::{ConfigLoader, error::ConfigLoadError};
pub use models::sources::{EnvConfig, FileConfig};
pub use models::{
    CatalogConfig, Config, ConfigMetadata, CredentialStatus, HttpConfig,
    PlexConfig, TmdbConfig,
};
pub use writer::save_config;
