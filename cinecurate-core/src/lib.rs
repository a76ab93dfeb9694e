//! # cinecurate core
//!
//! Builds curated movie collections in a Plex library from lists of raw,
//! user-facing titles.
//!
//! ## Overview
//!
//! - [`metadata`]: the title normalizer, splitting `"Inception (2010)"` into
//!   a searchable title and an optional release year
//! - [`reconcile`]: matches raw titles against a [`LibrarySearch`], with a
//!   year-less fallback and per-title failure isolation, and guards
//!   collection creation behind [`CommitGate`]
//! - [`sources`]: lazy title streams and the helpers that drain them
//! - [`providers`]: TMDB, Plex and Letterboxd clients implementing the
//!   collaborator traits in [`traits`]
//! - [`catalog`]: known franchise collection ids, studio filters and offline
//!   fallback lists
//!
//! ## Example
//!
//! ```no_run
//! use cinecurate_config::ConfigLoader;
//! use cinecurate_core::{PlexLibrary, reconcile};
//!
//! async fn run() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::default().load()?;
//!     let library = PlexLibrary::connect(&config).await?;
//!
//!     let titles = ["Inception (2010)", "The Matrix"];
//!     let result = reconcile(&titles, &library).await;
//!     println!(
//!         "{} found, {} not found",
//!         result.found.len(),
//!         result.not_found.len()
//!     );
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]

pub mod catalog;
pub mod error;
pub mod metadata;
pub mod providers;
pub mod reconcile;
pub mod sources;
pub mod traits;

pub use error::{LibraryError, ProviderError, SourceError};
pub use metadata::{ParsedTitle, parse_title};
pub use providers::{LetterboxdScraper, PlexLibrary, PlexMovie, TmdbClient};
pub use reconcile::{
    CommitDecision, CommitGate, LookupFailure, MatchResult, Reconciliation,
    ReconcileObserver, reconcile, reconcile_with_observer,
};
pub use sources::{
    TitleStream, collect_titles, collect_unique_titles, manual_titles,
    titles_from_vec,
};
pub use traits::{
    CollectionWriter, DiscoverFilter, DisplayTitle, LibrarySearch, ListSource,
    MetadataCatalog,
};
