//! Narrow interfaces between the reconciliation core and its collaborators.
//!
//! The engine only ever sees [`LibrarySearch`]; collection creation is a
//! separate [`CollectionWriter`] so that a caller can run a reconciliation
//! without holding anything capable of mutating the library.

use async_trait::async_trait;

use crate::error::{LibraryError, ProviderError};
use crate::sources::TitleStream;

/// Human-readable label for a library item. The only attribute the core
/// reads from items it did not create.
pub trait DisplayTitle {
    fn display_title(&self) -> String;
}

/// Title search over the media library.
///
/// An empty vector means "no match"; errors are reserved for transport,
/// authentication and decoding failures. Results are in the server's order
/// and the first element is taken as the match.
#[async_trait]
pub trait LibrarySearch: Send + Sync {
    type Item: DisplayTitle + Clone + Send + Sync;

    async fn search(
        &self,
        title: &str,
        year: Option<u16>,
    ) -> Result<Vec<Self::Item>, LibraryError>;
}

/// Creates a named collection from previously matched items.
#[async_trait]
pub trait CollectionWriter: LibrarySearch {
    async fn create_collection(
        &self,
        name: &str,
        items: &[Self::Item],
    ) -> Result<(), LibraryError>;
}

/// How a discover query narrows the movie catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiscoverFilter {
    Company(u64),
    Keyword(u64),
}

/// Read-only access to an external movie metadata service.
#[async_trait]
pub trait MetadataCatalog: Send + Sync {
    /// Titles of every part of a franchise collection, in catalog order.
    async fn collection_titles(
        &self,
        collection_id: u64,
    ) -> Result<Vec<String>, ProviderError>;

    /// Every title matching `filter`, fetched lazily page by page.
    fn discover_titles(&self, filter: DiscoverFilter) -> TitleStream<'_>;

    /// At most `limit` titles matching a free-text query.
    async fn search_titles(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<String>, ProviderError>;
}

/// A paginated public list of films, identified by URL.
pub trait ListSource: Send + Sync {
    fn list_titles<'a>(&'a self, list_url: &'a str) -> TitleStream<'a>;
}
