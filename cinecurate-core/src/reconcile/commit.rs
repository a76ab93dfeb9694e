use tracing::info;

use crate::error::LibraryError;
use crate::traits::CollectionWriter;

/// Whether a reconciled list may be written as a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitDecision {
    Commit,
    NothingMatched,
    NotConfirmed,
}

/// Guards collection creation: a non-empty match list and an explicit
/// confirmation are both required before the writer is touched.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommitGate;

impl CommitGate {
    pub fn check<T>(found: &[T], confirmed: bool) -> CommitDecision {
        if found.is_empty() {
            CommitDecision::NothingMatched
        } else if !confirmed {
            CommitDecision::NotConfirmed
        } else {
            CommitDecision::Commit
        }
    }

    /// Create the collection through `writer` when [`CommitGate::check`]
    /// allows it. Returns the decision that was taken.
    pub async fn commit<W>(
        writer: &W,
        name: &str,
        found: &[W::Item],
        confirmed: bool,
    ) -> Result<CommitDecision, LibraryError>
    where
        W: CollectionWriter + ?Sized,
    {
        let decision = Self::check(found, confirmed);
        if decision != CommitDecision::Commit {
            info!("Skipping collection '{}': {:?}", name, decision);
            return Ok(decision);
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(LibraryError::BlankCollectionName);
        }

        writer.create_collection(name, found).await?;
        info!("Created collection '{}' with {} items", name, found.len());
        Ok(decision)
    }
}
