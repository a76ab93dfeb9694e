//! Matches raw user-supplied titles against a media library.
//!
//! [`reconcile`] walks the input in order, parses each title with
//! [`parse_title`], and asks the library for it: first with the parsed year,
//! then once more without it if the year-filtered search came back empty.
//! A failing lookup is logged and counted as not found; it never aborts the
//! run. The engine has no side effects on the library. Creating a collection
//! from the result goes through [`CommitGate`].

pub mod commit;

pub use commit::{CommitDecision, CommitGate};

use std::fmt;

use tracing::{debug, info, warn};

use crate::error::LibraryError;
use crate::metadata::{ParsedTitle, parse_title};
use crate::traits::LibrarySearch;

/// Outcome for a single raw title.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult<T> {
    Matched(T),
    Unmatched(String),
}

impl<T> MatchResult<T> {
    pub fn is_matched(&self) -> bool {
        matches!(self, MatchResult::Matched(_))
    }
}

/// A lookup that errored rather than returning no results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupFailure {
    pub raw: String,
    pub reason: String,
}

impl fmt::Display for LookupFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.raw, self.reason)
    }
}

/// Result of reconciling a title list.
///
/// `outcomes` has exactly one entry per input title. `found` and `not_found`
/// partition the same input, each in input order. Failed lookups appear in
/// `not_found` and are additionally described in `failures`.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation<T> {
    pub outcomes: Vec<MatchResult<T>>,
    pub found: Vec<T>,
    pub not_found: Vec<String>,
    pub failures: Vec<LookupFailure>,
}

impl<T> Default for Reconciliation<T> {
    fn default() -> Self {
        Self {
            outcomes: Vec::new(),
            found: Vec::new(),
            not_found: Vec::new(),
            failures: Vec::new(),
        }
    }
}

impl<T> Reconciliation<T> {
    /// No title matched. The run is over; there is nothing to commit.
    pub fn is_empty_match(&self) -> bool {
        self.found.is_empty()
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }
}

/// Progress hook invoked once per title, in input order.
pub trait ReconcileObserver<T> {
    fn on_outcome(&mut self, index: usize, raw: &str, outcome: &MatchResult<T>);
}

impl<T, F> ReconcileObserver<T> for F
where
    F: FnMut(usize, &str, &MatchResult<T>),
{
    fn on_outcome(
        &mut self,
        index: usize,
        raw: &str,
        outcome: &MatchResult<T>,
    ) {
        self(index, raw, outcome)
    }
}

struct Silent;

impl<T> ReconcileObserver<T> for Silent {
    fn on_outcome(&mut self, _: usize, _: &str, _: &MatchResult<T>) {}
}

/// Reconcile `raw_titles` against `library`.
pub async fn reconcile<L, S>(
    raw_titles: &[S],
    library: &L,
) -> Reconciliation<L::Item>
where
    L: LibrarySearch + ?Sized,
    S: AsRef<str> + Sync,
{
    reconcile_with_observer(raw_titles, library, &mut Silent).await
}

/// [`reconcile`], reporting each outcome to `observer` as it is decided.
pub async fn reconcile_with_observer<L, S, O>(
    raw_titles: &[S],
    library: &L,
    observer: &mut O,
) -> Reconciliation<L::Item>
where
    L: LibrarySearch + ?Sized,
    S: AsRef<str> + Sync,
    O: ReconcileObserver<L::Item> + ?Sized,
{
    let mut result = Reconciliation {
        outcomes: Vec::with_capacity(raw_titles.len()),
        ..Reconciliation::default()
    };

    for (index, raw) in raw_titles.iter().enumerate() {
        let raw = raw.as_ref();
        let parsed = parse_title(raw);

        let outcome = match lookup(library, &parsed).await {
            Ok(Some(item)) => {
                result.found.push(item.clone());
                MatchResult::Matched(item)
            }
            Ok(None) => {
                debug!("No library match for '{}'", raw);
                result.not_found.push(raw.to_string());
                MatchResult::Unmatched(raw.to_string())
            }
            Err(err) => {
                warn!("Library lookup failed for '{}': {}", raw, err);
                result.failures.push(LookupFailure {
                    raw: raw.to_string(),
                    reason: err.to_string(),
                });
                result.not_found.push(raw.to_string());
                MatchResult::Unmatched(raw.to_string())
            }
        };

        observer.on_outcome(index, raw, &outcome);
        result.outcomes.push(outcome);
    }

    info!(
        "Reconciled {} titles: {} found, {} not found ({} failed)",
        result.total(),
        result.found.len(),
        result.not_found.len(),
        result.failures.len()
    );

    result
}

async fn lookup<L>(
    library: &L,
    parsed: &ParsedTitle,
) -> Result<Option<L::Item>, LibraryError>
where
    L: LibrarySearch + ?Sized,
{
    let primary = library.search(&parsed.title, parsed.year).await?;
    if let Some(item) = primary.into_iter().next() {
        return Ok(Some(item));
    }

    if parsed.year.is_none() {
        return Ok(None);
    }

    debug!(
        "No match for '{}' with year {:?}, retrying without year",
        parsed.title, parsed.year
    );
    let fallback = library.search(&parsed.title, None).await?;
    Ok(fallback.into_iter().next())
}
