//! Interactive front end for cinecurate.
//!
//! [`Session`] drives the menu: it gathers titles from manual entry, a
//! known franchise, a studio, or a Letterboxd list, reconciles them against
//! Plex, and creates the collection once the user confirms. Console I/O goes
//! through [`Prompter`] and all network collaborators through [`Backend`],
//! so the whole flow can run against scripted answers and fakes.

#![allow(missing_docs)]

pub mod backend;
pub mod present;
pub mod prompt;
pub mod session;

pub use backend::{Backend, LiveBackend};
pub use prompt::{Prompter, ScriptedPrompter, TerminalPrompter};
pub use session::{CollectionRequest, Confirmation, Session};
