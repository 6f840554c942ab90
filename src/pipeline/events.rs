//! Import run event and phase definitions
//!
//! An import run reports progress to its host through an ordered stream of
//! [`ImportEvent`]s. The host drains them from the [`crate::ImportHandle`]
//! and reacts on its own thread; the worker never touches host state.

use std::fmt;

use crate::types::WordRecord;

/// Notifications emitted by an import run, in emission order.
///
/// One run produces: `TotalWords` once the word list is final, then for each
/// word a `WordReady` followed by a `Progress`, then at most one aggregated
/// media `Error`, then `FinalCount` unless the run was cancelled, and
/// `Finished` as the very last event of every run (success, failure or
/// cancellation alike).
#[derive(Debug, Clone, PartialEq)]
pub enum ImportEvent {
    /// How many words passed the filters and will be processed.
    TotalWords(usize),
    /// A word the host should store now. Emitted before the word's media
    /// is attempted, so the note exists even when its media later fails.
    WordReady(Box<WordRecord>),
    /// Running count of words processed so far.
    Progress(usize),
    /// A human-readable failure message to surface to the user.
    Error(String),
    /// Total words processed. Absent when the run was cancelled.
    FinalCount(usize),
    /// The worker has exited. Always the last event.
    Finished,
}

/// Lifecycle phase of an import run, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    Idle,
    Authenticating,
    FetchingCollections,
    FetchingWords,
    Filtering,
    Downloading,
    Done,
    Failed,
}

impl fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Authenticating => "authenticating",
            Self::FetchingCollections => "fetching collections",
            Self::FetchingWords => "fetching words",
            Self::Filtering => "filtering",
            Self::Downloading => "downloading",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}
