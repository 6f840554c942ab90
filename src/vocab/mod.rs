//! Vocabulary listing logic
//!
//! Pure pieces of the word listing: the date-group pagination cursor and
//! cross-collection deduplication. The request loop that drives them lives
//! in [`crate::session`].

pub mod dedup;
pub mod paginator;

pub use dedup::merge_unique;
pub use paginator::DateGroupCursor;
