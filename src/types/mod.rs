//! Type definitions for the importer
//!
//! Wire types for the LinguaLeo endpoints and the domain records the rest
//! of the crate works with.

pub mod request;
pub mod response;
pub mod serde_helpers;
pub mod word;
pub mod wordset;

pub use request::WordsPageQuery;
pub use response::{
    AuthCheckResponse, AuthResponse, LegacyWordsResponse, WordGroup, WordsResponse,
    WordsetsResponse, remote_error_message,
};
pub use word::{ProgressFilter, WordRecord};
pub use wordset::{MAIN_DICTIONARY_ID, Wordset};
