//! LinguaLeo vocabulary importer
//!
//! Core engine for pulling a user's vocabulary out of the LinguaLeo
//! dictionary service: authenticated sessions with persistent cookies,
//! date-group pagination, duplicate merging, per-word media downloads and a
//! background import pipeline that streams ordered events to its host.
//!
//! # Architecture
//!
//! - [`session`]: authenticated HTTP access, cookie persistence, the TLS
//!   fallback and the listing request loops
//! - [`vocab`]: the date-group pagination cursor and duplicate merging
//! - [`media`]: pronunciation and picture downloads
//! - [`pipeline`]: the background import run and its ordered event stream
//! - [`config`], [`error`], [`types`]: shared plumbing
//!
//! The crate never touches host storage. Hosts (an Anki add-on, the bundled
//! `leo-import` binary, a sync job) observe [`ImportEvent`]s and create
//! their own notes in event order.
//!
//! # Examples
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use lingualeo_importer::{
//!     ImportEvent, ImportOptions, ImportPipeline, NullNoteStore, Session, Settings,
//! };
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut settings = Settings::from_env()?;
//! settings.account.stay_logged_in = false;
//!
//! let session = Session::new(settings)?;
//! let mut handle =
//!     ImportPipeline::spawn(session, ImportOptions::default(), Arc::new(NullNoteStore));
//!
//! while let Some(event) = handle.next_event().await {
//!     match event {
//!         ImportEvent::WordReady(word) => println!("{}", word.word_value),
//!         ImportEvent::Error(message) => eprintln!("{message}"),
//!         ImportEvent::Finished => break,
//!         _ => {}
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod pipeline;
pub mod session;
pub mod types;
pub mod vocab;

pub use config::{ConfigLoader, Settings};
pub use error::{Error, Result};
pub use media::{MediaDownloader, WordMedia};
pub use pipeline::{
    ImportEvent, ImportHandle, ImportOptions, ImportPhase, ImportPipeline, NoteStore,
    NullNoteStore, WordsetSelection,
};
pub use session::{CancelFlag, PersistentCookieJar, Session};
pub use types::{MAIN_DICTIONARY_ID, ProgressFilter, WordRecord, Wordset};
pub use vocab::{DateGroupCursor, merge_unique};
