//! Background import pipeline
//!
//! One import run is a background tokio task that walks
//! authenticate -> list collections -> page words -> filter -> download
//! media, streaming [`ImportEvent`]s to the host in a fixed order. The host
//! keeps full control of its own storage: the run only tells it which words
//! are ready and how far along it is.

mod events;
mod orchestrator;

pub use events::{ImportEvent, ImportPhase};
pub use orchestrator::{
    ImportHandle, ImportOptions, ImportPipeline, NoteStore, NullNoteStore, WordsetSelection,
};
