//! # Import Pipeline Orchestrator
//!
//! Runs one import end to end on a background tokio task: authenticate,
//! resolve the collection selection, page every collection, filter against
//! the progress filter and the host's note store, then walk the word list
//! downloading media. The host observes the run exclusively through the
//! ordered [`ImportEvent`] stream of the returned [`ImportHandle`].
//!
//! Failures never panic the worker. Every abnormal end is translated into
//! one user-facing `Error` event (message depends on the phase that failed),
//! and `Finished` is emitted last no matter how the run ended.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::Error;
use crate::media::MediaDownloader;
use crate::session::{CancelFlag, Session};
use crate::types::{MAIN_DICTIONARY_ID, ProgressFilter, WordRecord, Wordset};
use crate::vocab::merge_unique;

use super::events::{ImportEvent, ImportPhase};

const INVALID_DATA_MESSAGE: &str = "Error! Possibly, invalid data was received from LinguaLeo";

/// Which collections one run imports from.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WordsetSelection {
    /// The implicit main dictionary, collection id 1.
    #[default]
    MainDictionary,
    /// Collections the host already picked, e.g. from a listing dialog.
    Chosen(Vec<Wordset>),
    /// Every collection of the account; the run lists them itself.
    AllUserWordsets,
}

/// Knobs of one import run.
#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Collections to pull words from.
    pub selection: WordsetSelection,
    /// Client-side learning-progress filter.
    pub progress_filter: ProgressFilter,
    /// Import words even when the note store already has them.
    pub force_update: bool,
    /// Use the flat legacy word listing instead of date groups.
    pub use_legacy_api: bool,
    /// Directory for audio and picture files; `None` skips media.
    pub media_dir: Option<PathBuf>,
}

/// Host-side lookup for words that already exist as notes.
///
/// Queried once per word during filtering. Implementations are expected to
/// answer from local state; the trait is async so hosts backed by their own
/// executors or databases can await without blocking the run.
#[async_trait::async_trait]
pub trait NoteStore: Send + Sync {
    /// Whether a note for this word already exists.
    async fn is_imported(&self, word: &WordRecord) -> bool;
}

/// Note store for hosts that keep none: nothing counts as imported.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNoteStore;

#[async_trait::async_trait]
impl NoteStore for NullNoteStore {
    async fn is_imported(&self, _word: &WordRecord) -> bool {
        false
    }
}

/// Entry point for background import runs.
#[derive(Debug)]
pub struct ImportPipeline;

impl ImportPipeline {
    /// Spawn one import run on the current tokio runtime.
    ///
    /// The run takes ownership of the session and reports through the
    /// returned handle. Events arrive in emission order over an unbounded
    /// channel, so a slow host never stalls the worker.
    pub fn spawn(
        session: Session,
        options: ImportOptions,
        note_store: Arc<dyn NoteStore>,
    ) -> ImportHandle {
        let cancel = CancelFlag::new();
        let (events, receiver) = mpsc::unbounded_channel();

        let worker_cancel = cancel.clone();
        let worker = tokio::spawn(async move {
            run_import(session, options, note_store, worker_cancel, events).await;
        });

        ImportHandle {
            receiver,
            cancel,
            worker,
        }
    }
}

/// Live view of one import run.
///
/// Dropping the handle does not abort the worker. Use [`cancel`] for a
/// cooperative stop and keep draining events until [`ImportEvent::Finished`].
///
/// [`cancel`]: ImportHandle::cancel
#[derive(Debug)]
pub struct ImportHandle {
    receiver: mpsc::UnboundedReceiver<ImportEvent>,
    cancel: CancelFlag,
    worker: JoinHandle<()>,
}

impl ImportHandle {
    /// Wait for the next event. `None` once the worker is gone and every
    /// queued event has been drained.
    pub async fn next_event(&mut self) -> Option<ImportEvent> {
        self.receiver.recv().await
    }

    /// Non-blocking poll for an already queued event.
    pub fn try_next_event(&mut self) -> Option<ImportEvent> {
        self.receiver.try_recv().ok()
    }

    /// Ask the run to stop at the next word or page boundary. In-flight
    /// requests are allowed to finish.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the worker task itself to exit.
    pub async fn join(self) {
        if let Err(error) = self.worker.await {
            warn!("Import worker task failed: {}", error);
        }
    }
}

/// Why a run ended before completing its download loop.
enum RunFailure {
    /// Surface this message to the user, then finish.
    Message(String),
    /// The host cancelled; finish without a message.
    Cancelled,
}

async fn run_import(
    mut session: Session,
    options: ImportOptions,
    note_store: Arc<dyn NoteStore>,
    cancel: CancelFlag,
    events: mpsc::UnboundedSender<ImportEvent>,
) {
    let mut phase = ImportPhase::Idle;

    match drive(
        &mut session,
        &options,
        note_store.as_ref(),
        &cancel,
        &events,
        &mut phase,
    )
    .await
    {
        Ok(()) => advance(&mut phase, ImportPhase::Done),
        Err(RunFailure::Message(message)) => {
            let _ = events.send(ImportEvent::Error(message));
            advance(&mut phase, ImportPhase::Failed);
        }
        Err(RunFailure::Cancelled) => {
            info!("Import run cancelled");
            advance(&mut phase, ImportPhase::Failed);
        }
    }

    let _ = events.send(ImportEvent::Finished);
}

async fn drive(
    session: &mut Session,
    options: &ImportOptions,
    note_store: &dyn NoteStore,
    cancel: &CancelFlag,
    events: &mpsc::UnboundedSender<ImportEvent>,
    phase: &mut ImportPhase,
) -> Result<(), RunFailure> {
    advance(phase, ImportPhase::Authenticating);
    session
        .ensure_session()
        .await
        .map_err(|error| fail(*phase, error))?;

    let wordset_ids: Vec<u64> = match &options.selection {
        WordsetSelection::MainDictionary => vec![MAIN_DICTIONARY_ID],
        WordsetSelection::Chosen(wordsets) => wordsets.iter().map(|set| set.id).collect(),
        WordsetSelection::AllUserWordsets => {
            advance(phase, ImportPhase::FetchingCollections);
            let wordsets = session
                .fetch_wordsets()
                .await
                .map_err(|error| fail(*phase, error))?;
            if wordsets.is_empty() {
                return Err(RunFailure::Message("No user dictionaries found".into()));
            }
            wordsets.iter().map(|set| set.id).collect()
        }
    };

    advance(phase, ImportPhase::FetchingWords);
    let mut words: Vec<WordRecord> = Vec::new();
    for wordset_id in wordset_ids {
        let fetched = if options.use_legacy_api {
            session.fetch_words_legacy(wordset_id, cancel).await
        } else {
            session.fetch_words(wordset_id, cancel).await
        }
        .map_err(|error| fail(*phase, error))?;
        merge_unique(&mut words, fetched);
    }

    advance(phase, ImportPhase::Filtering);
    let mut selected = Vec::with_capacity(words.len());
    for word in words {
        if !options.progress_filter.matches(&word) {
            continue;
        }
        if !options.force_update && note_store.is_imported(&word).await {
            debug!("Skipping '{}': already imported", word.word_value);
            continue;
        }
        selected.push(word);
    }
    if selected.is_empty() {
        return Err(RunFailure::Message(no_words_message(
            options.progress_filter,
        )));
    }
    info!("{} word(s) selected for import", selected.len());

    advance(phase, ImportPhase::Downloading);
    let downloader = match &options.media_dir {
        Some(dir) => Some(
            MediaDownloader::create(session.settings(), dir)
                .map_err(|error| fail(*phase, error))?,
        ),
        None => None,
    };

    let _ = events.send(ImportEvent::TotalWords(selected.len()));
    let mut counter = 0usize;
    let mut problem_words: Vec<String> = Vec::new();
    let mut cancelled = false;

    for word in selected {
        if cancel.is_cancelled() {
            cancelled = true;
            break;
        }

        // The note comes first: a broken media link must not cost the word.
        let _ = events.send(ImportEvent::WordReady(Box::new(word.clone())));

        if let Some(downloader) = &downloader
            && let Err(error) = downloader.download_word_media(&word).await
        {
            warn!("{}", error);
            problem_words.push(word.word_value.clone());
        }

        counter += 1;
        let _ = events.send(ImportEvent::Progress(counter));
    }

    if !problem_words.is_empty() {
        let _ = events.send(ImportEvent::Error(problem_words_message(&problem_words)));
    }
    if cancelled {
        return Err(RunFailure::Cancelled);
    }

    let _ = events.send(ImportEvent::FinalCount(counter));
    Ok(())
}

/// Log a state transition and record the new phase.
fn advance(phase: &mut ImportPhase, next: ImportPhase) {
    info!("Import phase: {} -> {}", phase, next);
    *phase = next;
}

/// Convert an operation error into the run failure shown to the user.
fn fail(phase: ImportPhase, error: Error) -> RunFailure {
    if matches!(error, Error::Cancelled) {
        return RunFailure::Cancelled;
    }
    warn!("Import failed while {}: {}", phase, error);
    RunFailure::Message(user_message(phase, &error))
}

/// The message shown to the user for an error in a given phase.
///
/// Service-reported messages pass through verbatim; malformed payloads all
/// collapse into one generic wording; transport failures get a phase-specific
/// wording so the user knows which step to retry.
fn user_message(phase: ImportPhase, error: &Error) -> String {
    match (phase, error) {
        (_, Error::Remote(message)) => message.clone(),
        (_, Error::Protocol(_) | Error::Json(_)) => INVALID_DATA_MESSAGE.to_string(),
        (
            ImportPhase::Authenticating,
            Error::Network(detail) | Error::TransportSecurity(detail),
        ) => {
            format!("Can't authorize. Problems with internet connection. Error message: {detail}")
        }
        (
            ImportPhase::FetchingCollections,
            Error::Network(_) | Error::TransportSecurity(_),
        ) => "Can't get dictionaries. Problem with internet connection.".to_string(),
        (ImportPhase::FetchingWords, Error::Network(_) | Error::TransportSecurity(_)) => {
            "Can't download words. Problem with internet connection.".to_string()
        }
        (_, other) => other.to_string(),
    }
}

/// The message for a filter that matched nothing.
fn no_words_message(filter: ProgressFilter) -> String {
    match filter.adjective() {
        Some(adjective) => format!("No {adjective} words to download"),
        None => "No words to download".to_string(),
    }
}

/// One aggregated message naming every word whose media failed.
fn problem_words_message(problem_words: &[String]) -> String {
    let mut message = String::from(
        "We weren't able to download media for these words because of broken links \
         in LinguaLeo or problems with an internet connection: ",
    );
    if let Some((last, preceding)) = problem_words.split_last() {
        for word in preceding {
            message.push_str(word);
            message.push_str(", ");
        }
        message.push_str(last);
    }
    message.push('.');
    message
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_words_message_follows_filter() {
        assert_eq!(no_words_message(ProgressFilter::Any), "No words to download");
        assert_eq!(
            no_words_message(ProgressFilter::Studied),
            "No studied words to download"
        );
        assert_eq!(
            no_words_message(ProgressFilter::Unstudied),
            "No unstudied words to download"
        );
    }

    #[test]
    fn test_problem_words_message_single_word() {
        let message = problem_words_message(&["cat".to_string()]);
        assert_eq!(
            message,
            "We weren't able to download media for these words because of broken links \
             in LinguaLeo or problems with an internet connection: cat."
        );
    }

    #[test]
    fn test_problem_words_message_joins_with_commas() {
        let words = vec!["cat".to_string(), "dog".to_string(), "owl".to_string()];
        let message = problem_words_message(&words);
        assert!(message.ends_with(": cat, dog, owl."));
    }

    #[test]
    fn test_user_message_auth_transport_carries_detail() {
        let message = user_message(
            ImportPhase::Authenticating,
            &Error::network("dns error: no records found"),
        );
        assert_eq!(
            message,
            "Can't authorize. Problems with internet connection. \
             Error message: dns error: no records found"
        );
    }

    #[test]
    fn test_user_message_listing_transport_by_phase() {
        assert_eq!(
            user_message(ImportPhase::FetchingCollections, &Error::network("timeout")),
            "Can't get dictionaries. Problem with internet connection."
        );
        assert_eq!(
            user_message(
                ImportPhase::FetchingWords,
                &Error::transport_security("invalid peer certificate")
            ),
            "Can't download words. Problem with internet connection."
        );
    }

    #[test]
    fn test_user_message_remote_passes_through() {
        for phase in [
            ImportPhase::Authenticating,
            ImportPhase::FetchingCollections,
            ImportPhase::FetchingWords,
        ] {
            assert_eq!(
                user_message(phase, &Error::remote("Пользователь не найден")),
                "Пользователь не найден"
            );
        }
    }

    #[test]
    fn test_user_message_malformed_payloads_are_generic() {
        assert_eq!(
            user_message(
                ImportPhase::FetchingWords,
                &Error::protocol("GetWords response carried no data")
            ),
            INVALID_DATA_MESSAGE
        );

        let json_error = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        assert_eq!(
            user_message(ImportPhase::Authenticating, &Error::Json(json_error)),
            INVALID_DATA_MESSAGE
        );
    }

    #[test]
    fn test_cancellation_never_becomes_a_message() {
        assert!(matches!(
            fail(ImportPhase::FetchingWords, Error::Cancelled),
            RunFailure::Cancelled
        ));
        assert!(matches!(
            fail(ImportPhase::FetchingWords, Error::network("refused")),
            RunFailure::Message(_)
        ));
    }

    #[test]
    fn test_default_options_target_main_dictionary() {
        let options = ImportOptions::default();
        assert_eq!(options.selection, WordsetSelection::MainDictionary);
        assert_eq!(options.progress_filter, ProgressFilter::Any);
        assert!(!options.force_update);
        assert!(!options.use_legacy_api);
        assert!(options.media_dir.is_none());
    }

    #[tokio::test]
    async fn test_null_note_store_reports_nothing() {
        let word: WordRecord =
            serde_json::from_value(serde_json::json!({"id": 7, "wordValue": "cat"})).unwrap();
        assert!(!NullNoteStore.is_imported(&word).await);
    }
}
