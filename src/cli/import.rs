//! Import mode CLI logic
//!
//! Drives one full import as a reference host: imported words go to stdout
//! as text or JSON lines, progress and failures go to stderr via tracing.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::ConfigLoader;
use crate::pipeline::{
    ImportEvent, ImportOptions, ImportPipeline, NullNoteStore, WordsetSelection,
};
use crate::session::Session;
use crate::types::{ProgressFilter, WordRecord, Wordset};

/// Arguments for import mode
#[derive(Debug)]
pub struct ImportArgs {
    pub config_file: Option<PathBuf>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub status: ProgressFilter,
    pub wordset_ids: Vec<u64>,
    pub all_wordsets: bool,
    pub legacy_api: bool,
    pub force_update: bool,
    /// `None` skips media downloads entirely.
    pub media_dir: Option<PathBuf>,
    pub cookie_file: Option<PathBuf>,
    pub words_per_request: Option<usize>,
    pub json: bool,
}

/// Run import mode with the given arguments.
pub async fn run_import_mode(args: ImportArgs) -> Result<()> {
    let ImportArgs {
        config_file,
        email,
        password,
        status,
        wordset_ids,
        all_wordsets,
        legacy_api,
        force_update,
        media_dir,
        cookie_file,
        words_per_request,
        json,
    } = args;

    let mut settings = ConfigLoader::new().load(config_file.as_deref())?;
    if let Some(email) = email {
        settings.account.email = email;
    }
    if let Some(password) = password {
        settings.account.password = Some(password);
    }
    if let Some(path) = cookie_file {
        settings.storage.cookie_file = Some(path);
    }
    if let Some(per_page) = words_per_request {
        settings.api.words_per_request = per_page;
    }
    settings.validate()?;

    let options = ImportOptions {
        selection: selection_from(all_wordsets, &wordset_ids),
        progress_filter: status,
        force_update,
        use_legacy_api: legacy_api,
        media_dir,
    };

    let session = Session::new(settings)?;
    let mut handle = ImportPipeline::spawn(session, options, Arc::new(NullNoteStore));

    let mut total = 0usize;
    let mut final_count: Option<usize> = None;
    let mut failure: Option<String> = None;

    while let Some(event) = handle.next_event().await {
        match event {
            ImportEvent::TotalWords(count) => {
                total = count;
                info!("Importing {} word(s)", count);
            }
            ImportEvent::WordReady(word) => print_word(&word, json)?,
            ImportEvent::Progress(count) => {
                debug!("Processed {}/{} word(s)", count, total);
            }
            ImportEvent::Error(message) => {
                warn!("{}", message);
                failure = Some(message);
            }
            ImportEvent::FinalCount(count) => final_count = Some(count),
            ImportEvent::Finished => break,
        }
    }
    handle.join().await;

    match final_count {
        Some(count) => {
            info!("Import finished: {} word(s)", count);
            Ok(())
        }
        None => {
            let message = failure.unwrap_or_else(|| "import was cancelled".to_string());
            anyhow::bail!(message)
        }
    }
}

/// Map the wordset flags onto a pipeline selection.
fn selection_from(all_wordsets: bool, wordset_ids: &[u64]) -> WordsetSelection {
    if all_wordsets {
        WordsetSelection::AllUserWordsets
    } else if wordset_ids.is_empty() {
        WordsetSelection::MainDictionary
    } else {
        WordsetSelection::Chosen(
            wordset_ids
                .iter()
                .map(|id| Wordset::new(*id, format!("wordset {id}"), 0))
                .collect(),
        )
    }
}

/// Render one imported word onto stdout.
fn print_word(word: &WordRecord, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(word)?);
    } else {
        let translation = display_translation(word);
        if translation.is_empty() {
            println!("{}", word.word_value);
        } else {
            println!("{}: {}", word.word_value, translation);
        }
    }
    Ok(())
}

/// Best display translation available on a record.
fn display_translation(word: &WordRecord) -> String {
    if let Some(combined) = word.combined_translation.as_deref()
        && !combined.is_empty()
    {
        return combined.to_string();
    }

    let Some(translations) = word.translations.as_ref().and_then(Value::as_array) else {
        return String::new();
    };
    let values: Vec<&str> = translations
        .iter()
        .filter_map(|entry| entry.get("value").and_then(Value::as_str))
        .collect();
    values.join(", ")
}
