//! Vocabulary word records and progress filtering

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

use super::serde_helpers::{
    deserialize_flexible_i64, deserialize_flexible_u64, deserialize_required_u64,
};

/// One vocabulary word as returned by the word listing endpoints.
///
/// Only `id` is structurally required; the service omits or nulls most
/// attributes depending on the word's state and the API revision. Keys the
/// crate does not interpret are preserved in [`WordRecord::extra`] so hosts
/// can still template on them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WordRecord {
    /// Unique word identifier; the dedup key
    #[serde(deserialize_with = "deserialize_required_u64")]
    pub id: u64,

    /// The word itself
    #[serde(rename = "wordValue", default)]
    pub word_value: String,

    /// Source text the word was encountered in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,

    #[serde(
        rename = "wordType",
        default,
        deserialize_with = "deserialize_flexible_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub word_type: Option<i64>,

    /// Translation list; the shape varies across API revisions and is
    /// passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translations: Option<Value>,

    /// Ready-made display translation
    #[serde(
        rename = "combinedTranslation",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub combined_translation: Option<String>,

    /// Wordset membership, passed through untouched
    #[serde(rename = "wordSets", default, skip_serializing_if = "Option::is_none")]
    pub word_sets: Option<Value>,

    /// Creation timestamp as reported by the service
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    #[serde(
        rename = "learningStatus",
        default,
        deserialize_with = "deserialize_flexible_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub learning_status: Option<i64>,

    /// Learning progress percent, 0..=100. Older API revisions used the
    /// `progress_percent` key.
    #[serde(
        default,
        alias = "progress_percent",
        deserialize_with = "deserialize_flexible_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub progress: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,

    /// Pronunciation audio URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pronunciation: Option<String>,

    /// Picture URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,

    #[serde(
        rename = "speechPartId",
        default,
        deserialize_with = "deserialize_flexible_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub speech_part_id: Option<i64>,

    #[serde(
        rename = "wordLemmaId",
        default,
        deserialize_with = "deserialize_flexible_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub word_lemma_id: Option<u64>,

    #[serde(
        rename = "wordLemmaValue",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub word_lemma_value: Option<String>,

    /// Attributes this crate does not interpret, kept for hosts
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl WordRecord {
    /// Create a minimal record; mainly useful for hosts and tests.
    pub fn new(id: u64, word_value: impl Into<String>) -> Self {
        Self {
            id,
            word_value: word_value.into(),
            origin: None,
            word_type: None,
            translations: None,
            combined_translation: None,
            word_sets: None,
            created: None,
            learning_status: None,
            progress: None,
            transcription: None,
            pronunciation: None,
            picture: None,
            speech_part_id: None,
            word_lemma_id: None,
            word_lemma_value: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Learning progress percent; absent counts as not started.
    pub fn progress_percent(&self) -> i64 {
        self.progress.unwrap_or(0)
    }
}

/// Client-side learning-progress filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgressFilter {
    /// Keep every word
    #[default]
    Any,
    /// Keep only fully learned words (progress 100)
    Studied,
    /// Keep words still being learned (progress below 100)
    Unstudied,
}

impl ProgressFilter {
    /// Whether a word passes this filter.
    pub fn matches(&self, word: &WordRecord) -> bool {
        match self {
            Self::Any => true,
            Self::Studied => word.progress_percent() == 100,
            Self::Unstudied => word.progress_percent() < 100,
        }
    }

    /// Adjective used in user-facing messages, if the filter narrows.
    pub fn adjective(&self) -> Option<&'static str> {
        match self {
            Self::Any => None,
            Self::Studied => Some("studied"),
            Self::Unstudied => Some("unstudied"),
        }
    }
}

impl std::str::FromStr for ProgressFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "any" | "all" => Ok(Self::Any),
            "studied" | "learned" => Ok(Self::Studied),
            "unstudied" | "unlearned" => Ok(Self::Unstudied),
            other => Err(Error::config(format!(
                "unknown progress filter '{other}' (expected any, studied or unstudied)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_word_deserialization_tolerates_mixed_types() {
        let word: WordRecord = serde_json::from_value(json!({
            "id": "33314",
            "wordValue": "cat",
            "progress": "75",
            "pronunciation": "https://audiocdn.lingualeo.com/v2/3/33314.mp3",
            "translations": [{"id": 1, "value": "кот"}],
            "speechPartId": 2,
            "votes": 17
        }))
        .unwrap();

        assert_eq!(word.id, 33314);
        assert_eq!(word.word_value, "cat");
        assert_eq!(word.progress, Some(75));
        assert!(word.pronunciation.as_deref().unwrap().ends_with(".mp3"));
        assert!(word.translations.is_some());
        assert_eq!(word.speech_part_id, Some(2));
        assert_eq!(word.extra.get("votes"), Some(&json!(17)));
    }

    #[test]
    fn test_word_requires_id() {
        let result = serde_json::from_value::<WordRecord>(json!({"wordValue": "dog"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_word_accepts_legacy_progress_key() {
        let word: WordRecord = serde_json::from_value(json!({
            "id": 7,
            "wordValue": "dog",
            "progress_percent": 100
        }))
        .unwrap();
        assert_eq!(word.progress_percent(), 100);
    }

    #[test]
    fn test_word_serializes_with_service_keys() {
        let mut word = WordRecord::new(5, "mill");
        word.combined_translation = Some("мельница".to_string());
        let value = serde_json::to_value(&word).unwrap();
        assert_eq!(value["wordValue"], json!("mill"));
        assert_eq!(value["combinedTranslation"], json!("мельница"));
        assert!(value.get("picture").is_none());
    }

    #[test]
    fn test_progress_filter_boundaries() {
        let mut word = WordRecord::new(1, "cat");

        word.progress = Some(100);
        assert!(ProgressFilter::Studied.matches(&word));
        assert!(!ProgressFilter::Unstudied.matches(&word));
        assert!(ProgressFilter::Any.matches(&word));

        word.progress = Some(99);
        assert!(!ProgressFilter::Studied.matches(&word));
        assert!(ProgressFilter::Unstudied.matches(&word));

        word.progress = None;
        assert!(ProgressFilter::Unstudied.matches(&word));
        assert!(!ProgressFilter::Studied.matches(&word));
    }

    #[test]
    fn test_progress_filter_parsing() {
        assert_eq!("any".parse::<ProgressFilter>().unwrap(), ProgressFilter::Any);
        assert_eq!(
            "Studied".parse::<ProgressFilter>().unwrap(),
            ProgressFilter::Studied
        );
        assert_eq!(
            "unstudied".parse::<ProgressFilter>().unwrap(),
            ProgressFilter::Unstudied
        );
        assert!("sideways".parse::<ProgressFilter>().is_err());
    }

    #[test]
    fn test_progress_filter_adjectives() {
        assert_eq!(ProgressFilter::Any.adjective(), None);
        assert_eq!(ProgressFilter::Studied.adjective(), Some("studied"));
        assert_eq!(ProgressFilter::Unstudied.adjective(), Some("unstudied"));
    }
}
