//! Wordset (word collection) descriptors

use serde::{Deserialize, Serialize};

use super::serde_helpers::{
    deserialize_flexible_string, deserialize_flexible_u64, deserialize_required_u64,
};

/// Identifier of the pseudo collection meaning "the whole user dictionary".
pub const MAIN_DICTIONARY_ID: u64 = 1;

/// One user wordset as returned by `GetWordSets`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Wordset {
    #[serde(deserialize_with = "deserialize_required_u64")]
    pub id: u64,

    #[serde(default)]
    pub name: String,

    /// Number of words in the set; sets with zero words are dropped
    /// from listings
    #[serde(
        rename = "countWords",
        default,
        deserialize_with = "deserialize_flexible_u64"
    )]
    pub count_words: Option<u64>,

    #[serde(
        rename = "countWordsLearned",
        default,
        deserialize_with = "deserialize_flexible_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub count_words_learned: Option<u64>,

    #[serde(
        rename = "wordSetId",
        default,
        deserialize_with = "deserialize_flexible_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub word_set_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_flexible_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub set_type: Option<String>,
}

impl Wordset {
    /// Build a wordset descriptor by hand; mainly for hosts and tests.
    pub fn new(id: u64, name: impl Into<String>, count_words: u64) -> Self {
        Self {
            id,
            name: name.into(),
            count_words: Some(count_words),
            count_words_learned: None,
            word_set_id: None,
            picture: None,
            category: None,
            status: None,
            source: None,
            set_type: None,
        }
    }

    /// The pseudo collection addressing the user's whole dictionary.
    pub fn main_dictionary() -> Self {
        Self::new(MAIN_DICTIONARY_ID, "Main dictionary", 0)
    }

    /// Whether the set holds any words at all.
    pub fn has_words(&self) -> bool {
        self.count_words.unwrap_or(0) > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wordset_deserialization() {
        let set: Wordset = serde_json::from_value(json!({
            "id": "4280",
            "name": "Phrasal verbs",
            "countWords": 120,
            "countWordsLearned": "13",
            "type": "user",
            "status": 4
        }))
        .unwrap();

        assert_eq!(set.id, 4280);
        assert_eq!(set.name, "Phrasal verbs");
        assert_eq!(set.count_words, Some(120));
        assert_eq!(set.count_words_learned, Some(13));
        assert_eq!(set.set_type.as_deref(), Some("user"));
        assert_eq!(set.status.as_deref(), Some("4"));
        assert!(set.has_words());
    }

    #[test]
    fn test_wordset_without_words() {
        let set: Wordset =
            serde_json::from_value(json!({"id": 9, "name": "Empty"})).unwrap();
        assert!(!set.has_words());
    }

    #[test]
    fn test_main_dictionary_pseudo_set() {
        let main = Wordset::main_dictionary();
        assert_eq!(main.id, MAIN_DICTIONARY_ID);
        assert!(!main.name.is_empty());
    }
}
