//! Response envelopes for the LinguaLeo endpoints
//!
//! The service wraps payloads in loose envelopes: an optional `error` field
//! (whose shape varies) next to an optional `data` field. Deserialization
//! stays tolerant; structural decisions (is this an error? is data present?)
//! are made by explicit helpers so their semantics are testable.

use serde::Deserialize;
use serde_json::Value;

use super::serde_helpers::deserialize_flexible_bool;
use super::word::WordRecord;
use super::wordset::Wordset;

/// Response of the auth dispatch endpoint.
///
/// Success responses carry user data; rejections carry a non-empty
/// `error_msg`. An empty `error_msg` string counts as success.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub error_msg: Option<String>,

    /// User payload, passed through untouched
    #[serde(default)]
    pub user: Option<Value>,
}

impl AuthResponse {
    /// The rejection message, if the service reported one.
    pub fn rejection(&self) -> Option<&str> {
        match self.error_msg.as_deref() {
            Some(msg) if !msg.is_empty() => Some(msg),
            _ => None,
        }
    }
}

/// Response of `GET api/isauthorized`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthCheckResponse {
    #[serde(default, deserialize_with = "deserialize_flexible_bool")]
    pub is_authorized: Option<bool>,
}

impl AuthCheckResponse {
    /// A missing flag counts as not authorized.
    pub fn authorized(&self) -> bool {
        self.is_authorized.unwrap_or(false)
    }
}

/// One date bucket of a `GetWords` response.
#[derive(Debug, Clone, Deserialize)]
pub struct WordGroup {
    /// Bucket name, e.g. "new" or "year_2"
    #[serde(rename = "groupName", default)]
    pub group_name: Option<String>,

    /// Total words in the bucket as counted by the service
    #[serde(rename = "groupCount", default)]
    pub group_count: Option<Value>,

    #[serde(default)]
    pub words: Vec<WordRecord>,
}

/// Envelope of a `GetWords` response (apiVersion 1.0.1).
#[derive(Debug, Clone, Deserialize)]
pub struct WordsResponse {
    #[serde(default)]
    pub error: Option<Value>,

    #[serde(default)]
    pub data: Option<Vec<WordGroup>>,
}

/// Envelope of a legacy `GetWords` response (apiVersion 1.0.0): the data
/// field is a flat word list.
#[derive(Debug, Clone, Deserialize)]
pub struct LegacyWordsResponse {
    #[serde(default)]
    pub error: Option<Value>,

    #[serde(default)]
    pub data: Option<Vec<WordRecord>>,
}

/// One page of a `GetWordSets` response; wordsets live under `items`.
#[derive(Debug, Clone, Deserialize)]
pub struct WordsetPage {
    #[serde(default)]
    pub items: Vec<Wordset>,
}

/// Envelope of a `GetWordSets` response.
#[derive(Debug, Clone, Deserialize)]
pub struct WordsetsResponse {
    #[serde(default)]
    pub error: Option<Value>,

    #[serde(default)]
    pub data: Option<Vec<WordsetPage>>,
}

/// Extract a remote error message from an envelope `error` field.
///
/// The service reports errors as objects with a `message`, as bare strings,
/// or as numbers; it also emits vacuous values (`null`, `{}`, `""`, `0`,
/// `false`) that do NOT signal an error and must be ignored.
pub fn remote_error_message(error: Option<&Value>) -> Option<String> {
    match error? {
        Value::Null | Value::Bool(false) => None,
        Value::Bool(true) => Some("unspecified error".to_string()),
        Value::Number(n) => {
            if n.as_f64() == Some(0.0) {
                None
            } else {
                Some(format!("error code {n}"))
            }
        }
        Value::String(s) => {
            if s.is_empty() {
                None
            } else {
                Some(s.clone())
            }
        }
        Value::Object(map) => {
            if map.is_empty() {
                return None;
            }
            match map.get("message") {
                Some(Value::String(msg)) if !msg.is_empty() => Some(msg.clone()),
                _ => Some(Value::Object(map.clone()).to_string()),
            }
        }
        Value::Array(items) => {
            if items.is_empty() {
                None
            } else {
                Some(Value::Array(items.clone()).to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_auth_response_rejection() {
        let response: AuthResponse =
            serde_json::from_value(json!({"error_msg": "Invalid password"})).unwrap();
        assert_eq!(response.rejection(), Some("Invalid password"));

        let response: AuthResponse =
            serde_json::from_value(json!({"error_msg": "", "user": {"id": 1}})).unwrap();
        assert_eq!(response.rejection(), None);

        let response: AuthResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(response.rejection(), None);
    }

    #[test]
    fn test_auth_check_variants() {
        let response: AuthCheckResponse =
            serde_json::from_value(json!({"is_authorized": true})).unwrap();
        assert!(response.authorized());

        let response: AuthCheckResponse =
            serde_json::from_value(json!({"is_authorized": 0})).unwrap();
        assert!(!response.authorized());

        let response: AuthCheckResponse = serde_json::from_value(json!({})).unwrap();
        assert!(!response.authorized());
    }

    #[test]
    fn test_words_response_buckets() {
        let response: WordsResponse = serde_json::from_value(json!({
            "data": [
                {"groupName": "new", "groupCount": 2, "words": [
                    {"id": 1, "wordValue": "cat"},
                    {"id": 2, "wordValue": "dog"}
                ]},
                {"groupName": "year_1", "groupCount": 0, "words": []}
            ]
        }))
        .unwrap();

        let groups = response.data.unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].group_name.as_deref(), Some("new"));
        assert_eq!(groups[0].words.len(), 2);
        assert!(groups[1].words.is_empty());
    }

    #[test]
    fn test_wordsets_response_items() {
        let response: WordsetsResponse = serde_json::from_value(json!({
            "data": [{"items": [
                {"id": 1, "name": "Main", "countWords": 100},
                {"id": 2, "name": "Empty", "countWords": 0}
            ]}]
        }))
        .unwrap();

        let pages = response.data.unwrap();
        assert_eq!(pages[0].items.len(), 2);
        assert!(pages[0].items[0].has_words());
        assert!(!pages[0].items[1].has_words());
    }

    #[test]
    fn test_remote_error_truthiness() {
        assert_eq!(remote_error_message(None), None);
        assert_eq!(remote_error_message(Some(&json!(null))), None);
        assert_eq!(remote_error_message(Some(&json!(""))), None);
        assert_eq!(remote_error_message(Some(&json!({}))), None);
        assert_eq!(remote_error_message(Some(&json!(0))), None);
        assert_eq!(remote_error_message(Some(&json!(false))), None);
        assert_eq!(remote_error_message(Some(&json!([]))), None);

        assert_eq!(
            remote_error_message(Some(&json!("access denied"))),
            Some("access denied".to_string())
        );
        assert_eq!(
            remote_error_message(Some(&json!({"message": "bad request"}))),
            Some("bad request".to_string())
        );
        assert_eq!(
            remote_error_message(Some(&json!(500))),
            Some("error code 500".to_string())
        );
        // An object without a usable message still signals an error
        assert!(remote_error_message(Some(&json!({"code": 3}))).is_some());
    }
}
