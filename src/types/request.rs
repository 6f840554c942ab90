//! Request bodies for the LinguaLeo listing endpoints
//!
//! The listing endpoints take JSON POST bodies with a fixed envelope and an
//! attribute list naming the fields the response should carry (response key
//! to service short key). The envelopes are reproduced verbatim; the service
//! rejects requests with missing envelope fields.

use serde_json::{Value, json};

/// Attribute list for `GetWords` requests.
pub(crate) fn words_attribute_list() -> Value {
    json!({
        "id": "id",
        "wordValue": "wd",
        "origin": "wo",
        "wordType": "wt",
        "translations": "trs",
        "wordSets": "ws",
        "created": "cd",
        "learningStatus": "ls",
        "progress": "pi",
        "transcription": "scr",
        "pronunciation": "pron",
        "relatedWords": "rw",
        "association": "as",
        "trainings": "trainings",
        "listWordSets": "listWordSets",
        "combinedTranslation": "trc",
        "picture": "pic",
        "speechPartId": "pid",
        "wordLemmaId": "lid",
        "wordLemmaValue": "lwd"
    })
}

/// Attribute list for `GetWordSets` requests.
pub(crate) fn wordsets_attribute_list() -> Value {
    json!({
        "type": "type",
        "id": "id",
        "name": "name",
        "countWords": "cw",
        "countWordsLearned": "cl",
        "wordSetId": "wordSetId",
        "picture": "pic",
        "category": "cat",
        "status": "st",
        "source": "src"
    })
}

fn request_ctx() -> Value {
    json!({"config": {"isCheckData": true, "isLogging": true}})
}

/// Parameters for one `GetWords` page request (apiVersion 1.0.1).
///
/// `date_group` and `offset_word_id` vary per page and are driven by the
/// pagination cursor; the rest stays fixed for the whole listing.
#[derive(Debug, Clone, PartialEq)]
pub struct WordsPageQuery {
    /// Date bucket to request ("start" opens the listing)
    pub date_group: String,

    /// Identifier of the last word already received from the bucket
    pub offset_word_id: Option<u64>,

    /// Server-side status narrowing; the pipeline always sends "all"
    pub status: String,

    /// Collection to list; 1 addresses the whole dictionary
    pub wordset_id: u64,

    /// Page size
    pub per_page: usize,
}

impl WordsPageQuery {
    /// Render the JSON POST body.
    pub fn body(&self) -> Value {
        let offset = match self.offset_word_id {
            Some(id) => json!({"wordId": id}),
            None => json!({}),
        };
        json!({
            "apiVersion": "1.0.1",
            "attrList": words_attribute_list(),
            "category": "",
            "dateGroup": self.date_group,
            "mode": "basic",
            "perPage": self.per_page,
            "status": self.status,
            "offset": offset,
            "search": "",
            "training": null,
            "wordSetId": self.wordset_id,
            "ctx": request_ctx(),
        })
    }
}

/// Body for one legacy `GetWords` page request (apiVersion 1.0.0).
///
/// The old revision takes the collection as a one-element `wordSetIds` list
/// and starts from a null offset.
pub(crate) fn legacy_words_body(
    status: &str,
    wordset_id: u64,
    per_page: usize,
    offset_word_id: Option<u64>,
) -> Value {
    let offset = match offset_word_id {
        Some(id) => json!({"wordId": id}),
        None => Value::Null,
    };
    json!({
        "apiVersion": "1.0.0",
        "attrList": words_attribute_list(),
        "category": "",
        "mode": "basic",
        "perPage": per_page,
        "status": status,
        "wordSetIds": [wordset_id],
        "offset": offset,
        "search": "",
        "training": null,
        "ctx": request_ctx(),
    })
}

/// Body for the `GetWordSets` listing request.
pub(crate) fn wordsets_body() -> Value {
    json!({
        "apiVersion": "1.0.0",
        "request": [{
            "subOp": "myAll",
            "type": "user",
            "perPage": 999,
            "attrList": wordsets_attribute_list(),
            "sortBy": "created"
        }],
        "ctx": request_ctx(),
    })
}
