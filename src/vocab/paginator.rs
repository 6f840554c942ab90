//! Date-group pagination cursor for the word listing endpoint
//!
//! `GetWords` (apiVersion 1.0.1) returns words bucketed into date groups
//! ("new", "week_1", "year_2", ...). A page carries the next slice of the
//! requested bucket plus empty marker buckets that tell the client where to
//! continue. The cursor tracks the bucket and offset across pages; it is a
//! pure state machine, so the request loop around it stays trivial and the
//! stepping rules can be tested without a server.
//!
//! Stepping rules, applied to each page in bucket order:
//! - a bucket with words extends the result, points the cursor at that
//!   bucket and moves the offset to the last word received
//! - an empty bucket after a partial page switches the cursor to that
//!   bucket with a cleared offset
//! - an empty bucket after a full page is remembered as the follow-up
//!   bucket to try once the current one stops producing words
//!
//! The listing is complete when a page yields no words and no follow-up
//! bucket is pending.

use crate::error::{Error, Result};
use crate::types::{WordGroup, WordRecord, WordsPageQuery};

/// Opening bucket name understood by the service.
const OPENING_DATE_GROUP: &str = "start";

/// Cursor over the date-group listing of one collection.
#[derive(Debug, Clone)]
pub struct DateGroupCursor {
    wordset_id: u64,
    per_page: usize,
    /// Bucket the next request continues from
    date_group: String,
    /// Identifier of the last word received, kept across bucket switches
    /// triggered by a full page
    offset_word_id: Option<u64>,
    /// Bucket to fall back to when the current one stops producing words
    follow_up_group: Option<String>,
    /// Word count of the previously absorbed page
    last_received: usize,
}

impl DateGroupCursor {
    /// Cursor positioned at the opening of the listing.
    pub fn new(wordset_id: u64, per_page: usize) -> Self {
        Self {
            wordset_id,
            per_page,
            date_group: OPENING_DATE_GROUP.to_string(),
            offset_word_id: None,
            follow_up_group: Some(OPENING_DATE_GROUP.to_string()),
            last_received: 0,
        }
    }

    /// Produce the next page request, or `None` once the listing is
    /// complete.
    ///
    /// After a page that yielded no words the pending follow-up bucket is
    /// consumed; with none pending the listing is over.
    pub fn next_query(&mut self) -> Option<WordsPageQuery> {
        let date_group = if self.last_received == 0 {
            self.follow_up_group.take()?
        } else {
            self.date_group.clone()
        };

        Some(WordsPageQuery {
            date_group,
            offset_word_id: self.offset_word_id,
            status: "all".to_string(),
            wordset_id: self.wordset_id,
            per_page: self.per_page,
        })
    }

    /// Fold one page of buckets into the cursor and return the words it
    /// carried, in listing order.
    ///
    /// Buckets that are empty before any words arrived on this page are
    /// placeholders and are skipped. The first empty bucket after words
    /// decides how to continue and ends the scan.
    pub fn absorb(&mut self, groups: Vec<WordGroup>) -> Result<Vec<WordRecord>> {
        let mut page = Vec::new();
        self.last_received = 0;

        for group in groups {
            if !group.words.is_empty() {
                self.last_received += group.words.len();
                self.date_group = named(&group)?.to_string();
                if let Some(last) = group.words.last() {
                    self.offset_word_id = Some(last.id);
                }
                page.extend(group.words);
            } else if self.last_received > 0 {
                let group_name = named(&group)?.to_string();
                if self.last_received < self.per_page {
                    // The producing bucket is exhausted, restart cleanly
                    // from the next one
                    self.date_group = group_name;
                    self.follow_up_group = None;
                    self.offset_word_id = None;
                } else {
                    // A full page may mean more words in the current
                    // bucket; remember where to go once it runs dry
                    self.follow_up_group = Some(group_name);
                }
                break;
            }
        }

        Ok(page)
    }
}

fn named(group: &WordGroup) -> Result<&str> {
    group
        .group_name
        .as_deref()
        .ok_or_else(|| Error::protocol("word group in GetWords response is missing groupName"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn group(name: &str, ids: &[u64]) -> WordGroup {
        serde_json::from_value(json!({
            "groupName": name,
            "groupCount": ids.len(),
            "words": ids
                .iter()
                .map(|id| json!({"id": id, "wordValue": format!("word-{id}")}))
                .collect::<Vec<_>>(),
        }))
        .unwrap()
    }

    fn unnamed_group(ids: &[u64]) -> WordGroup {
        serde_json::from_value(json!({
            "words": ids
                .iter()
                .map(|id| json!({"id": id, "wordValue": format!("word-{id}")}))
                .collect::<Vec<_>>(),
        }))
        .unwrap()
    }

    #[test]
    fn test_opening_query() {
        let mut cursor = DateGroupCursor::new(1, 999);
        let query = cursor.next_query().unwrap();

        assert_eq!(query.date_group, "start");
        assert_eq!(query.offset_word_id, None);
        assert_eq!(query.status, "all");
        assert_eq!(query.wordset_id, 1);
        assert_eq!(query.per_page, 999);
    }

    #[test]
    fn test_empty_dictionary_terminates_after_one_page() {
        let mut cursor = DateGroupCursor::new(1, 999);
        cursor.next_query().unwrap();

        let words = cursor
            .absorb(vec![group("new", &[]), group("week_1", &[])])
            .unwrap();
        assert!(words.is_empty());
        assert!(cursor.next_query().is_none());
    }

    #[test]
    fn test_partial_page_switches_bucket_and_clears_offset() {
        let mut cursor = DateGroupCursor::new(1, 999);
        cursor.next_query().unwrap();

        // 3 words in "new", then the empty "week_1" marker
        let words = cursor
            .absorb(vec![group("new", &[11, 12, 13]), group("week_1", &[])])
            .unwrap();
        assert_eq!(words.len(), 3);

        let query = cursor.next_query().unwrap();
        assert_eq!(query.date_group, "week_1");
        assert_eq!(query.offset_word_id, None);
    }

    #[test]
    fn test_full_page_continues_same_bucket_with_offset() {
        let mut cursor = DateGroupCursor::new(1, 3);
        cursor.next_query().unwrap();

        let words = cursor
            .absorb(vec![group("new", &[1, 2, 3]), group("year_1", &[])])
            .unwrap();
        assert_eq!(words.len(), 3);

        // A full page keeps requesting "new" from the last id
        let query = cursor.next_query().unwrap();
        assert_eq!(query.date_group, "new");
        assert_eq!(query.offset_word_id, Some(3));
    }

    #[test]
    fn test_full_page_then_follow_up_bucket() {
        let mut cursor = DateGroupCursor::new(1, 3);
        cursor.next_query().unwrap();

        // Page 1: full page from "new", "year_1" marked as follow-up
        cursor
            .absorb(vec![group("new", &[1, 2, 3]), group("year_1", &[])])
            .unwrap();
        cursor.next_query().unwrap();

        // Page 2: "new" has run dry
        let words = cursor.absorb(vec![group("new", &[])]).unwrap();
        assert!(words.is_empty());

        // The follow-up bucket is consumed next
        let query = cursor.next_query().unwrap();
        assert_eq!(query.date_group, "year_1");

        // Page 3: follow-up is empty too, listing is over
        cursor.absorb(vec![group("year_1", &[])]).unwrap();
        assert!(cursor.next_query().is_none());
    }

    #[test]
    fn test_thousand_words_across_buckets() {
        let per_page = 999;
        let mut cursor = DateGroupCursor::new(1, per_page);
        let mut collected = Vec::new();

        // Page 1: "new" fills the whole page
        cursor.next_query().unwrap();
        let ids: Vec<u64> = (1..=999).collect();
        collected.extend(
            cursor
                .absorb(vec![group("new", &ids), group("year_1", &[])])
                .unwrap(),
        );

        // Page 2: "new" is exhausted, word 1000 arrives from "year_1"
        let query = cursor.next_query().unwrap();
        assert_eq!(query.date_group, "new");
        assert_eq!(query.offset_word_id, Some(999));
        collected.extend(
            cursor
                .absorb(vec![group("new", &[]), group("year_1", &[1000])])
                .unwrap(),
        );

        // Page 3: current bucket gives nothing more
        let query = cursor.next_query().unwrap();
        assert_eq!(query.date_group, "year_1");
        collected.extend(cursor.absorb(vec![group("year_1", &[])]).unwrap());

        // Page 4: pending follow-up from page 1 is drained before stopping
        let query = cursor.next_query().unwrap();
        assert_eq!(query.date_group, "year_1");
        collected.extend(cursor.absorb(vec![]).unwrap());
        assert!(cursor.next_query().is_none());

        assert_eq!(collected.len(), 1000);
        assert_eq!(collected[999].id, 1000);
    }

    #[test]
    fn test_leading_empty_buckets_are_skipped() {
        let mut cursor = DateGroupCursor::new(1, 999);
        cursor.next_query().unwrap();

        let words = cursor
            .absorb(vec![
                group("new", &[]),
                group("week_1", &[21, 22]),
                group("month_1", &[]),
            ])
            .unwrap();

        assert_eq!(words.len(), 2);
        let query = cursor.next_query().unwrap();
        assert_eq!(query.date_group, "month_1");
    }

    #[test]
    fn test_multiple_producing_buckets_in_one_page() {
        let mut cursor = DateGroupCursor::new(1, 999);
        cursor.next_query().unwrap();

        let words = cursor
            .absorb(vec![
                group("new", &[1, 2]),
                group("week_1", &[3]),
                group("month_1", &[]),
            ])
            .unwrap();

        assert_eq!(words.iter().map(|w| w.id).collect::<Vec<_>>(), vec![1, 2, 3]);
        let query = cursor.next_query().unwrap();
        assert_eq!(query.date_group, "month_1");
        assert_eq!(query.offset_word_id, None);
    }

    #[test]
    fn test_unnamed_producing_bucket_is_a_protocol_error() {
        let mut cursor = DateGroupCursor::new(1, 999);
        cursor.next_query().unwrap();

        let result = cursor.absorb(vec![unnamed_group(&[1])]);
        assert!(matches!(result, Err(Error::Protocol(_))));
    }

    #[test]
    fn test_unnamed_marker_bucket_is_a_protocol_error() {
        let mut cursor = DateGroupCursor::new(1, 999);
        cursor.next_query().unwrap();

        let result = cursor.absorb(vec![group("new", &[1]), unnamed_group(&[])]);
        assert!(matches!(result, Err(Error::Protocol(_))));
    }
}
