//! Cross-collection word deduplication
//!
//! A word can belong to several collections at once, so importing more than
//! one collection would produce the same word repeatedly. Merging keeps the
//! first occurrence and preserves arrival order, which downstream progress
//! reporting relies on.

use std::collections::HashSet;

use crate::types::WordRecord;

/// Append `fetched` onto `collected`, skipping words whose id is already
/// present.
pub fn merge_unique(collected: &mut Vec<WordRecord>, fetched: Vec<WordRecord>) {
    let mut seen: HashSet<u64> = collected.iter().map(|word| word.id).collect();
    for word in fetched {
        if seen.insert(word.id) {
            collected.push(word);
        }
    }
}
