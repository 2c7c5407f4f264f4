//! Merging result lists from several backends

use std::collections::HashSet;

use crate::record::FileRecord;

/// Concatenates the lists in invocation order and keeps the first record
/// seen for each path.
pub fn merge<I>(lists: I) -> Vec<FileRecord>
where
    I: IntoIterator<Item = Vec<FileRecord>>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();
    for record in lists.into_iter().flatten() {
        if seen.insert(record.path.clone()) {
            merged.push(record);
        }
    }
    merged
}
