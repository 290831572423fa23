//! Live text filtering of the record set.
//!
//! A record matches when the query appears in its locality or reasons
//! (case-insensitively) or in its registration number (case-sensitively;
//! registration numbers are opaque identifiers, not prose). The result
//! is an order-preserving subsequence of the input.

use crate::models::SuspectProperty;

/// Filter records by a user-supplied query string.
///
/// An empty query matches every record. Absent fields deserialize to
/// empty strings upstream, so matching never panics.
pub fn filter_records(records: &[SuspectProperty], query: &str) -> Vec<SuspectProperty> {
    if query.is_empty() {
        return records.to_vec();
    }

    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|r| {
            r.locality.to_lowercase().contains(&needle)
                || r.registration_number.contains(query)
                || r.reasons.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}
