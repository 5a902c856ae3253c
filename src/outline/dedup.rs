//! Duplicate removal and page ordering for detected headings.

use std::collections::HashSet;

use crate::model::Heading;

/// Drop headings repeating an earlier `(text, page)` pair, then order by page.
///
/// The first occurrence survives. The sort is stable, so headings on the same
/// page keep their extraction order.
pub fn dedup_and_order(headings: Vec<Heading>) -> Vec<Heading> {
    let mut seen: HashSet<(String, u32)> = HashSet::with_capacity(headings.len());
    let mut unique: Vec<Heading> = headings
        .into_iter()
        .filter(|h| seen.insert((h.text.clone(), h.page)))
        .collect();

    unique.sort_by_key(|h| h.page);
    unique
}
