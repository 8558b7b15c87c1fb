//! Instant-suggestion search over product names and descriptions.
//!
//! Matching is plain case-insensitive substring containment. Results rank
//! name-prefix matches first, then by where the query occurs (name matches
//! before description-only matches), then alphabetically by name, then by
//! product code so identical names stay in a stable order.

use std::cmp::Ordering;
use tracing::debug;

use crate::catalogue::{Catalogue, Product};

struct Entry<'a> {
    name: String,
    description: String,
    product: &'a Product,
}

/// Sorted (name, product) index built from a catalogue.
pub struct SearchIndex<'a> {
    entries: Vec<Entry<'a>>,
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum MatchKind {
    NamePrefix,
    Name,
    Description,
}

impl<'a> SearchIndex<'a> {
    pub fn new(catalogue: &'a Catalogue) -> Self {
        let mut entries: Vec<Entry<'a>> = catalogue
            .products()
            .map(|product| Entry {
                name: product.name.to_lowercase(),
                description: product.description.to_lowercase(),
                product,
            })
            .collect();
        entries.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.product.code.cmp(&b.product.code))
        });
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Up to `limit` products whose name or description contains `query`.
    /// An empty query returns nothing.
    pub fn suggest(&self, query: &str, limit: usize) -> Vec<&'a Product> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(MatchKind, usize, &Entry<'a>)> = self
            .entries
            .iter()
            .filter_map(|entry| match entry.name.find(&needle) {
                Some(0) => Some((MatchKind::NamePrefix, 0, entry)),
                Some(pos) => Some((MatchKind::Name, pos, entry)),
                None => entry
                    .description
                    .find(&needle)
                    .map(|pos| (MatchKind::Description, pos, entry)),
            })
            .collect();

        // entries are already in (name, code) order, so a stable sort on
        // (kind, position) keeps the alphabetical tie-break
        scored.sort_by(|a, b| match a.0.cmp(&b.0) {
            Ordering::Equal => a.1.cmp(&b.1),
            other => other,
        });

        debug!(query = %needle, matches = scored.len(), limit, "search");
        scored
            .into_iter()
            .take(limit)
            .map(|(_, _, entry)| entry.product)
            .collect()
    }
}
