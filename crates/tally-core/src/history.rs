//! Historical memory index
//!
//! Exact-match map from normalized description to the single category that
//! description has ever been validated as. Descriptions that were ever
//! assigned more than one category are excluded rather than guessed, and
//! uncategorized records never contribute. The index is derived, read-only
//! state, rebuilt from scratch on each build.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::models::{is_uncategorized_label, normalize_description};

#[derive(Debug, Clone, Default)]
pub struct HistoryIndex {
    map: HashMap<String, String>,
}

impl HistoryIndex {
    /// Build the index from validated (description, category) records.
    pub fn build<I, S, T>(records: I) -> Self
    where
        I: IntoIterator<Item = (S, T)>,
        S: AsRef<str>,
        T: AsRef<str>,
    {
        let mut grouped: HashMap<String, BTreeSet<String>> = HashMap::new();

        for (description, category) in records {
            let category = category.as_ref().trim();
            if category.is_empty() || is_uncategorized_label(category) {
                continue;
            }
            grouped
                .entry(normalize_description(description.as_ref()))
                .or_default()
                .insert(category.to_string());
        }

        let total = grouped.len();
        let map: HashMap<String, String> = grouped
            .into_iter()
            .filter_map(|(desc, categories)| {
                if categories.len() == 1 {
                    categories.into_iter().next().map(|c| (desc, c))
                } else {
                    // Ambiguous history is dropped, never tie-broken
                    None
                }
            })
            .collect();

        debug!(
            kept = map.len(),
            dropped = total - map.len(),
            "built history index"
        );

        Self { map }
    }

    /// Look up the category for a description, if its history is unambiguous.
    pub fn lookup(&self, description: &str) -> Option<&str> {
        self.map
            .get(&normalize_description(description))
            .map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_category_kept() {
        let index = HistoryIndex::build(vec![
            ("NETFLIX.COM", "Entertainment"),
            ("netflix.com ", "Entertainment"),
        ]);
        assert_eq!(index.lookup("Netflix.com"), Some("Entertainment"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_ambiguous_description_excluded() {
        let index = HistoryIndex::build(vec![
            ("AMAZON", "Shopping"),
            ("amazon", "Gifts"),
            ("GALP", "Fuel"),
        ]);
        assert_eq!(index.lookup("AMAZON"), None);
        assert_eq!(index.lookup("galp"), Some("Fuel"));
    }

    #[test]
    fn test_uncategorized_records_discarded() {
        // The sentinel must not count toward ambiguity either
        let index = HistoryIndex::build(vec![
            ("GALP", " uncategorized "),
            ("GALP", "Fuel"),
            ("MYSTERY", "Uncategorized"),
        ]);
        assert_eq!(index.lookup("GALP"), Some("Fuel"));
        assert_eq!(index.lookup("MYSTERY"), None);
    }

    #[test]
    fn test_unknown_description() {
        let index = HistoryIndex::build(vec![("GALP", "Fuel")]);
        assert_eq!(index.lookup("never seen"), None);
    }
}
