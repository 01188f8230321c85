use std::collections::BTreeMap;

use crate::text::{normalize, strip_markup_like};

/// Lookup table from normalized source text to target text.
///
/// Keys are never empty. Keys iterate in sorted order, which keeps fuzzy
/// matching reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationMapping {
    entries: BTreeMap<String, String>,
}

impl TranslationMapping {
    /// Builds a mapping from two-column rows: source in column 1, target in column 2.
    ///
    /// Rows with fewer than two cells or an empty normalized source are skipped;
    /// a later row overwrites an earlier one with the same normalized source.
    pub fn from_delimited_rows<I, R, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut mapping = Self::default();
        for row in rows {
            let row: Vec<S> = row.into_iter().take(2).collect();
            let [source, target] = row.as_slice() else {
                continue;
            };
            mapping.insert(normalize(source.as_ref()), target.as_ref().trim().to_string());
        }
        mapping
    }

    /// Builds a mapping from table rows laid out as `(ignored, source, target)`.
    ///
    /// Both cells are stripped of markup-like runs before use.
    pub fn from_table_rows<I, R, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut mapping = Self::default();
        for row in rows {
            let row: Vec<S> = row.into_iter().take(3).collect();
            let [_, source, target] = row.as_slice() else {
                continue;
            };
            let source = normalize(&strip_markup_like(source.as_ref()));
            mapping.insert(source, strip_markup_like(target.as_ref()));
        }
        mapping
    }

    fn insert(&mut self, source: String, target: String) {
        if source.is_empty() {
            return;
        }
        self.entries.insert(source, target);
    }

    pub fn get(&self, source: &str) -> Option<&str> {
        self.entries.get(source).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}
