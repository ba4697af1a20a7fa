//! Key/value rows as edited by the host, and their derived mapping.
//!
//! # Design
//! The editor hands over an ordered list of rows, each carrying its own
//! `active` toggle. All filtering and override rules live in
//! `KeyValueSet::effective_mapping` so query params, headers and form fields
//! resolve identically, except that header names compare without case.

use serde::{Deserialize, Serialize};

/// A single editable row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValueRow {
    pub key: String,
    pub value: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl KeyValueRow {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            active: true,
        }
    }

    pub fn inactive(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            active: false,
            ..Self::new(key, value)
        }
    }

    /// Whether this row contributes to the effective mapping. The key is
    /// compared against `""` exactly; a key of `" "` still counts.
    pub fn is_effective(&self) -> bool {
        self.active && !self.key.is_empty()
    }
}

/// Ordered sequence of rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeyValueSet {
    rows: Vec<KeyValueRow>,
}

impl KeyValueSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// The editor's initial state: one blank, active row.
    pub fn with_blank_row() -> Self {
        Self {
            rows: vec![KeyValueRow::new("", "")],
        }
    }

    pub fn push(&mut self, row: KeyValueRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[KeyValueRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolve the rows into a key→value mapping.
    ///
    /// Rows that are inactive or have an empty key are skipped. A later
    /// effective row overwrites the value of an earlier one with the same key;
    /// the key keeps the position where it was first inserted.
    pub fn effective_mapping(&self) -> EffectiveMapping {
        let mut mapping = EffectiveMapping::default();
        for row in self.rows.iter().filter(|r| r.is_effective()) {
            mapping.insert(row.key.clone(), row.value.clone());
        }
        mapping
    }

    /// Like `effective_mapping`, but keys that differ only in ASCII case are
    /// the same key. The last row's spelling and value win. Used for headers.
    pub fn effective_mapping_ignore_case(&self) -> EffectiveMapping {
        let mut mapping = EffectiveMapping::default();
        for row in self.rows.iter().filter(|r| r.is_effective()) {
            mapping.insert_ignore_case(row.key.clone(), row.value.clone());
        }
        mapping
    }
}

impl From<Vec<KeyValueRow>> for KeyValueSet {
    fn from(rows: Vec<KeyValueRow>) -> Self {
        Self { rows }
    }
}

impl FromIterator<KeyValueRow> for KeyValueSet {
    fn from_iter<I: IntoIterator<Item = KeyValueRow>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

/// Resolved key→value mapping with unique keys in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectiveMapping {
    entries: Vec<(String, String)>,
}

impl EffectiveMapping {
    /// Insert or overwrite. Returns the previous value, if any.
    pub fn insert(&mut self, key: String, value: String) -> Option<String> {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Insert or overwrite, matching existing keys case-insensitively. The
    /// entry keeps its position but takes the new key spelling.
    pub fn insert_ignore_case(&mut self, key: String, value: String) -> Option<String> {
        match self
            .entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&key))
        {
            Some(entry) => Some(std::mem::replace(entry, (key, value)).1),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a EffectiveMapping {
    type Item = &'a (String, String);
    type IntoIter = std::slice::Iter<'a, (String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
