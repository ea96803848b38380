//! Track registry: opaque tag identifier → dense [`TrackIndex`].
//!
//! Indices are handed out in first-seen order starting at 0 and never
//! change or get reused. There is no removal.

use crate::types::TrackIndex;
use std::collections::HashMap;

#[derive(Clone, Debug, Default)]
pub struct TrackRegistry {
    indices: HashMap<String, TrackIndex>,
    /// identifiers[i] is the identifier owning TrackIndex(i)
    identifiers: Vec<String>,
}

impl TrackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the index for `identifier`, allocating the next one if it has
    /// never been seen. Returns `(index, is_new)`.
    pub fn resolve(&mut self, identifier: &str) -> (TrackIndex, bool) {
        if let Some(&idx) = self.indices.get(identifier) {
            return (idx, false);
        }
        let idx = TrackIndex(self.identifiers.len());
        self.indices.insert(identifier.to_string(), idx);
        self.identifiers.push(identifier.to_string());
        (idx, true)
    }

    /// Index of an already-seen identifier.
    pub fn get(&self, identifier: &str) -> Option<TrackIndex> {
        self.indices.get(identifier).copied()
    }

    /// Identifier that owns `index`.
    pub fn identifier(&self, index: TrackIndex) -> Option<&str> {
        self.identifiers.get(index.0).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }
}
