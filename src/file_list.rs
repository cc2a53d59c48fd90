use std::collections::BTreeMap;
use std::ops::Range;

use crate::error::{AppError, Result};
use crate::filesystem::Entry;
use crate::search;

/// Entries of the displayed directory plus selection and match highlights.
///
/// `selected` is a valid index whenever `entries` is non-empty. Highlight
/// spans are byte ranges into each entry's display name.
#[derive(Clone, Debug, Default)]
pub struct FileList {
    path: String,
    entries: Vec<Entry>,
    selected: usize,
    highlights: BTreeMap<usize, Vec<Range<usize>>>,
}

impl FileList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a new listing, resetting selection and highlights.
    pub fn replace(&mut self, path: impl Into<String>, entries: Vec<Entry>) {
        self.path = path.into();
        self.entries = entries;
        self.selected = 0;
        self.highlights.clear();
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn selected_index(&self) -> Option<usize> {
        if self.entries.is_empty() {
            None
        } else {
            Some(self.selected)
        }
    }

    pub fn selected_entry(&self) -> Result<&Entry> {
        self.entries.get(self.selected).ok_or(AppError::EmptyListing)
    }

    /// Select `index` if it is in range.
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.entries.len() {
            self.selected = index;
            true
        } else {
            false
        }
    }

    pub fn select_next(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.entries.len();
    }

    pub fn select_previous(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.selected = if self.selected == 0 {
            self.entries.len() - 1
        } else {
            self.selected - 1
        };
    }

    /// Highlight every occurrence of `query` in the display names.
    pub fn mark_matches(&mut self, query: &str) {
        let mut highlights = BTreeMap::new();
        for (index, entry) in self.entries.iter().enumerate() {
            let spans = search::match_spans(&entry.display_name(), query);
            if !spans.is_empty() {
                highlights.insert(index, spans);
            }
        }
        self.highlights = highlights;
    }

    pub fn set_highlights(&mut self, highlights: BTreeMap<usize, Vec<Range<usize>>>) {
        self.highlights = highlights;
        self.highlights.retain(|index, spans| *index < self.entries.len() && !spans.is_empty());
    }

    pub fn clear_marks(&mut self) {
        self.highlights.clear();
    }

    pub fn highlights(&self, index: usize) -> &[Range<usize>] {
        self.highlights.get(&index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Indices with at least one highlight span, ascending.
    pub fn marked_indices(&self) -> Vec<usize> {
        self.highlights.keys().copied().collect()
    }
}
