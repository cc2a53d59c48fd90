//! Incremental substring search over the displayed listing.

use std::collections::BTreeMap;
use std::ops::Range;

use crate::file_list::FileList;

/// Byte ranges of the non-overlapping occurrences of `needle` in `haystack`.
/// An empty needle matches nothing.
pub fn match_spans(haystack: &str, needle: &str) -> Vec<Range<usize>> {
    if needle.is_empty() {
        return Vec::new();
    }
    haystack
        .match_indices(needle)
        .map(|(start, matched)| start..start + matched.len())
        .collect()
}

/// Nearest match after `selected`, wrapping to the first match otherwise.
pub fn next_match(marked: &[usize], selected: usize) -> Option<usize> {
    let (before, after): (Vec<usize>, Vec<usize>) =
        marked.iter().partition(|&&index| index <= selected);
    after.first().or(before.first()).copied()
}

/// Nearest match before `selected`, wrapping to the last match otherwise.
pub fn previous_match(marked: &[usize], selected: usize) -> Option<usize> {
    let (before, after): (Vec<usize>, Vec<usize>) =
        marked.iter().partition(|&&index| index < selected);
    before.last().or(after.last()).copied()
}

/// One find session: display names are captured once when the prompt opens
/// and every query change is evaluated against that fixed set.
#[derive(Clone, Debug, Default)]
pub struct SearchMatcher {
    names: Vec<String>,
}

impl SearchMatcher {
    /// Clear all highlights and capture the names to search.
    pub fn start(list: &mut FileList) -> Self {
        list.clear_marks();
        Self {
            names: list.entries().iter().map(|e| e.display_name()).collect(),
        }
    }

    pub fn update_query(&self, list: &mut FileList, query: &str) {
        let highlights: BTreeMap<usize, Vec<Range<usize>>> = self
            .names
            .iter()
            .enumerate()
            .filter_map(|(index, name)| {
                let spans = match_spans(name, query);
                (!spans.is_empty()).then_some((index, spans))
            })
            .collect();
        list.set_highlights(highlights);
    }

    /// Feedback once the prompt is confirmed; highlights stay in place.
    pub fn finish(&self, list: &FileList) -> String {
        format!("Found {} match(es).", list.marked_indices().len())
    }
}
