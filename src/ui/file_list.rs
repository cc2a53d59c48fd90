//! Directory listing rows with selection and find highlights.

use std::ops::Range;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState},
};

use crate::file_list::FileList;
use crate::filesystem::Entry;

const DETAILS_WIDTH: usize = 26;

fn row_style() -> Style {
    Style::default().fg(Color::White)
}

fn dir_style() -> Style {
    Style::default()
        .fg(Color::LightBlue)
        .add_modifier(Modifier::BOLD)
}

fn selected_style() -> Style {
    Style::default().fg(Color::Black).bg(Color::Red)
}

fn match_style() -> Style {
    Style::default().fg(Color::Black).bg(Color::Yellow)
}

/// Human readable size, e.g. `512B`, `1.5K`, `3.0M`
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["K", "M", "G", "T", "P"];
    if bytes < 1024 {
        return format!("{bytes}B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1}{}", UNITS[unit])
}

fn format_modified(time: SystemTime) -> String {
    DateTime::<Local>::from(time)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

/// Split `name` into plain and highlighted spans
fn name_spans(name: &str, highlights: &[Range<usize>], base: Style) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut cursor = 0;
    for range in highlights {
        let (Some(before), Some(matched)) =
            (name.get(cursor..range.start), name.get(range.clone()))
        else {
            continue;
        };
        if !before.is_empty() {
            spans.push(Span::styled(before.to_string(), base));
        }
        spans.push(Span::styled(matched.to_string(), match_style()));
        cursor = range.end;
    }
    if let Some(rest) = name.get(cursor..) {
        if !rest.is_empty() {
            spans.push(Span::styled(rest.to_string(), base));
        }
    }
    spans
}

fn details(entry: &Entry) -> String {
    let size = match entry.metadata.size {
        Some(size) if !entry.is_dir => format_size(size),
        _ => String::new(),
    };
    let modified = entry
        .metadata
        .modified
        .map(format_modified)
        .unwrap_or_default();
    format!("{size:>8}  {modified:<16}")
}

fn entry_line(entry: &Entry, highlights: &[Range<usize>], width: usize) -> Line<'static> {
    let base = if entry.is_dir { dir_style() } else { row_style() };
    let mut spans = vec![Span::raw(" ")];
    spans.extend(name_spans(&entry.display_name(), highlights, base));
    if entry.metadata.is_symlink {
        spans.push(Span::styled(" @", Style::default().fg(Color::DarkGray)));
    }

    let used: usize = spans.iter().map(Span::width).sum();
    if !entry.is_parent_link() && width > used + DETAILS_WIDTH + 1 {
        let padding = width - used - DETAILS_WIDTH;
        spans.push(Span::raw(" ".repeat(padding)));
        spans.push(Span::styled(
            details(entry),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

pub fn draw_file_list(f: &mut Frame, area: Rect, list: &FileList, state: &mut ListState) {
    let width = area.width as usize;
    let items: Vec<ListItem> = list
        .entries()
        .iter()
        .enumerate()
        .map(|(index, entry)| ListItem::new(entry_line(entry, list.highlights(index), width)))
        .collect();

    let widget = List::new(items)
        .style(row_style())
        .highlight_style(selected_style());

    state.select(list.selected_index());
    f.render_stateful_widget(widget, area, state);
}
