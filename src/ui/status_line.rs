use ratatui::{
    Frame,
    layout::{Position, Rect},
    style::{Color, Style},
    text::Line,
    widgets::Paragraph,
};

use crate::status_line::{InputMode, StatusLine};

/// Draw the status bar; in Command mode the cursor sits after the input.
pub fn draw_status_line(f: &mut Frame, area: Rect, status: &StatusLine) {
    let line = Line::from(format!(" {}", status.full_text()));
    let width = line.width() as u16;

    let paragraph = Paragraph::new(line).style(Style::default().fg(Color::Black).bg(Color::Red));
    f.render_widget(paragraph, area);

    if status.mode() == InputMode::Command {
        let x = area.x.saturating_add(width).min(area.right().saturating_sub(1));
        f.set_cursor_position(Position::new(x, area.y));
    }
}
