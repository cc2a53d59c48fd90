pub mod file_list;
pub mod status_line;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

pub use file_list::draw_file_list;
pub use status_line::draw_status_line;

use crate::App;

const STATUS_LINE_HEIGHT: u16 = 1;

/// Draw the listing above a one-line status bar
pub fn draw(f: &mut Frame, app: &mut App) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(STATUS_LINE_HEIGHT),
        ])
        .split(f.area());

    let (list, state) = app.list_view();
    draw_file_list(f, layout[0], list, state);
    draw_status_line(f, layout[1], app.status());
}
