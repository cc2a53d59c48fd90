//! Normal mode: selection, traversal and prompt openers.

use super::InputEvent;
use crate::App;

pub fn handle_normal_event(app: &mut App, event: InputEvent) {
    match event {
        InputEvent::SelectNext => app.select_next(),
        InputEvent::SelectPrevious => app.select_previous(),
        InputEvent::EnterDirectory => app.enter_directory(),
        InputEvent::LeaveDirectory => app.leave_directory(),
        InputEvent::StartDownload => app.start_download(),
        InputEvent::StartFind => app.start_find(),
        InputEvent::NextMatch => app.next_match(),
        InputEvent::PreviousMatch => app.previous_match(),
        // prompt editing keys have no meaning here
        InputEvent::Insert(_)
        | InputEvent::DeleteBackward
        | InputEvent::Confirm
        | InputEvent::Cancel
        | InputEvent::Quit => {}
    }
}
