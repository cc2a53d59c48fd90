//! Command mode: editing the open prompt.

use super::InputEvent;
use crate::App;

pub fn handle_command_event(app: &mut App, event: InputEvent) {
    match event {
        InputEvent::Insert(c) => app.command_insert(c),
        InputEvent::DeleteBackward => app.command_backspace(),
        InputEvent::Confirm => app.confirm_command(),
        InputEvent::Cancel => app.cancel_command(),
        InputEvent::SelectNext
        | InputEvent::SelectPrevious
        | InputEvent::EnterDirectory
        | InputEvent::LeaveDirectory
        | InputEvent::StartDownload
        | InputEvent::StartFind
        | InputEvent::NextMatch
        | InputEvent::PreviousMatch
        | InputEvent::Quit => {}
    }
}
