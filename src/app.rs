use std::mem;

use ratatui::Terminal;
use ratatui::prelude::Backend;
use ratatui::widgets::ListState;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::command::{CommandKind, CommandSession};
use crate::error::{AppError, Result};
use crate::events::{AppEvent, EventChannel, Response, Topic};
use crate::file_list::FileList;
use crate::filesystem::{Entry, path};
use crate::key_event::{self, KeyFlow};
use crate::navigator;
use crate::search::{self, SearchMatcher};
use crate::status_line::{InputMode, StatusLine};

/// Application context: the displayed listing, the status line, the open
/// prompt (if any) and the request side of the backend channel.
///
/// `status.mode() == InputMode::Command` exactly when `command` is `Some`.
pub struct App {
    file_list: FileList,
    status: StatusLine,
    command: Option<CommandSession>,
    matcher: Option<SearchMatcher>,
    current_path: String,
    download_dir: String,
    channel: EventChannel,
    list_state: ListState,
    needs_redraw: bool,
}

impl App {
    pub fn new(
        channel: EventChannel,
        start_path: &str,
        download_dir: impl Into<String>,
    ) -> Result<Self> {
        let current_path = path::normalize(start_path)?;
        let mut status = StatusLine::new();
        status.set_text(format!("Loading {current_path}…"));

        Ok(Self {
            file_list: FileList::new(),
            status,
            command: None,
            matcher: None,
            current_path,
            download_dir: download_dir.into(),
            channel,
            list_state: ListState::default(),
            needs_redraw: true,
        })
    }

    /// Request the initial listing.
    pub fn start(&mut self) {
        let topic = Topic::EnterDirectory {
            target: self.current_path.clone(),
        };
        if let Err(e) = self.channel.publish(topic) {
            self.report(e);
        }
    }

    pub fn file_list(&self) -> &FileList {
        &self.file_list
    }

    pub fn status(&self) -> &StatusLine {
        &self.status
    }

    pub fn mode(&self) -> InputMode {
        self.status.mode()
    }

    pub fn command(&self) -> Option<&CommandSession> {
        self.command.as_ref()
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn channel(&self) -> &EventChannel {
        &self.channel
    }

    /// Listing plus the scroll state the list widget keeps between frames.
    pub(crate) fn list_view(&mut self) -> (&FileList, &mut ListState) {
        (&self.file_list, &mut self.list_state)
    }

    pub fn mark_redraw(&mut self) {
        self.needs_redraw = true;
    }

    fn should_redraw(&mut self) -> bool {
        mem::take(&mut self.needs_redraw)
    }

    fn report(&mut self, error: AppError) {
        warn!("{}", error);
        self.status.set_text(error.to_string());
        self.mark_redraw();
    }

    fn show_selected_name(&mut self) {
        let text = match self.file_list.selected_entry() {
            Ok(entry) => entry.name.clone(),
            Err(_) => format!("{} is empty", self.current_path),
        };
        self.status.set_text(text);
    }

    pub fn select_next(&mut self) {
        self.file_list.select_next();
        self.show_selected_name();
    }

    pub fn select_previous(&mut self) {
        self.file_list.select_previous();
        self.show_selected_name();
    }

    pub fn enter_directory(&mut self) {
        let result = self
            .file_list
            .selected_entry()
            .and_then(|entry| navigator::enter(&mut self.channel, &self.current_path, entry));
        match result {
            Ok(id) => debug!("Enter request {:?} published", id),
            Err(e) => self.report(e),
        }
    }

    pub fn leave_directory(&mut self) {
        if let Err(e) = navigator::leave(&mut self.channel, &self.current_path) {
            self.report(e);
        }
    }

    /// Prompts are refused while a listing is still loading.
    fn ensure_idle(&mut self) -> bool {
        let Some(pending) = self.channel.in_flight().map(|p| p.topic.describe()) else {
            return true;
        };
        self.report(AppError::RequestInFlight(format!("still {pending}")));
        false
    }

    fn open_command(&mut self, session: CommandSession) {
        self.status.show_command(session.prompt(), session.input());
        self.command = Some(session);
        self.mark_redraw();
    }

    pub fn start_find(&mut self) {
        if self.command.is_some() || !self.ensure_idle() {
            return;
        }
        self.matcher = Some(SearchMatcher::start(&mut self.file_list));
        self.open_command(CommandSession::find());
    }

    pub fn start_download(&mut self) {
        if self.command.is_some() || !self.ensure_idle() {
            return;
        }
        let entry = match self.file_list.selected_entry() {
            Ok(entry) => entry.clone(),
            Err(e) => return self.report(e),
        };
        if entry.is_dir {
            return self.report(AppError::InvalidSelection(format!(
                "{} is a directory",
                entry.display_name()
            )));
        }
        let destination = match path::join(&self.download_dir, &entry.name) {
            Ok(destination) => destination,
            Err(e) => return self.report(e),
        };
        self.open_command(CommandSession::download(entry.full_path, destination));
    }

    pub fn next_match(&mut self) {
        self.jump_to_match(search::next_match);
    }

    pub fn previous_match(&mut self) {
        self.jump_to_match(search::previous_match);
    }

    fn jump_to_match(&mut self, pick: fn(&[usize], usize) -> Option<usize>) {
        let Some(selected) = self.file_list.selected_index() else {
            return self.status.set_text("No matches");
        };
        match pick(&self.file_list.marked_indices(), selected) {
            Some(index) => {
                self.file_list.select(index);
                self.show_selected_name();
            }
            None => self.status.set_text("No matches"),
        }
    }

    pub fn command_insert(&mut self, c: char) {
        if let Some(session) = self.command.as_mut() {
            session.push(c);
            self.command_input_changed();
        }
    }

    pub fn command_insert_str(&mut self, text: &str) {
        if let Some(session) = self.command.as_mut() {
            session.push_str(text);
            self.command_input_changed();
        }
    }

    pub fn command_backspace(&mut self) {
        if let Some(session) = self.command.as_mut() {
            session.delete_backward();
            self.command_input_changed();
        }
    }

    fn command_input_changed(&mut self) {
        let Some(session) = self.command.as_ref() else {
            return;
        };
        self.status.show_command(session.prompt(), session.input());
        if let (CommandKind::Find, Some(matcher)) = (session.kind(), self.matcher.as_ref()) {
            matcher.update_query(&mut self.file_list, session.input());
        }
        self.mark_redraw();
    }

    pub fn confirm_command(&mut self) {
        let Some(session) = self.command.take() else {
            return;
        };
        match session.kind() {
            CommandKind::Find => {
                let text = match self.matcher.take() {
                    Some(matcher) => matcher.finish(&self.file_list),
                    None => "Found 0 match(es).".to_string(),
                };
                self.status.exit_to_normal(text);
            }
            CommandKind::Download { remote_path } => {
                self.finish_download(remote_path.clone(), session.input());
            }
        }
        self.mark_redraw();
    }

    fn finish_download(&mut self, remote_path: String, input: &str) {
        let local_path = match path::resolve_local(input, &self.download_dir) {
            Ok(local_path) => local_path,
            Err(e) => {
                warn!("{}", e);
                return self.status.exit_to_normal(e.to_string());
            }
        };
        let topic = Topic::DownloadFile {
            remote_path: remote_path.clone(),
            local_path,
        };
        match self.channel.publish(topic) {
            Ok(_) => self.status.enter_waiting(format!("Downloading {remote_path}…")),
            Err(e) => {
                warn!("{}", e);
                self.status.exit_to_normal(e.to_string());
            }
        }
    }

    pub fn cancel_command(&mut self) {
        if self.command.take().is_none() {
            return;
        }
        if self.matcher.take().is_some() {
            self.file_list.clear_marks();
        }
        self.status.exit_to_normal("");
        self.show_selected_name();
        self.mark_redraw();
    }

    pub fn reject_busy(&mut self) {
        let text = match self.channel.in_flight().map(|request| &request.topic) {
            Some(Topic::DownloadFile { remote_path, .. }) => {
                format!("Busy downloading {remote_path} (q to quit)")
            }
            _ => "Busy (q to quit)".to_string(),
        };
        self.status.set_text(text);
        self.mark_redraw();
    }

    pub fn handle_response(&mut self, response: Response) {
        if self.channel.resolve(response.id()).is_none() {
            return;
        }
        match response {
            Response::DirectoryRead { path, result, .. } => match result {
                Ok(entries) => self.install_listing(path, entries),
                Err(e) => {
                    warn!("Directory read for {} failed: {}", path, e);
                    self.status.set_text(e.to_string());
                }
            },
            Response::DownloadComplete {
                remote_path,
                local_path,
                result,
                ..
            } => {
                let text = match result {
                    Ok(bytes) => {
                        info!("Downloaded {} to {} ({} bytes)", remote_path, local_path, bytes);
                        format!("Downloaded {remote_path} to {local_path}")
                    }
                    Err(e) => {
                        warn!("Download of {} failed: {}", remote_path, e);
                        e.to_string()
                    }
                };
                self.status.exit_to_normal(text);
            }
        }
        self.mark_redraw();
    }

    fn install_listing(&mut self, dir: String, entries: Vec<Entry>) {
        info!("Showing {} ({} entries)", dir, entries.len());
        let rows = navigator::listing_rows(&dir, entries);
        self.file_list.replace(dir.clone(), rows);
        self.current_path = dir;
        self.list_state = ListState::default();
        self.show_selected_name();
    }

    /// The backend worker stopped; nothing more can be requested.
    pub fn handle_disconnect(&mut self) {
        info!("Backend disconnected");
        self.channel.abandon();
        self.command = None;
        if self.matcher.take().is_some() {
            self.file_list.clear_marks();
        }
        self.status.exit_to_normal("Connection closed (q to quit)");
        self.mark_redraw();
    }

    pub async fn run<B: Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        rx: &mut mpsc::Receiver<AppEvent>,
    ) -> Result<()> {
        loop {
            if self.should_redraw() {
                terminal.draw(|f| crate::ui::draw(f, self))?;
            }

            let ev = match rx.recv().await {
                Some(e) => e,
                None => {
                    warn!("App event channel closed");
                    break;
                }
            };

            match ev {
                AppEvent::Input(ev) => {
                    use crossterm::event::Event;

                    match ev {
                        Event::Key(key) => {
                            if let KeyFlow::Quit = key_event::handle_key_event(self, key) {
                                info!("Quit requested");
                                return Ok(());
                            }
                        }
                        Event::Paste(data) => key_event::handle_paste_event(self, &data),
                        Event::Resize(_, _) => self.mark_redraw(),
                        _ => {}
                    }
                }
                AppEvent::Backend(response) => self.handle_response(response),
                AppEvent::Disconnect => self.handle_disconnect(),
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{Request, RequestId};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn test_app() -> (App, mpsc::Receiver<Request>) {
        let (tx, rx) = mpsc::channel(8);
        let app = App::new(EventChannel::new(tx), "/x", "/home/user").unwrap();
        (app, rx)
    }

    fn file(dir: &str, name: &str) -> Entry {
        Entry::new(name, false, format!("{dir}/{name}"))
    }

    fn dir(parent: &str, name: &str) -> Entry {
        Entry::new(name, true, format!("{parent}/{name}"))
    }

    fn answer(app: &mut App, rx: &mut mpsc::Receiver<Request>, entries: Vec<Entry>) {
        let request = rx.try_recv().unwrap();
        let path = match request.topic {
            Topic::EnterDirectory { target } | Topic::LeaveDirectory { target, .. } => target,
            other => panic!("unexpected request: {other:?}"),
        };
        app.handle_response(Response::DirectoryRead {
            id: request.id,
            path,
            result: Ok(entries),
        });
    }

    fn press(app: &mut App, code: KeyCode) -> KeyFlow {
        key_event::handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn loaded_app(entries: Vec<Entry>) -> (App, mpsc::Receiver<Request>) {
        let (mut app, mut rx) = test_app();
        app.start();
        answer(&mut app, &mut rx, entries);
        (app, rx)
    }

    #[test]
    fn test_initial_listing_has_parent_row() {
        let (app, _rx) = loaded_app(vec![file("/x", "foo"), dir("/x", "bar")]);

        let names: Vec<&str> = app
            .file_list()
            .entries()
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, vec!["..", "foo", "bar"]);
        assert_eq!(app.current_path(), "/x");
        assert_eq!(app.status().text(), "..");
    }

    #[test]
    fn test_enter_empty_directory_shows_only_parent() {
        let (mut app, mut rx) = loaded_app(vec![file("/x", "foo"), dir("/x", "bar")]);
        app.select_next();
        app.select_next();
        assert_eq!(app.file_list().selected_entry().unwrap().name, "bar");

        app.enter_directory();
        let request = rx.try_recv().unwrap();
        assert_eq!(
            request.topic,
            Topic::EnterDirectory {
                target: "/x/bar".to_string()
            }
        );
        app.handle_response(Response::DirectoryRead {
            id: request.id,
            path: "/x/bar".to_string(),
            result: Ok(Vec::new()),
        });

        assert_eq!(app.current_path(), "/x/bar");
        assert_eq!(app.file_list().len(), 1);
        let selected = app.file_list().selected_entry().unwrap();
        assert!(selected.is_parent_link());
        assert_eq!(selected.full_path, "/x");
    }

    #[test]
    fn test_enter_plain_file_leaves_state_untouched() {
        let (mut app, mut rx) = loaded_app(vec![file("/x", "foo")]);
        app.select_next();

        app.enter_directory();
        assert!(rx.try_recv().is_err());
        assert_eq!(app.file_list().selected_index(), Some(1));
        assert_eq!(app.current_path(), "/x");
        assert!(app.status().text().contains("not a directory"));
        assert_eq!(app.mode(), InputMode::Normal);
    }

    #[test]
    fn test_failed_read_keeps_previous_listing() {
        let (mut app, mut rx) = loaded_app(vec![dir("/x", "locked")]);
        app.select_next();
        app.enter_directory();
        let request = rx.try_recv().unwrap();

        app.handle_response(Response::DirectoryRead {
            id: request.id,
            path: "/x/locked".to_string(),
            result: Err(AppError::TransportFailure("permission denied".to_string())),
        });

        assert_eq!(app.current_path(), "/x");
        assert_eq!(app.file_list().len(), 2);
        assert_eq!(app.file_list().selected_index(), Some(1));
        assert!(app.status().text().contains("permission denied"));
        assert_eq!(app.mode(), InputMode::Normal);
        assert!(app.channel().in_flight().is_none());
    }

    #[test]
    fn test_navigation_refused_while_read_in_flight() {
        let (mut app, mut rx) = loaded_app(vec![dir("/x", "a")]);
        app.leave_directory();
        app.select_next();
        app.enter_directory();

        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err());
        assert!(app.status().text().starts_with("Busy"));
    }

    #[test]
    fn test_download_prompt_edit_and_confirm() {
        let (mut app, mut rx) = loaded_app(vec![file("/x", "report.csv")]);
        app.select_next();

        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.mode(), InputMode::Command);
        assert_eq!(app.status().full_text(), "Download to: /home/user/report.csv");

        for _ in 0..3 {
            press(&mut app, KeyCode::Backspace);
        }
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.command().unwrap().input(), "/home/user/report.x");
        assert_eq!(app.status().full_text(), "Download to: /home/user/report.x");

        press(&mut app, KeyCode::Enter);
        let request = rx.try_recv().unwrap();
        assert_eq!(
            request.topic,
            Topic::DownloadFile {
                remote_path: "/x/report.csv".to_string(),
                local_path: "/home/user/report.x".to_string(),
            }
        );
        assert_eq!(app.mode(), InputMode::Waiting);
        assert!(app.command().is_none());

        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.file_list().selected_index(), Some(1));
        assert!(app.status().text().starts_with("Busy downloading"));

        app.handle_response(Response::DownloadComplete {
            id: request.id,
            remote_path: "/x/report.csv".to_string(),
            local_path: "/home/user/report.x".to_string(),
            result: Ok(42),
        });
        assert_eq!(app.mode(), InputMode::Normal);
        assert_eq!(
            app.status().text(),
            "Downloaded /x/report.csv to /home/user/report.x"
        );
    }

    #[test]
    fn test_download_destination_keeps_typed_whitespace() {
        let (mut app, mut rx) = loaded_app(vec![file("/x", "report.csv")]);
        app.select_next();
        press(&mut app, KeyCode::Char('y'));
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Enter);

        let request = rx.try_recv().unwrap();
        assert_eq!(
            request.topic,
            Topic::DownloadFile {
                remote_path: "/x/report.csv".to_string(),
                local_path: "/home/user/report.csv ".to_string(),
            }
        );
    }

    #[test]
    fn test_failed_download_returns_to_normal() {
        let (mut app, mut rx) = loaded_app(vec![file("/x", "report.csv")]);
        app.select_next();
        press(&mut app, KeyCode::Char('y'));
        press(&mut app, KeyCode::Enter);
        let request = rx.try_recv().unwrap();
        assert_eq!(app.mode(), InputMode::Waiting);

        app.handle_response(Response::DownloadComplete {
            id: request.id,
            remote_path: "/x/report.csv".to_string(),
            local_path: "/home/user/report.csv".to_string(),
            result: Err(AppError::TransportFailure("boom".to_string())),
        });

        assert_eq!(app.mode(), InputMode::Normal);
        assert!(app.channel().in_flight().is_none());
        assert_eq!(app.status().text(), "Transport failure: boom");
        assert_eq!(app.file_list().selected_index(), Some(1));
    }

    #[test]
    fn test_download_success_names_written_file() {
        let (mut app, mut rx) = loaded_app(vec![file("/x", "report.csv")]);
        app.select_next();
        press(&mut app, KeyCode::Char('y'));
        for _ in 0.."report.csv".len() {
            press(&mut app, KeyCode::Backspace);
        }
        press(&mut app, KeyCode::Enter);
        let request = rx.try_recv().unwrap();
        assert!(matches!(
            &request.topic,
            Topic::DownloadFile { local_path, .. } if local_path == "/home/user/"
        ));

        app.handle_response(Response::DownloadComplete {
            id: request.id,
            remote_path: "/x/report.csv".to_string(),
            local_path: "/home/user/report.csv".to_string(),
            result: Ok(4),
        });
        assert_eq!(
            app.status().text(),
            "Downloaded /x/report.csv to /home/user/report.csv"
        );
    }

    #[test]
    fn test_paste_only_edits_open_prompt() {
        let (mut app, _rx) = loaded_app(vec![file("/x", "a b"), file("/x", "c")]);

        key_event::handle_paste_event(&mut app, "a b");
        assert!(app.command().is_none());
        assert!(app.file_list().marked_indices().is_empty());

        press(&mut app, KeyCode::Char('/'));
        key_event::handle_paste_event(&mut app, "a\r\n b\n");
        assert_eq!(app.command().unwrap().input(), "a b");
        assert_eq!(app.status().full_text(), "/a b");
        assert_eq!(app.file_list().marked_indices(), vec![1]);
    }

    #[test]
    fn test_download_of_directory_is_refused() {
        let (mut app, _rx) = loaded_app(vec![dir("/x", "bar")]);
        app.select_next();
        app.start_download();

        assert_eq!(app.mode(), InputMode::Normal);
        assert!(app.command().is_none());
        assert!(app.status().text().contains("is a directory"));
    }

    #[test]
    fn test_quit_mid_command_discards_input() {
        let (mut app, mut rx) = loaded_app(vec![file("/x", "report.csv")]);
        app.select_next();
        press(&mut app, KeyCode::Char('y'));
        press(&mut app, KeyCode::Char('q'));
        assert!(app.command().unwrap().input().ends_with("report.csvq"));

        let flow = key_event::handle_key_event(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(matches!(flow, KeyFlow::Quit));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_cancel_closes_prompt_without_request() {
        let (mut app, mut rx) = loaded_app(vec![file("/x", "report.csv")]);
        app.select_next();
        press(&mut app, KeyCode::Char('y'));
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.mode(), InputMode::Normal);
        assert!(app.command().is_none());
        assert_eq!(app.status().full_text(), "report.csv");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_find_highlights_and_jumps() {
        let (mut app, _rx) = loaded_app(vec![
            file("/x", "a"),
            file("/x", "Bb"),
            file("/x", "c"),
            file("/x", "Bd"),
        ]);

        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.status().full_text(), "/");
        press(&mut app, KeyCode::Char('B'));
        assert_eq!(app.file_list().marked_indices(), vec![2, 4]);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.status().text(), "Found 2 match(es).");
        assert_eq!(app.mode(), InputMode::Normal);

        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.file_list().selected_index(), Some(2));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.file_list().selected_index(), Some(4));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.file_list().selected_index(), Some(2));
        press(&mut app, KeyCode::Char('N'));
        assert_eq!(app.file_list().selected_index(), Some(4));
    }

    #[test]
    fn test_find_space_and_multibyte_backspace() {
        let (mut app, _rx) = loaded_app(vec![file("/x", "my résumé"), file("/x", "other")]);

        press(&mut app, KeyCode::Char('/'));
        for c in "y ré".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert_eq!(app.file_list().marked_indices(), vec![1]);
        press(&mut app, KeyCode::Backspace);
        assert_eq!(app.command().unwrap().input(), "y r");
        assert_eq!(app.file_list().marked_indices(), vec![1]);
    }

    #[test]
    fn test_next_match_without_matches_reports() {
        let (mut app, _rx) = loaded_app(vec![file("/x", "a")]);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.status().text(), "No matches");
        assert_eq!(app.file_list().selected_index(), Some(0));
    }

    #[test]
    fn test_directory_change_clears_highlights() {
        let (mut app, mut rx) = loaded_app(vec![dir("/x", "sub"), file("/x", "subtitle")]);
        app.start_find();
        app.command_insert_str("sub");
        app.confirm_command();
        assert_eq!(app.file_list().marked_indices(), vec![1, 2]);

        app.leave_directory();
        answer(&mut app, &mut rx, vec![dir("", "x")]);
        assert_eq!(app.current_path(), "/");
        assert!(app.file_list().marked_indices().is_empty());
        assert_eq!(app.file_list().entries()[0].name, "x");
    }

    #[test]
    fn test_stale_response_is_ignored() {
        let (mut app, _rx) = loaded_app(vec![file("/x", "a")]);
        app.handle_response(Response::DirectoryRead {
            id: RequestId(999),
            path: "/elsewhere".to_string(),
            result: Ok(Vec::new()),
        });
        assert_eq!(app.current_path(), "/x");
        assert_eq!(app.file_list().len(), 2);
    }

    #[test]
    fn test_disconnect_returns_to_normal() {
        let (mut app, _rx) = loaded_app(vec![file("/x", "a")]);
        app.start_find();
        app.handle_disconnect();

        assert_eq!(app.mode(), InputMode::Normal);
        assert!(app.command().is_none());
        assert!(app.status().text().starts_with("Connection closed"));
    }
}
