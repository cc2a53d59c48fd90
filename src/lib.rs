mod command;
mod config;
mod error;
mod file_list;
mod key_event;
mod navigator;
mod search;
mod status_line;
mod ui;

mod app;
mod backend;
mod events;
mod transport;
mod utils;

pub mod filesystem;

// Re-export commonly used types
pub use app::App;
pub use backend::run_backend;
pub use config::{ConfigManager, Settings};
pub use error::{AppError, Result};
pub use events::{AppEvent, EventChannel, Request, RequestId, Response, Topic, spawn_input_reader};
pub use file_list::FileList;
pub use status_line::InputMode;
pub use transport::SshTransport;
pub use utils::{init_panic_hook, init_terminal, init_tracing, restore_tui};
