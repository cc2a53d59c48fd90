//! In-progress text prompts (find query, download destination).

pub const FIND_PROMPT: &str = "/";
pub const DOWNLOAD_PROMPT: &str = "Download to: ";

/// What confirming the prompt does
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandKind {
    Find,
    Download { remote_path: String },
}

/// A prompt label plus the input typed so far
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommandSession {
    kind: CommandKind,
    prompt: String,
    input: String,
}

impl CommandSession {
    pub fn find() -> Self {
        Self {
            kind: CommandKind::Find,
            prompt: FIND_PROMPT.to_string(),
            input: String::new(),
        }
    }

    /// Download prompt pre-filled with the default local destination
    pub fn download(remote_path: impl Into<String>, default_destination: impl Into<String>) -> Self {
        Self {
            kind: CommandKind::Download {
                remote_path: remote_path.into(),
            },
            prompt: DOWNLOAD_PROMPT.to_string(),
            input: default_destination.into(),
        }
    }

    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn full_text(&self) -> String {
        format!("{}{}", self.prompt, self.input)
    }

    pub fn push(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn push_str(&mut self, text: &str) {
        self.input.push_str(text);
    }

    /// Remove the last character (not byte). Returns false on empty input.
    pub fn delete_backward(&mut self) -> bool {
        self.input.pop().is_some()
    }
}
