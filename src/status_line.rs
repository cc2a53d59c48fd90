/// How key events are interpreted
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    /// A prompt is open and keys edit its input
    Command,
    /// An action is outstanding; only quit is honored
    Waiting,
}

/// The one-line feedback / prompt area at the bottom of the screen
#[derive(Clone, Debug, Default)]
pub struct StatusLine {
    mode: InputMode,
    static_prefix: String,
    text: String,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn prefix(&self) -> &str {
        &self.static_prefix
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn full_text(&self) -> String {
        format!("{}{}", self.static_prefix, self.text)
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Switch to Command mode showing `prompt` followed by `input`
    pub fn show_command(&mut self, prompt: &str, input: &str) {
        self.mode = InputMode::Command;
        self.static_prefix = prompt.to_string();
        self.text = input.to_string();
    }

    pub fn enter_waiting(&mut self, text: impl Into<String>) {
        self.mode = InputMode::Waiting;
        self.static_prefix.clear();
        self.text = text.into();
    }

    pub fn exit_to_normal(&mut self, text: impl Into<String>) {
        self.mode = InputMode::Normal;
        self.static_prefix.clear();
        self.text = text.into();
    }
}
