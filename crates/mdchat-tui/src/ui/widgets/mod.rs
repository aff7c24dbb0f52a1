//! Reusable widgets for the mdchat TUI.

pub mod sidebar;
pub mod status_bar;
pub mod text_input;
pub mod transcript;

pub use sidebar::HistorySidebar;
pub use status_bar::{KeyHint, StatusBar};
pub use text_input::{TextInput, TextInputState};
pub use transcript::TranscriptView;
