//! Application state and update logic for the mdchat TUI.
//!
//! Backend operations run as tokio tasks against a shared
//! [`ConversationController`]; the app only keeps their handles and copies
//! the controller state into [`App::view`] before each draw.

use std::cell::Cell;
use std::future::Future;

use mdchat_engine::{ConversationController, ConversationView, Outgoing};
use tokio::task::JoinHandle;
use tracing::{error, warn};

use crate::event::Action;
use crate::ui::widgets::TextInputState;
use crate::ui::Theme;

/// Notification lifetime: ~3 seconds at a 250ms tick.
const NOTIFICATION_TICKS: usize = 12;

/// Lines moved per PageUp/PageDown.
pub const PAGE_SCROLL: usize = 10;

/// Which pane receives plain keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Input,
    Sidebar,
}

/// Kind of an in-flight backend operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Refresh,
    Load,
    Send,
    NewChat,
    Delete,
}

impl TaskKind {
    /// Status bar text while the task runs.
    pub fn activity(self) -> &'static str {
        match self {
            Self::Refresh => "Refreshing...",
            Self::Load => "Loading...",
            Self::Send => "Waiting for reply...",
            Self::NewChat => "Starting new chat...",
            Self::Delete => "Deleting...",
        }
    }
}

/// Application state.
#[derive(Debug)]
pub struct App {
    /// Whether the app should quit.
    pub should_quit: bool,

    /// Whether the help overlay is visible.
    pub show_help: bool,

    pub focus: Focus,

    /// Conversation state as of the last [`sync`](Self::sync).
    pub view: ConversationView,

    /// Draft being edited.
    pub input: TextInputState,

    /// Keyboard cursor in the history sidebar.
    pub sidebar_cursor: usize,

    /// Transcript lines scrolled up from the bottom; 0 follows new messages.
    pub scroll_from_bottom: usize,

    /// Largest transcript scroll offset at the last draw.
    pub max_scroll: Cell<usize>,

    /// Notification message (displayed temporarily, cleared after some ticks).
    pub notification: Option<String>,

    /// Ticks remaining until notification is cleared.
    notification_ttl: usize,

    pub theme: Theme,

    controller: ConversationController,

    tasks: Vec<(TaskKind, JoinHandle<()>)>,
}

impl App {
    pub fn new(controller: ConversationController) -> Self {
        Self {
            should_quit: false,
            show_help: false,
            focus: Focus::default(),
            view: controller.view(),
            input: TextInputState::new(),
            sidebar_cursor: 0,
            scroll_from_bottom: 0,
            max_scroll: Cell::new(0),
            notification: None,
            notification_ttl: 0,
            theme: Theme::default(),
            controller,
            tasks: Vec::new(),
        }
    }

    /// Load the history listing. Call once the runtime is up.
    pub fn start(&mut self) {
        self.refresh_histories();
    }

    /// Copy the controller state into [`view`](Self::view).
    pub fn sync(&mut self) {
        let view = self.controller.view();

        // A different thread was loaded or the thread was cleared
        if view.selected != self.view.selected || view.messages.len() < self.view.messages.len() {
            self.scroll_from_bottom = 0;
        }
        self.sidebar_cursor = self
            .sidebar_cursor
            .min(view.histories.len().saturating_sub(1));
        self.view = view;
    }

    /// Handle an action.
    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => {
                if self.show_help {
                    self.show_help = false;
                } else {
                    self.should_quit = true;
                }
                return;
            }
            Action::Help => {
                self.show_help = !self.show_help;
                return;
            }
            _ => {}
        }

        // If help is showing, any key closes it
        if self.show_help {
            self.show_help = false;
            return;
        }

        match action {
            Action::ToggleFocus => {
                self.focus = match self.focus {
                    Focus::Input => Focus::Sidebar,
                    Focus::Sidebar => Focus::Input,
                };
            }
            Action::Back => self.focus = Focus::Input,
            Action::NewChat => self.start_new_chat(),
            Action::CopyReply => self.copy_last_reply(),
            Action::Up => self.sidebar_cursor = self.sidebar_cursor.saturating_sub(1),
            Action::Down => {
                if self.sidebar_cursor + 1 < self.view.histories.len() {
                    self.sidebar_cursor += 1;
                }
            }
            Action::Select => self.load_at_cursor(),
            Action::Delete => self.delete_at_cursor(),
            Action::ScrollUp => self.scroll_up(PAGE_SCROLL),
            Action::ScrollDown => self.scroll_down(PAGE_SCROLL),
            Action::Quit | Action::Help | Action::None => {}
        }
    }

    /// Push the edited draft to the controller.
    pub fn draft_changed(&mut self) {
        self.controller.set_draft(self.input.content());
    }

    /// Send the draft. Blank drafts are ignored.
    pub fn send_draft(&mut self) {
        self.draft_changed();
        let Some(outgoing) = self.controller.submit_draft() else {
            return;
        };
        self.input.submit();
        self.scroll_from_bottom = 0;
        self.spawn_delivery(outgoing);
        self.sync();
    }

    pub fn scroll_up(&mut self, lines: usize) {
        self.scroll_from_bottom = (self.scroll_from_bottom + lines).min(self.max_scroll.get());
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll_from_bottom = self.scroll_from_bottom.saturating_sub(lines);
    }

    /// Increment tick counter and update time-based state.
    pub fn tick(&mut self) {
        if self.notification_ttl > 0 {
            self.notification_ttl -= 1;
            if self.notification_ttl == 0 {
                self.notification = None;
            }
        }
        self.tasks.retain(|(_, handle)| !handle.is_finished());
    }

    /// Status text for the oldest running operation.
    pub fn activity(&self) -> Option<&'static str> {
        self.tasks
            .iter()
            .find(|(_, handle)| !handle.is_finished())
            .map(|(kind, _)| kind.activity())
    }

    /// Abort all running operations.
    pub fn shutdown(&mut self) {
        for (_, handle) in self.tasks.drain(..) {
            handle.abort();
        }
    }

    /// Set a temporary notification message.
    pub fn set_notification(&mut self, msg: impl Into<String>) {
        self.notification = Some(msg.into());
        self.notification_ttl = NOTIFICATION_TICKS;
    }

    /// Wait for every running operation, then sync.
    #[cfg(test)]
    pub async fn settle(&mut self) {
        for (_, handle) in std::mem::take(&mut self.tasks) {
            let _ = handle.await;
        }
        self.sync();
    }

    // === Backend operations ===

    fn spawn<F>(&mut self, kind: TaskKind, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.tasks.push((kind, tokio::spawn(task)));
    }

    fn refresh_histories(&mut self) {
        let controller = self.controller.clone();
        self.spawn(TaskKind::Refresh, async move {
            if let Err(e) = controller.refresh_histories().await {
                error!(error = %e, "Error fetching histories");
            }
        });
    }

    fn load_at_cursor(&mut self) {
        let Some(entry) = self.view.histories.get(self.sidebar_cursor).cloned() else {
            return;
        };
        let controller = self.controller.clone();
        self.spawn(TaskKind::Load, async move {
            let name = entry.to_string();
            if let Err(e) = controller.load_history(entry).await {
                error!(error = %e, history = %name, "Error loading history");
            }
        });
    }

    fn spawn_delivery(&mut self, outgoing: Outgoing) {
        let controller = self.controller.clone();
        self.spawn(TaskKind::Send, async move {
            match controller.deliver(outgoing).await {
                Ok(resync) => resync.settled().await,
                Err(e) => error!(error = %e, "Error sending message"),
            }
        });
    }

    fn start_new_chat(&mut self) {
        let controller = self.controller.clone();
        self.focus = Focus::Input;
        self.spawn(TaskKind::NewChat, async move {
            if let Some(resync) = controller.start_new_chat().await {
                resync.settled().await;
            }
        });
    }

    fn delete_at_cursor(&mut self) {
        let Some(entry) = self.view.histories.get(self.sidebar_cursor).cloned() else {
            return;
        };
        let controller = self.controller.clone();
        self.spawn(TaskKind::Delete, async move {
            let name = entry.to_string();
            match controller.delete_history(entry).await {
                Ok(resync) => resync.settled().await,
                Err(e) => error!(error = %e, history = %name, "Error deleting history"),
            }
        });
    }

    fn copy_last_reply(&mut self) {
        let reply = self
            .controller
            .read(|c| c.last_assistant_message().map(|m| m.text.clone()));
        let Some(text) = reply else {
            self.set_notification("No reply to copy");
            return;
        };

        match copy_to_clipboard(&text) {
            Ok(()) => self.set_notification("Copied last reply"),
            Err(e) => {
                warn!(error = %e, "Clipboard unavailable");
                self.set_notification("Clipboard unavailable");
            }
        }
    }
}

fn copy_to_clipboard(text: &str) -> Result<(), arboard::Error> {
    arboard::Clipboard::new()?.set_text(text.to_owned())
}
