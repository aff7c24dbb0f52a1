//! Event handling for the mdchat TUI.

use crossterm::event::{self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers, MouseEvent};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::app::Focus;

/// Events that can occur in the TUI.
#[derive(Debug, Clone)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// A mouse event occurred.
    Mouse(MouseEvent),
    /// A tick event for UI updates.
    Tick,
    /// Terminal was resized.
    Resize(u16, u16),
}

/// Event handler that polls the terminal on a background thread.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    _tx: mpsc::UnboundedSender<Event>,
}

impl EventHandler {
    /// Create a new event handler with the specified tick rate.
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let tx_clone = tx.clone();

        // crossterm polling is blocking I/O
        std::thread::spawn(move || {
            let tick_rate = Duration::from_millis(tick_rate_ms);
            loop {
                let event = if event::poll(tick_rate).unwrap_or(false) {
                    match event::read() {
                        Ok(CrosstermEvent::Key(key)) => Some(Event::Key(key)),
                        Ok(CrosstermEvent::Mouse(mouse)) => Some(Event::Mouse(mouse)),
                        Ok(CrosstermEvent::Resize(w, h)) => Some(Event::Resize(w, h)),
                        _ => None,
                    }
                } else {
                    Some(Event::Tick)
                };

                if let Some(e) = event {
                    if tx_clone.send(e).is_err() {
                        break;
                    }
                }
            }
        });

        Self { rx, _tx: tx }
    }

    /// Get the next event, waiting until one is available.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// Key action that can be performed in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Help,
    ToggleFocus,
    Back,
    NewChat,
    CopyReply,
    Up,
    Down,
    Select,
    Delete,
    ScrollUp,
    ScrollDown,
    None,
}

/// Convert a key event to an action.
///
/// Text editing keys in the input are handled before this is consulted, so
/// plain characters only map to actions while the sidebar has focus.
pub fn key_to_action(key: KeyEvent, focus: Focus) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Action::Quit,
            KeyCode::Char('n') => Action::NewChat,
            KeyCode::Char('y') => Action::CopyReply,
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Tab | KeyCode::BackTab => return Action::ToggleFocus,
        KeyCode::Esc => return Action::Back,
        KeyCode::PageUp => return Action::ScrollUp,
        KeyCode::PageDown => return Action::ScrollDown,
        _ => {}
    }

    if focus == Focus::Input {
        return Action::None;
    }

    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('?') => Action::Help,
        KeyCode::Char('n') => Action::NewChat,
        KeyCode::Char('d') | KeyCode::Delete => Action::Delete,
        KeyCode::Enter => Action::Select,
        KeyCode::Up | KeyCode::Char('k') => Action::Up,
        KeyCode::Down | KeyCode::Char('j') => Action::Down,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_global_keys() {
        for focus in [Focus::Input, Focus::Sidebar] {
            assert_eq!(key_to_action(ctrl('c'), focus), Action::Quit);
            assert_eq!(key_to_action(ctrl('n'), focus), Action::NewChat);
            assert_eq!(key_to_action(ctrl('y'), focus), Action::CopyReply);
            assert_eq!(key_to_action(key(KeyCode::Tab), focus), Action::ToggleFocus);
            assert_eq!(key_to_action(key(KeyCode::PageUp), focus), Action::ScrollUp);
        }
    }

    #[test]
    fn test_sidebar_keys() {
        let f = Focus::Sidebar;
        assert_eq!(key_to_action(key(KeyCode::Char('j')), f), Action::Down);
        assert_eq!(key_to_action(key(KeyCode::Up), f), Action::Up);
        assert_eq!(key_to_action(key(KeyCode::Enter), f), Action::Select);
        assert_eq!(key_to_action(key(KeyCode::Char('d')), f), Action::Delete);
        assert_eq!(key_to_action(key(KeyCode::Delete), f), Action::Delete);
        assert_eq!(key_to_action(key(KeyCode::Char('n')), f), Action::NewChat);
        assert_eq!(key_to_action(key(KeyCode::Char('q')), f), Action::Quit);
        assert_eq!(key_to_action(key(KeyCode::Char('?')), f), Action::Help);
    }

    #[test]
    fn test_plain_keys_are_inert_in_input() {
        let f = Focus::Input;
        assert_eq!(key_to_action(key(KeyCode::Char('q')), f), Action::None);
        assert_eq!(key_to_action(key(KeyCode::Char('d')), f), Action::None);
        assert_eq!(key_to_action(key(KeyCode::Enter), f), Action::None);
    }
}
