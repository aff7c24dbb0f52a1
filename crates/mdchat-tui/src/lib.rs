//! mdchat-tui: Terminal UI for mdchat
//!
//! This crate provides the interactive client:
//! - History sidebar, Markdown transcript and draft input
//! - Key handling and the event loop
//! - Terminal setup and restoration

mod app;
mod event;
mod screens;
#[cfg(test)]
mod test_utils;
mod text;
mod ui;

use screens::Screen as ScreenTrait;

pub use app::{App, Focus};
pub use event::{Action, Event, EventHandler};
pub use mdchat_engine;

use crossterm::{
    cursor::Show as ShowCursor,
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use mdchat_engine::{Config, ConversationController, HttpChatApi};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use std::sync::Arc;
use tracing::info;

/// Lines moved per mouse wheel step.
const MOUSE_SCROLL: usize = 3;

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen, ShowCursor);
    }
}

/// Run the TUI application.
///
/// Sets up the terminal, runs the event loop and restores the terminal on
/// exit, including on error.
pub async fn run_tui(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let api = HttpChatApi::from_config(config)?;
    info!(base_url = %api.base_url(), "Starting TUI");
    let controller = ConversationController::with_config(Arc::new(api), config);

    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(controller);
    app.start();

    // 4 Hz tick rate
    let mut events = EventHandler::new(250);

    let result = run_loop(&mut terminal, &mut app, &mut events).await;
    app.shutdown();

    terminal.show_cursor()?;
    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        app.sync();
        terminal.draw(|frame| {
            let area = frame.area();
            let buf = frame.buffer_mut();
            screens::chat::ChatScreen.render(app, area, buf);
            if app.show_help {
                screens::render_help_overlay(area, buf, &app.theme);
            }
        })?;

        if let Some(event) = events.next().await {
            match event {
                Event::Key(key) => handle_key(app, key),
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => app.scroll_up(MOUSE_SCROLL),
                    MouseEventKind::ScrollDown => app.scroll_down(MOUSE_SCROLL),
                    _ => {}
                },
                Event::Tick => app.tick(),
                // Next draw picks up the new size
                Event::Resize(_, _) => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Route a key press to the draft input or to an action.
fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if !app.show_help && app.focus == Focus::Input && handle_input_key(app, key) {
        return;
    }
    let action = event::key_to_action(key, app.focus);
    app.handle_action(action);
}

/// Handle a key in the draft input.
/// Returns true if the key was consumed.
fn handle_input_key(app: &mut App, key: KeyEvent) -> bool {
    // Alt+Enter or Shift+Enter inserts a newline
    if key.code == KeyCode::Enter && key.modifiers.intersects(KeyModifiers::ALT | KeyModifiers::SHIFT) {
        app.input.insert('\n');
        app.draft_changed();
        return true;
    }

    // Ctrl shortcuts are actions
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return false;
    }

    match key.code {
        KeyCode::Enter => app.send_draft(),
        KeyCode::Char(c) => {
            app.input.insert(c);
            app.draft_changed();
        }
        KeyCode::Backspace => {
            app.input.backspace();
            app.draft_changed();
        }
        KeyCode::Delete => {
            app.input.delete();
            app.draft_changed();
        }
        KeyCode::Left => app.input.move_left(),
        KeyCode::Right => app.input.move_right(),
        KeyCode::Home => app.input.move_home(),
        KeyCode::End => app.input.move_end(),
        KeyCode::Up => {
            app.input.history_prev();
            app.draft_changed();
        }
        KeyCode::Down => {
            app.input.history_next();
            app.draft_changed();
        }
        _ => return false,
    }
    true
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_app, render_app_to_string};
    use mdchat_engine::testing::ScriptedApi;
    use mdchat_engine::ChatMessage;

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_tui_version() {
        let version = tui_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }

    #[tokio::test]
    async fn test_type_and_send() {
        let api = Arc::new(ScriptedApi::new().with_reply("**Hello** back"));
        let mut app = create_test_app(&api);

        type_text(&mut app, "hi there");
        press(&mut app, KeyCode::Enter);
        app.settle().await;

        assert_eq!(
            app.view.messages,
            vec![
                ChatMessage::user("hi there"),
                ChatMessage::assistant("**Hello** back")
            ]
        );
        let out = render_app_to_string(&app);
        assert!(out.contains("hi there"));
        assert!(out.contains("Hello back"));
        assert!(!out.contains("**"));
    }

    #[tokio::test]
    async fn test_recall_previous_message() {
        let api = Arc::new(ScriptedApi::new());
        let mut app = create_test_app(&api);

        type_text(&mut app, "again");
        press(&mut app, KeyCode::Enter);
        app.settle().await;
        press(&mut app, KeyCode::Up);

        assert_eq!(app.input.content(), "again");
    }

    #[test]
    fn test_plain_keys_type_in_input() {
        let api = Arc::new(ScriptedApi::new());
        let mut app = create_test_app(&api);

        type_text(&mut app, "q?d");
        assert_eq!(app.input.content(), "q?d");
        assert!(!app.should_quit);
        assert!(!app.show_help);
    }

    #[test]
    fn test_alt_enter_inserts_newline() {
        let api = Arc::new(ScriptedApi::new());
        let mut app = create_test_app(&api);

        type_text(&mut app, "a");
        handle_key(&mut app, KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT));
        type_text(&mut app, "b");

        assert_eq!(app.input.content(), "a\nb");
        assert!(app.view.messages.is_empty());
    }

    #[test]
    fn test_sidebar_keys_after_tab() {
        let api = Arc::new(ScriptedApi::new());
        let mut app = create_test_app(&api);

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.focus, Focus::Sidebar);

        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('x'));
        assert!(!app.show_help);

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_from_input() {
        let api = Arc::new(ScriptedApi::new());
        let mut app = create_test_app(&api);

        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
        assert!(app.input.is_empty());
    }
}
