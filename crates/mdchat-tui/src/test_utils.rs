//! Test utilities for rendering the TUI into strings.

use std::sync::Arc;

use mdchat_engine::testing::ScriptedApi;
use mdchat_engine::ConversationController;
use ratatui::{buffer::Buffer, layout::Rect};

use crate::app::App;
use crate::screens::chat::ChatScreen;
use crate::screens::{render_help_overlay, Screen};

/// Default terminal width for tests.
pub const TEST_WIDTH: u16 = 80;

/// Default terminal height for tests.
pub const TEST_HEIGHT: u16 = 24;

/// Create an app backed by a scripted API.
pub fn create_test_app(api: &Arc<ScriptedApi>) -> App {
    App::new(ConversationController::new(api.clone()))
}

/// Convert a buffer to text, one row per line with trailing spaces trimmed.
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut result = String::new();

    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buffer.cell((x, y)) {
                result.push_str(cell.symbol());
            }
        }
        while result.ends_with(' ') {
            result.pop();
        }
        result.push('\n');
    }

    if result.ends_with('\n') {
        result.pop();
    }
    result
}

/// Render the whole app as the terminal would show it.
pub fn render_app_to_string(app: &App) -> String {
    let area = Rect::new(0, 0, TEST_WIDTH, TEST_HEIGHT);
    let mut buffer = Buffer::empty(area);
    ChatScreen.render(app, area, &mut buffer);
    if app.show_help {
        render_help_overlay(area, &mut buffer, &app.theme);
    }
    buffer_to_string(&buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, style::Style, Terminal};

    #[test]
    fn test_buffer_to_string() {
        let area = Rect::new(0, 0, 10, 3);
        let mut buffer = Buffer::empty(area);
        buffer.set_string(0, 0, "Hello", Style::default());
        buffer.set_string(0, 1, "World", Style::default());

        assert_eq!(buffer_to_string(&buffer), "Hello\nWorld\n");
    }

    #[test]
    fn test_terminal_draw_matches_direct_render() {
        let api = Arc::new(ScriptedApi::new());
        let app = create_test_app(&api);
        let mut terminal = Terminal::new(TestBackend::new(TEST_WIDTH, TEST_HEIGHT)).unwrap();

        terminal
            .draw(|frame| {
                let area = frame.area();
                ChatScreen.render(&app, area, frame.buffer_mut());
            })
            .unwrap();

        assert_eq!(
            buffer_to_string(terminal.backend().buffer()),
            render_app_to_string(&app)
        );
    }
}
