//! Layout helpers for the mdchat TUI.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Fixed sidebar width in columns.
pub const SIDEBAR_WIDTH: u16 = 30;

/// Visible input lines, excluding borders.
pub const MIN_INPUT_LINES: u16 = 1;
pub const MAX_INPUT_LINES: u16 = 6;

/// Areas of the chat screen.
#[derive(Debug, Clone, Copy)]
pub struct ChatLayout {
    pub sidebar: Rect,
    pub transcript: Rect,
    pub input: Rect,
    pub status: Rect,
}

/// Create a centered rect with fixed dimensions.
pub fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Create the main layout with status bar at bottom.
pub fn main_layout(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);
    (chunks[0], chunks[1])
}

/// Split the screen into sidebar, transcript, input and status bar.
///
/// The input grows with the draft between [`MIN_INPUT_LINES`] and
/// [`MAX_INPUT_LINES`].
pub fn chat_layout(area: Rect, input_lines: u16) -> ChatLayout {
    let (body, status) = main_layout(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(20)])
        .split(body);

    let input_height = input_lines.clamp(MIN_INPUT_LINES, MAX_INPUT_LINES) + 2;
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(input_height)])
        .split(columns[1]);

    ChatLayout {
        sidebar: columns[0],
        transcript: rows[0],
        input: rows[1],
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_layout_80x24() {
        let layout = chat_layout(Rect::new(0, 0, 80, 24), 1);
        assert_eq!(layout.sidebar, Rect::new(0, 0, 30, 23));
        assert_eq!(layout.transcript, Rect::new(30, 0, 50, 20));
        assert_eq!(layout.input, Rect::new(30, 20, 50, 3));
        assert_eq!(layout.status, Rect::new(0, 23, 80, 1));
    }

    #[test]
    fn test_input_height_is_clamped() {
        let area = Rect::new(0, 0, 80, 40);
        assert_eq!(chat_layout(area, 0).input.height, 3);
        assert_eq!(chat_layout(area, 50).input.height, MAX_INPUT_LINES + 2);
    }

    #[test]
    fn test_centered_fixed() {
        let rect = centered_fixed(20, 10, Rect::new(0, 0, 80, 24));
        assert_eq!(rect, Rect::new(30, 7, 20, 10));
    }
}
