//! Screen definitions for the mdchat TUI.

pub mod chat;

use crate::app::App;
use crate::ui::{centered_fixed, Theme};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::Span,
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};

/// Trait for screens that can be rendered.
pub trait Screen {
    /// Render the screen to the buffer.
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

/// Render the help overlay.
pub fn render_help_overlay(area: Rect, buf: &mut Buffer, theme: &Theme) {
    let help_text = r"
  Anywhere
    Tab               Switch input / history
    PgUp / PgDn       Scroll conversation
    Ctrl+N            New chat
    Ctrl+Y            Copy last reply
    Ctrl+C            Quit

  Message input
    Enter             Send
    Alt+Enter         New line
    Up / Down         Previous messages

  History
    j/k or Up/Down    Move
    Enter             Open chat
    d / Delete        Delete chat
    n                 New chat
    q                 Quit

  [Press any key to close]
";

    let width = 50.min(area.width.saturating_sub(4));
    let height = 24.min(area.height);
    let overlay_area = centered_fixed(width, height, area);

    Clear.render(overlay_area, buf);

    let block = Block::default()
        .title(Span::styled(" Help ", theme.title()))
        .borders(Borders::ALL)
        .border_style(theme.border(true))
        .style(theme.normal());

    Paragraph::new(help_text)
        .block(block)
        .style(theme.normal())
        .render(overlay_area, buf);
}
