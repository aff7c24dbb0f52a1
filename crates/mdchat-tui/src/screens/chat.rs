//! The chat screen: history sidebar, transcript, draft input and status bar.

use mdchat_engine::HistoryEntry;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::Span,
    widgets::{Block, Borders, Widget},
};

use super::Screen;
use crate::app::{App, Focus};
use crate::ui::{chat_layout, HistorySidebar, KeyHint, StatusBar, TextInput, TranscriptView};

/// Placeholder shown in the empty draft input.
pub const INPUT_PLACEHOLDER: &str = "Type a message with Markdown...";

const INPUT_HINTS: &[KeyHint] = &[
    KeyHint::new("Enter", "Send"),
    KeyHint::new("Tab", "History"),
    KeyHint::new("^N", "New"),
    KeyHint::new("^Y", "Copy"),
    KeyHint::new("^C", "Quit"),
];

const SIDEBAR_HINTS: &[KeyHint] = &[
    KeyHint::new("Enter", "Open"),
    KeyHint::new("d", "Delete"),
    KeyHint::new("n", "New"),
    KeyHint::new("Tab", "Input"),
    KeyHint::new("?", "Help"),
];

pub struct ChatScreen;

impl Screen for ChatScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        let theme = &app.theme;
        let input_lines = u16::try_from(app.input.line_count()).unwrap_or(u16::MAX);
        let layout = chat_layout(area, input_lines);

        HistorySidebar::new(&app.view.histories, theme)
            .selected(app.view.selected.as_ref())
            .cursor(app.sidebar_cursor)
            .focused(app.focus == Focus::Sidebar)
            .render(layout.sidebar, buf);

        let title = app
            .view
            .selected
            .as_ref()
            .map_or_else(|| "New Chat".to_string(), HistoryEntry::display_name);
        let transcript = TranscriptView::new(&app.view.messages, theme)
            .title(title)
            .scroll_from_bottom(app.scroll_from_bottom);
        app.max_scroll.set(transcript.max_scroll(layout.transcript));
        transcript.render(layout.transcript, buf);

        let input_focused = app.focus == Focus::Input;
        let input_block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border(input_focused))
            .title(Span::styled(" Message ", theme.title()));
        TextInput::new(&app.input, theme)
            .block(input_block)
            .focused(input_focused)
            .placeholder(INPUT_PLACEHOLDER)
            .render(layout.input, buf);

        let (mode, hints) = match app.focus {
            Focus::Input => ("CHAT", INPUT_HINTS),
            Focus::Sidebar => ("HISTORY", SIDEBAR_HINTS),
        };
        StatusBar::new(mode, theme)
            .hints(hints)
            .right(app.notification.as_deref().or_else(|| app.activity()))
            .render(layout.status, buf);
    }
}
