//! History sidebar: saved chats with the selected one highlighted.

use mdchat_engine::HistoryEntry;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::text::truncate_to_width;
use crate::ui::Theme;

/// Lines above the entry list.
const HEADER_LINES: u16 = 2;

pub struct HistorySidebar<'a> {
    entries: &'a [HistoryEntry],
    selected: Option<&'a HistoryEntry>,
    cursor: usize,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> HistorySidebar<'a> {
    pub fn new(entries: &'a [HistoryEntry], theme: &'a Theme) -> Self {
        Self {
            entries,
            selected: None,
            cursor: 0,
            focused: false,
            theme,
        }
    }

    /// The history whose conversation is shown.
    #[must_use]
    pub fn selected(mut self, selected: Option<&'a HistoryEntry>) -> Self {
        self.selected = selected;
        self
    }

    /// Index of the keyboard cursor, shown while focused.
    #[must_use]
    pub fn cursor(mut self, cursor: usize) -> Self {
        self.cursor = cursor;
        self
    }

    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    fn entry_line(&self, idx: usize, entry: &HistoryEntry, width: usize) -> Line<'a> {
        let is_selected = self.selected == Some(entry);
        let indicator = if self.focused && idx == self.cursor {
            Span::styled("▌", Style::default().fg(self.theme.primary))
        } else {
            Span::raw(" ")
        };

        let name = truncate_to_width(&entry.display_name(), width.saturating_sub(2));
        let style = if is_selected {
            self.theme.highlight()
        } else {
            self.theme.normal()
        };
        let padded = format!(" {name:<pad$}", pad = width.saturating_sub(2));
        Line::from(vec![indicator, Span::styled(padded, style)])
    }
}

impl Widget for HistorySidebar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border(self.focused))
            .title(Span::styled(" Chat History ", self.theme.title()));
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        let mut lines = vec![
            Line::from(vec![
                Span::styled(" + New Chat", Style::default().fg(self.theme.secondary)),
                Span::styled("  (n)", self.theme.dim()),
            ]),
            Line::from(""),
        ];

        if self.entries.is_empty() {
            lines.push(Line::from(Span::styled(" No saved chats yet", self.theme.dim())));
            Paragraph::new(lines).render(inner, buf);
            return;
        }

        // Scroll the list so the cursor stays visible
        let visible = usize::from(inner.height.saturating_sub(HEADER_LINES)).max(1);
        let offset = self.cursor.saturating_sub(visible - 1);
        let width = usize::from(inner.width);

        lines.extend(
            self.entries
                .iter()
                .enumerate()
                .skip(offset)
                .take(visible)
                .map(|(idx, entry)| self.entry_line(idx, entry, width)),
        );

        Paragraph::new(lines).render(inner, buf);
    }
}
