//! Conversation transcript.
//!
//! Each message gets an author line followed by its Markdown rendering.
//! Scrolling is measured from the bottom so that new messages stay in view
//! while the offset is zero.

use mdchat_engine::ChatMessage;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::text::{render_markdown, wrap_lines, MarkdownStyles};
use crate::ui::Theme;

/// Columns between the border and message text.
const MESSAGE_INDENT: usize = 2;

/// Render messages to wrapped lines for the given content width.
pub fn transcript_lines(messages: &[ChatMessage], width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let body_width = width.saturating_sub(MESSAGE_INDENT);
    let indent = " ".repeat(MESSAGE_INDENT);
    let mut lines = Vec::new();

    for (idx, message) in messages.iter().enumerate() {
        if idx > 0 {
            lines.push(Line::from(""));
        }

        let styles = MarkdownStyles::for_role(theme, message.role);
        lines.push(Line::from(Span::styled(message.role.label(), styles.heading)));

        let body = wrap_lines(render_markdown(&message.text, body_width, &styles), body_width);
        lines.extend(body.into_iter().map(|line| {
            let mut spans = vec![Span::raw(indent.clone())];
            spans.extend(line.spans);
            Line::from(spans)
        }));
    }

    lines
}

/// First visible line for a bottom-relative scroll offset.
pub fn top_line(total: usize, height: usize, from_bottom: usize) -> usize {
    let max = total.saturating_sub(height);
    max - from_bottom.min(max)
}

pub struct TranscriptView<'a> {
    messages: &'a [ChatMessage],
    title: String,
    scroll_from_bottom: usize,
    theme: &'a Theme,
}

impl<'a> TranscriptView<'a> {
    pub fn new(messages: &'a [ChatMessage], theme: &'a Theme) -> Self {
        Self {
            messages,
            title: " New Chat ".to_string(),
            scroll_from_bottom: 0,
            theme,
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = format!(" {} ", title.into());
        self
    }

    #[must_use]
    pub fn scroll_from_bottom(mut self, lines: usize) -> Self {
        self.scroll_from_bottom = lines;
        self
    }

    /// Largest useful scroll offset for `area`.
    pub fn max_scroll(&self, area: Rect) -> usize {
        let inner = Self::block_inner(area);
        let total = transcript_lines(self.messages, usize::from(inner.width), self.theme).len();
        total.saturating_sub(usize::from(inner.height))
    }

    fn block_inner(area: Rect) -> Rect {
        Block::default().borders(Borders::ALL).inner(area)
    }
}

impl Widget for TranscriptView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border(false))
            .title(Span::styled(self.title.clone(), self.theme.title()));
        let inner = block.inner(area);
        block.render(area, buf);
        if inner.height == 0 || inner.width == 0 {
            return;
        }

        if self.messages.is_empty() {
            let hint = Line::from(Span::styled(
                "Send a message to start chatting",
                self.theme.dim(),
            ));
            let y = inner.y + inner.height / 2;
            Paragraph::new(hint)
                .alignment(Alignment::Center)
                .render(Rect::new(inner.x, y, inner.width, 1), buf);
            return;
        }

        let lines = transcript_lines(self.messages, usize::from(inner.width), self.theme);
        let top = top_line(lines.len(), usize::from(inner.height), self.scroll_from_bottom);
        let top = u16::try_from(top).unwrap_or(u16::MAX);

        Paragraph::new(lines).scroll((top, 0)).render(inner, buf);
    }
}
