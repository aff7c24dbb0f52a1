//! Multi-line draft input.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

use crate::ui::Theme;

/// Prompt shown before the first line.
const PROMPT: &str = "> ";

/// Widget rendering a [`TextInputState`].
pub struct TextInput<'a> {
    state: &'a TextInputState,
    theme: &'a Theme,
    block: Option<Block<'a>>,
    focused: bool,
    placeholder: Option<&'a str>,
}

impl<'a> TextInput<'a> {
    pub fn new(state: &'a TextInputState, theme: &'a Theme) -> Self {
        Self {
            state,
            theme,
            block: None,
            focused: true,
            placeholder: None,
        }
    }

    #[must_use]
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    #[must_use]
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    fn lines(&self) -> Vec<Line<'a>> {
        let prompt = Span::styled(PROMPT, self.theme.title());
        let cursor = Span::styled("▏", self.theme.title());

        if self.state.is_empty() {
            let mut spans = vec![prompt];
            if self.focused {
                spans.push(cursor);
            }
            if let Some(placeholder) = self.placeholder {
                spans.push(Span::styled(placeholder, self.theme.dim()));
            }
            return vec![Line::from(spans)];
        }

        let mut lines = Vec::new();
        let mut spans = vec![prompt];
        let mut text = String::new();

        for (idx, ch) in self.state.content.chars().enumerate() {
            if self.focused && idx == self.state.cursor {
                spans.push(Span::styled(std::mem::take(&mut text), self.theme.normal()));
                spans.push(cursor.clone());
            }
            if ch == '\n' {
                spans.push(Span::styled(std::mem::take(&mut text), self.theme.normal()));
                lines.push(Line::from(std::mem::take(&mut spans)));
                spans.push(Span::raw(" ".repeat(PROMPT.len())));
            } else {
                text.push(ch);
            }
        }

        spans.push(Span::styled(text, self.theme.normal()));
        if self.focused && self.state.cursor >= self.state.char_count() {
            spans.push(cursor);
        }
        lines.push(Line::from(spans));
        lines
    }
}

impl Widget for TextInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = match &self.block {
            Some(block) => {
                let inner = block.inner(area);
                block.clone().render(area, buf);
                inner
            }
            None => area,
        };
        if inner.height < 1 || inner.width < 1 {
            return;
        }

        let lines = self.lines();
        // Keep the cursor line visible once the draft outgrows the box
        let cursor_line = self.state.cursor_line();
        let scroll = cursor_line.saturating_sub(usize::from(inner.height) - 1);
        let scroll = u16::try_from(scroll).unwrap_or(u16::MAX);

        Paragraph::new(lines)
            .scroll((scroll, 0))
            .render(inner, buf);
    }
}

/// Draft content, cursor and recall history.
///
/// The cursor is a character index, never a byte index.
#[derive(Debug, Clone, Default)]
pub struct TextInputState {
    content: String,
    cursor: usize,
    /// Sent drafts, oldest first.
    history: Vec<String>,
    /// Position while recalling; `None` when editing a fresh draft.
    history_index: Option<usize>,
    /// Draft saved when recall started.
    saved_input: String,
}

impl TextInputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Number of lines in the draft.
    pub fn line_count(&self) -> usize {
        self.content.split('\n').count()
    }

    /// Zero-based line the cursor is on.
    pub fn cursor_line(&self) -> usize {
        self.content
            .chars()
            .take(self.cursor)
            .filter(|&c| c == '\n')
            .count()
    }

    fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_idx)
            .map_or(self.content.len(), |(i, _)| i)
    }

    /// Insert a character at the cursor.
    pub fn insert(&mut self, ch: char) {
        let at = self.byte_index(self.cursor);
        self.content.insert(at, ch);
        self.cursor += 1;
    }

    /// Insert a string at the cursor.
    pub fn insert_str(&mut self, s: &str) {
        let at = self.byte_index(self.cursor);
        self.content.insert_str(at, s);
        self.cursor += s.chars().count();
    }

    /// Delete the character before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.content.remove(at);
        }
    }

    /// Delete the character at the cursor.
    pub fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let at = self.byte_index(self.cursor);
            self.content.remove(at);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.char_count() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    /// Clear the draft and remember it for recall.
    pub fn submit(&mut self) -> String {
        let content = std::mem::take(&mut self.content);
        self.cursor = 0;
        if !content.trim().is_empty() && self.history.last() != Some(&content) {
            self.history.push(content.clone());
        }
        self.history_index = None;
        self.saved_input.clear();
        content
    }

    /// Recall the previous sent draft.
    pub fn history_prev(&mut self) {
        if self.history.is_empty() {
            return;
        }
        let index = match self.history_index {
            None => {
                self.saved_input = self.content.clone();
                self.history.len() - 1
            }
            Some(0) => return,
            Some(i) => i - 1,
        };
        self.history_index = Some(index);
        self.content = self.history[index].clone();
        self.move_end();
    }

    /// Move forward through recalled drafts, ending at the saved draft.
    pub fn history_next(&mut self) {
        let Some(index) = self.history_index else {
            return;
        };
        if index + 1 < self.history.len() {
            self.history_index = Some(index + 1);
            self.content = self.history[index + 1].clone();
        } else {
            self.history_index = None;
            self.content = std::mem::take(&mut self.saved_input);
        }
        self.move_end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::buffer_to_string;

    #[test]
    fn test_text_input_state_basic() {
        let mut state = TextInputState::new();
        assert!(state.is_empty());

        state.insert('H');
        state.insert('i');
        assert_eq!(state.content(), "Hi");
        assert_eq!(state.cursor(), 2);

        state.backspace();
        assert_eq!(state.content(), "H");
    }

    #[test]
    fn test_cursor_is_char_indexed() {
        let mut state = TextInputState::new();
        state.insert_str("héllo");
        assert_eq!(state.cursor(), 5);

        state.move_home();
        state.move_right();
        state.move_right();
        state.backspace();
        assert_eq!(state.content(), "hllo");

        state.insert('é');
        state.delete();
        assert_eq!(state.content(), "hélo");
    }

    #[test]
    fn test_cursor_movement() {
        let mut state = TextInputState::new();
        state.insert_str("Hello");

        state.move_left();
        state.move_left();
        state.insert('X');
        assert_eq!(state.content(), "HelXlo");

        state.move_home();
        assert_eq!(state.cursor(), 0);
        state.move_left();
        assert_eq!(state.cursor(), 0);

        state.move_end();
        assert_eq!(state.cursor(), 6);
    }

    #[test]
    fn test_history_recall() {
        let mut state = TextInputState::new();
        state.insert_str("first");
        state.submit();
        state.insert_str("second");
        state.submit();
        state.insert_str("draft");

        state.history_prev();
        assert_eq!(state.content(), "second");
        state.history_prev();
        assert_eq!(state.content(), "first");
        state.history_prev();
        assert_eq!(state.content(), "first");

        state.history_next();
        assert_eq!(state.content(), "second");
        state.history_next();
        assert_eq!(state.content(), "draft");
        assert_eq!(state.cursor(), 5);
    }

    #[test]
    fn test_blank_submit_not_recalled() {
        let mut state = TextInputState::new();
        state.insert_str("   ");
        state.submit();
        state.history_prev();
        assert!(state.is_empty());
    }

    #[test]
    fn test_line_tracking() {
        let mut state = TextInputState::new();
        state.insert_str("one\ntwo\nthree");
        assert_eq!(state.line_count(), 3);
        assert_eq!(state.cursor_line(), 2);
        state.move_home();
        assert_eq!(state.cursor_line(), 0);
    }

    #[test]
    fn test_render_placeholder() {
        let state = TextInputState::new();
        let theme = Theme::default();
        let area = Rect::new(0, 0, 40, 1);
        let mut buf = Buffer::empty(area);

        TextInput::new(&state, &theme)
            .focused(false)
            .placeholder("Type a message with Markdown...")
            .render(area, &mut buf);

        assert_eq!(buffer_to_string(&buf), "> Type a message with Markdown...");
    }

    #[test]
    fn test_render_multiline_content() {
        let mut state = TextInputState::new();
        state.insert_str("ab\ncd");
        let theme = Theme::default();
        let area = Rect::new(0, 0, 10, 2);
        let mut buf = Buffer::empty(area);

        TextInput::new(&state, &theme)
            .focused(false)
            .render(area, &mut buf);

        assert_eq!(buffer_to_string(&buf), "> ab\n  cd");
    }
}
