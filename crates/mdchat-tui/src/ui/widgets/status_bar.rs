//! Status bar widget.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

use crate::text::visual_width;
use crate::ui::Theme;

/// A key hint for the status bar.
#[derive(Debug, Clone)]
pub struct KeyHint {
    pub key: &'static str,
    pub label: &'static str,
}

impl KeyHint {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

/// Status bar widget displayed at the bottom of the screen.
pub struct StatusBar<'a> {
    mode: &'a str,
    hints: &'a [KeyHint],
    right_text: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(mode: &'a str, theme: &'a Theme) -> Self {
        Self {
            mode,
            hints: &[],
            right_text: None,
            theme,
        }
    }

    #[must_use]
    pub fn hints(mut self, hints: &'a [KeyHint]) -> Self {
        self.hints = hints;
        self
    }

    /// Set right-aligned text.
    #[must_use]
    pub fn right(mut self, text: Option<&'a str>) -> Self {
        self.right_text = text;
        self
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        buf.set_style(area, self.theme.status_bar());

        let mut spans = vec![
            Span::styled(
                format!(" {} ", self.mode),
                self.theme.highlight(),
            ),
            Span::styled(" ", self.theme.status_bar()),
        ];
        for hint in self.hints {
            spans.push(Span::styled(format!(" {} ", hint.key), self.theme.key_hint()));
            spans.push(Span::styled(format!(" {} ", hint.label), self.theme.status_bar()));
        }
        buf.set_line(area.x, area.y, &Line::from(spans), area.width);

        // Right text wins over hints it would overlap
        if let Some(text) = self.right_text {
            let width = u16::try_from(visual_width(text)).unwrap_or(u16::MAX);
            if width < area.width {
                let x = area.x + area.width - width - 1;
                buf.set_string(x, area.y, text, self.theme.status_bar());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::buffer_to_string;

    #[test]
    fn test_renders_mode_and_hints() {
        let theme = Theme::default();
        let hints = [KeyHint::new("Tab", "History"), KeyHint::new("^C", "Quit")];
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);

        StatusBar::new("CHAT", &theme).hints(&hints).render(area, &mut buf);

        assert_eq!(buffer_to_string(&buf), " CHAT   Tab  History  ^C  Quit");
    }

    #[test]
    fn test_right_text_is_right_aligned() {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 30, 1);
        let mut buf = Buffer::empty(area);

        StatusBar::new("CHAT", &theme)
            .right(Some("Copied"))
            .render(area, &mut buf);

        let line = buffer_to_string(&buf);
        assert!(line.ends_with("Copied"));
        assert_eq!(line.len(), 29);
    }
}
