//! Color theme and common styles for the mdchat TUI.

use ratatui::style::{Color, Modifier, Style};

/// Theme color palette (Catppuccin Mocha).
#[derive(Debug, Clone)]
pub struct Theme {
    // Backgrounds
    pub base: Color,
    pub surface: Color,

    // Foregrounds
    pub text: Color,
    pub subtext: Color,
    pub muted: Color,

    // Accents
    pub primary: Color,
    pub secondary: Color,

    // Message authors
    pub user: Color,
    pub assistant: Color,

    // Borders
    pub border: Color,
    pub border_focused: Color,

    // Status bar
    pub status_bg: Color,
    pub status_key_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::mocha()
    }
}

impl Theme {
    /// Catppuccin Mocha theme.
    pub fn mocha() -> Self {
        Self {
            base: Color::Rgb(30, 30, 46),    // #1e1e2e
            surface: Color::Rgb(49, 50, 68), // #313244

            text: Color::Rgb(205, 214, 244),    // #cdd6f4
            subtext: Color::Rgb(166, 173, 200), // #a6adc8
            muted: Color::Rgb(108, 112, 134),   // #6c7086

            primary: Color::Rgb(180, 190, 254),   // #b4befe (lavender)
            secondary: Color::Rgb(148, 226, 213), // #94e2d5 (teal)

            user: Color::Rgb(250, 179, 135),      // #fab387 (peach)
            assistant: Color::Rgb(166, 227, 161), // #a6e3a1 (green)

            border: Color::Rgb(69, 71, 90),            // #45475a
            border_focused: Color::Rgb(180, 190, 254), // #b4befe

            status_bg: Color::Rgb(49, 50, 68),
            status_key_bg: Color::Rgb(70, 90, 140),
        }
    }

    /// Default text style.
    pub fn normal(&self) -> Style {
        Style::default().fg(self.text)
    }

    /// Dimmed text for secondary information.
    pub fn dim(&self) -> Style {
        Style::default().fg(self.muted)
    }

    /// Panel title style.
    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    /// Highlighted (selected) list item.
    pub fn highlight(&self) -> Style {
        Style::default()
            .fg(self.base)
            .bg(self.primary)
            .add_modifier(Modifier::BOLD)
    }

    /// Border style, brighter when focused.
    pub fn border(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.border_focused)
        } else {
            Style::default().fg(self.border)
        }
    }

    /// Key in a status bar hint.
    pub fn key_hint(&self) -> Style {
        Style::default()
            .fg(self.text)
            .bg(self.status_key_bg)
            .add_modifier(Modifier::BOLD)
    }

    /// Status bar background and labels.
    pub fn status_bar(&self) -> Style {
        Style::default().fg(self.text).bg(self.status_bg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_mocha() {
        let theme = Theme::default();
        assert!(matches!(theme.base, Color::Rgb(30, 30, 46)));
    }

    #[test]
    fn test_border_focus() {
        let theme = Theme::default();
        assert_eq!(theme.border(true).fg, Some(theme.border_focused));
        assert_eq!(theme.border(false).fg, Some(theme.border));
    }
}
