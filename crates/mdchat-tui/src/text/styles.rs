//! Per-author Markdown styles.
//!
//! A message body takes its accent from its author: headings, links and list
//! markers in user messages use the user colour, those in assistant messages
//! the assistant colour. Heading levels are not distinguished.

use mdchat_engine::Role;
use ratatui::style::{Color, Modifier, Style};

use crate::ui::Theme;

#[derive(Debug, Clone)]
pub struct MarkdownStyles {
    /// Body text.
    pub text: Style,
    /// Headings and the author line above a message.
    pub heading: Style,
    pub link: Style,
    /// Inline code and code block lines.
    pub code: Style,
    /// List markers and checkboxes.
    pub marker: Style,
    pub quote: Style,
    /// Rules and table cell separators.
    pub separator: Style,
}

impl MarkdownStyles {
    pub fn for_role(theme: &Theme, role: Role) -> Self {
        let accent = accent(theme, role);
        Self {
            text: Style::default().fg(theme.text),
            heading: Style::default().fg(accent).add_modifier(Modifier::BOLD),
            link: Style::default()
                .fg(accent)
                .add_modifier(Modifier::UNDERLINED),
            code: Style::default().fg(theme.secondary).bg(theme.surface),
            marker: Style::default().fg(accent),
            quote: Style::default()
                .fg(theme.subtext)
                .add_modifier(Modifier::ITALIC),
            separator: Style::default().fg(theme.border),
        }
    }
}

fn accent(theme: &Theme, role: Role) -> Color {
    match role {
        Role::User => theme.user,
        Role::Assistant => theme.assistant,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accent_follows_author() {
        let theme = Theme::default();
        let user = MarkdownStyles::for_role(&theme, Role::User);
        let assistant = MarkdownStyles::for_role(&theme, Role::Assistant);

        assert_eq!(user.heading.fg, Some(theme.user));
        assert_eq!(user.marker.fg, Some(theme.user));
        assert_eq!(assistant.heading.fg, Some(theme.assistant));
        assert_eq!(assistant.link.fg, Some(theme.assistant));
    }

    #[test]
    fn test_shared_styles_ignore_author() {
        let theme = Theme::default();
        let user = MarkdownStyles::for_role(&theme, Role::User);
        let assistant = MarkdownStyles::for_role(&theme, Role::Assistant);

        assert_eq!(user.code, assistant.code);
        assert_eq!(user.text, assistant.text);
        assert_eq!(user.separator.fg, Some(theme.border));
    }
}
