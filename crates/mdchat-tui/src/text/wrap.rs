//! Text wrapping for styled ratatui Lines.

use ratatui::style::Style;
use ratatui::text::{Line, Span};

use super::width::visual_width;

/// Wrap a vector of Lines to fit within the specified width.
///
/// Lines that fit are kept as they are. Styling is preserved across the
/// pieces of a wrapped line.
pub fn wrap_lines(lines: Vec<Line<'static>>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return lines;
    }

    lines
        .into_iter()
        .flat_map(|line| wrap_line(line, width))
        .collect()
}

/// Wrap a single Line, returning one or more Lines.
fn wrap_line(line: Line<'static>, width: usize) -> Vec<Line<'static>> {
    let total_width: usize = line.spans.iter().map(|s| visual_width(&s.content)).sum();
    if total_width <= width {
        return vec![line];
    }

    let chars_with_styles: Vec<(char, Style)> = line
        .spans
        .iter()
        .flat_map(|span| span.content.chars().map(move |ch| (ch, span.style)))
        .collect();
    let plain_text: String = chars_with_styles.iter().map(|(ch, _)| ch).collect();

    // textwrap decides the break points; styles are mapped back by walking
    // the original characters in step with each wrapped piece.
    let mut result = Vec::new();
    let mut char_idx = 0;

    for wrapped in textwrap::wrap(&plain_text, width) {
        // Whitespace eaten at the break point
        while char_idx < chars_with_styles.len() {
            let (ch, _) = chars_with_styles[char_idx];
            if ch.is_whitespace() && !wrapped.starts_with(ch) {
                char_idx += 1;
            } else {
                break;
            }
        }

        let mut spans: Vec<Span<'static>> = Vec::new();
        let mut current: Option<(Style, String)> = None;

        for expected in wrapped.chars() {
            let style = match chars_with_styles.get(char_idx) {
                Some(&(_, style)) => {
                    char_idx += 1;
                    style
                }
                None => line.style,
            };

            match &mut current {
                Some((s, text)) if *s == style => text.push(expected),
                _ => {
                    if let Some((s, text)) = current.take() {
                        spans.push(Span::styled(text, s));
                    }
                    current = Some((style, expected.to_string()));
                }
            }
        }

        if let Some((s, text)) = current {
            spans.push(Span::styled(text, s));
        }
        if !spans.is_empty() {
            result.push(Line::from(spans));
        }
    }

    if result.is_empty() {
        result.push(Line::from(""));
    }
    result
}
