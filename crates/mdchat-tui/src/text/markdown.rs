//! Markdown rendering using pulldown-cmark.
//!
//! Provides [`render_markdown`] to convert markdown text to styled ratatui Lines.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};

use super::styles::MarkdownStyles;

/// Rule width used when the available width is unknown.
const DEFAULT_RULE_WIDTH: usize = 40;

/// Render markdown text to styled ratatui Lines.
///
/// `width` bounds horizontal rules; long lines are left for
/// [`wrap_lines`](super::wrap_lines) to break.
pub fn render_markdown(input: &str, width: usize, styles: &MarkdownStyles) -> Vec<Line<'static>> {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_TABLES);

    let parser = Parser::new_ext(input, options);

    let mut renderer = MarkdownRenderer::new(styles.clone(), width);
    renderer.run(parser);
    renderer.finish()
}

/// Internal renderer that processes pulldown-cmark events.
struct MarkdownRenderer {
    lines: Vec<Line<'static>>,
    styles: MarkdownStyles,
    width: usize,
    /// Stack of active styles for nested formatting.
    style_stack: Vec<Style>,
    current_spans: Vec<Span<'static>>,
    /// One entry per open list: the next number for ordered lists.
    list_stack: Vec<Option<u64>>,
    in_code_block: bool,
    in_blockquote: bool,
    pending_list_marker: Option<String>,
    /// Task list checkbox state (Some(checked) if in task item).
    task_checkbox: Option<bool>,
    /// Index of the next cell in the current table row.
    table_cell: usize,
}

impl MarkdownRenderer {
    fn new(styles: MarkdownStyles, width: usize) -> Self {
        Self {
            lines: Vec::new(),
            styles,
            width,
            style_stack: Vec::new(),
            current_spans: Vec::new(),
            list_stack: Vec::new(),
            in_code_block: false,
            in_blockquote: false,
            pending_list_marker: None,
            task_checkbox: None,
            table_cell: 0,
        }
    }

    fn run<'a>(&mut self, parser: impl Iterator<Item = Event<'a>>) {
        for event in parser {
            self.handle_event(event);
        }
        self.flush_line();
    }

    /// Drop the trailing blank line left by the last paragraph.
    fn finish(mut self) -> Vec<Line<'static>> {
        while self.lines.last().is_some_and(|l| l.width() == 0) {
            self.lines.pop();
        }
        self.lines
    }

    #[allow(clippy::too_many_lines)]
    fn handle_event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Heading { .. }) => {
                self.flush_line();
                self.style_stack.push(self.styles.heading);
            }
            Event::End(TagEnd::Heading(_)) => {
                self.flush_line();
                self.style_stack.pop();
                self.blank_line();
            }

            Event::Start(Tag::Emphasis) => {
                self.style_stack.push(Style::new().add_modifier(Modifier::ITALIC));
            }
            Event::Start(Tag::Strong) => {
                self.style_stack.push(Style::new().add_modifier(Modifier::BOLD));
            }
            Event::Start(Tag::Strikethrough) => {
                self.style_stack.push(Style::new().add_modifier(Modifier::CROSSED_OUT));
            }
            Event::Start(Tag::Link { .. }) => {
                self.style_stack.push(self.styles.link);
            }
            Event::End(TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link) => {
                self.style_stack.pop();
            }

            Event::Start(Tag::CodeBlock(_)) => {
                self.flush_line();
                self.in_code_block = true;
            }
            Event::End(TagEnd::CodeBlock) => {
                self.flush_line();
                self.in_code_block = false;
                self.blank_line();
            }

            Event::Start(Tag::List(start)) => {
                self.flush_line();
                self.list_stack.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    self.blank_line();
                }
            }
            Event::Start(Tag::Item) => {
                self.flush_line();
                self.pending_list_marker = Some(self.next_list_marker());
            }
            Event::End(TagEnd::Item) => {
                self.flush_line();
                self.task_checkbox = None;
            }
            Event::TaskListMarker(checked) => {
                self.task_checkbox = Some(checked);
            }

            Event::Start(Tag::BlockQuote) => {
                self.flush_line();
                self.in_blockquote = true;
            }
            Event::End(TagEnd::BlockQuote) => {
                self.flush_line();
                self.in_blockquote = false;
            }

            Event::End(TagEnd::Paragraph) => {
                self.flush_line();
                // Tight list items have no paragraph; loose ones stay compact too
                if self.list_stack.is_empty() {
                    self.blank_line();
                }
            }

            Event::Rule => {
                self.flush_line();
                let width = if self.width == 0 {
                    DEFAULT_RULE_WIDTH
                } else {
                    self.width
                };
                self.lines
                    .push(Line::from(Span::styled("─".repeat(width), self.styles.separator)));
            }

            // Tables render as plain rows
            Event::Start(Tag::Table(_)) => {
                self.flush_line();
            }
            Event::End(TagEnd::Table) => {
                self.blank_line();
            }
            Event::Start(Tag::TableHead) => {
                self.table_cell = 0;
                self.style_stack.push(Style::new().add_modifier(Modifier::BOLD));
            }
            Event::End(TagEnd::TableHead) => {
                self.style_stack.pop();
                self.flush_line();
            }
            Event::Start(Tag::TableRow) => {
                self.table_cell = 0;
            }
            Event::End(TagEnd::TableRow) => {
                self.flush_line();
            }
            Event::Start(Tag::TableCell) => {
                if self.table_cell > 0 {
                    self.current_spans
                        .push(Span::styled(" │ ", self.styles.separator));
                }
                self.table_cell += 1;
            }

            Event::Text(text) => {
                self.add_text(&text);
            }
            Event::Code(code) => {
                self.push_prefixes();
                self.current_spans
                    .push(Span::styled(code.into_string(), self.styles.code));
            }
            Event::SoftBreak => {
                self.add_text(" ");
            }
            Event::HardBreak => {
                self.flush_line();
            }

            Event::Start(
                Tag::Paragraph
                | Tag::Image { .. }
                | Tag::FootnoteDefinition(_)
                | Tag::MetadataBlock(_)
                | Tag::HtmlBlock,
            )
            | Event::End(
                TagEnd::Image
                | TagEnd::TableCell
                | TagEnd::FootnoteDefinition
                | TagEnd::MetadataBlock(_)
                | TagEnd::HtmlBlock,
            )
            | Event::Html(_)
            | Event::InlineHtml(_)
            | Event::FootnoteReference(_) => {}
        }
    }

    fn next_list_marker(&mut self) -> String {
        let indent = "  ".repeat(self.list_stack.len().saturating_sub(1));
        match self.list_stack.last_mut() {
            Some(Some(number)) => {
                let marker = format!("{indent}{number}. ");
                *number += 1;
                marker
            }
            _ => format!("{indent}• "),
        }
    }

    fn add_text(&mut self, text: &str) {
        if self.in_code_block {
            let indent = "  ".repeat(self.list_stack.len());
            for line in text.lines() {
                self.current_spans.push(Span::styled(
                    format!("{indent}  {line}"),
                    self.styles.code,
                ));
                self.flush_line();
            }
            return;
        }

        self.push_prefixes();
        let style = self.current_style();
        self.current_spans.push(Span::styled(text.to_string(), style));
    }

    /// Emit the list marker, checkbox and quote bar owed to the current line.
    fn push_prefixes(&mut self) {
        if let Some(marker) = self.pending_list_marker.take() {
            self.current_spans
                .push(Span::styled(marker, self.styles.marker));
            if let Some(checked) = self.task_checkbox.take() {
                let checkbox = if checked { "[x] " } else { "[ ] " };
                self.current_spans
                    .push(Span::styled(checkbox, self.styles.marker));
            }
        }

        if self.in_blockquote && self.current_spans.is_empty() {
            self.current_spans
                .push(Span::styled("│ ", self.styles.quote));
        }
    }

    fn current_style(&self) -> Style {
        let base = if self.in_blockquote {
            self.styles.quote
        } else {
            self.styles.text
        };
        self.style_stack.iter().fold(base, |style, s| style.patch(*s))
    }

    fn flush_line(&mut self) {
        if !self.current_spans.is_empty() {
            let spans = std::mem::take(&mut self.current_spans);
            self.lines.push(Line::from(spans));
        }
    }

    /// Push a separating blank line unless one is already there.
    fn blank_line(&mut self) {
        if self.lines.last().is_some_and(|l| l.width() > 0) {
            self.lines.push(Line::from(""));
        }
    }
}
