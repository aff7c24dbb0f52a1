//! Text rendering utilities.
//!
//! - [`render_markdown`] - Render markdown to styled ratatui Lines
//! - [`MarkdownStyles`] - Markdown styles accented by message author
//! - [`wrap_lines`] - Wrap styled lines to a width
//! - [`truncate_to_width`] - Unicode-aware truncation for fixed-width labels

mod markdown;
mod styles;
mod width;
mod wrap;

pub use markdown::render_markdown;
pub use styles::MarkdownStyles;
pub use width::{truncate_to_width, visual_width};
pub use wrap::wrap_lines;
