//! Markdown-to-HTML collaborator.
//!
//! Post bodies are stored as raw Markdown and converted at display time:
//! `comrak` does the CommonMark conversion (fenced code blocks included)
//! and `ammonia` sanitizes the result before it reaches a template or the
//! feed.

use ammonia::Builder;
use comrak::{Options, markdown_to_html};
use once_cell::sync::Lazy;

static SANITIZER: Lazy<Builder<'static>> = Lazy::new(|| {
    let mut builder = Builder::default();
    // Keep the `language-*` class comrak puts on fenced code blocks.
    builder.add_tag_attributes("code", &["class"]);
    builder
});

pub fn render_markdown(markdown: &str) -> String {
    let html = markdown_to_html(markdown, &Options::default());
    SANITIZER.clean(&html).to_string()
}
