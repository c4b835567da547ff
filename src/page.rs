use web_sys::{Document, HtmlElement};

use crate::config::RendererOptions;
use crate::dom;
use crate::error::Result;
use crate::markdown::render_markdown;
use crate::plain_text::format_plain_text;

/// Set on a container once its Markdown has been rendered, so a second pass
/// never treats generated HTML as Markdown source.
pub const RENDERED_ATTR: &str = "data-rendered";

/// Renders the Markdown text of every matching container and reveals it.
/// Returns the number of containers rendered.
pub fn render_marked(document: &Document, selector: &str, options: &RendererOptions) -> Result<usize> {
    let mut rendered = 0;
    for element in dom::query_all::<HtmlElement>(document, selector)? {
        if element.has_attribute(RENDERED_ATTR) {
            continue;
        }
        let source = element.text_content().unwrap_or_default();
        element.set_inner_html(&render_markdown(&source, options));
        element.set_attribute(RENDERED_ATTR, "")?;
        dom::reveal(&element)?;
        rendered += 1;
    }
    tracing::debug!(selector, rendered, "rendered markdown containers");
    Ok(rendered)
}

/// Turns newlines into line breaks in every matching container and reveals it.
pub fn render_plain(document: &Document, selector: &str) -> Result<usize> {
    let elements = dom::query_all::<HtmlElement>(document, selector)?;
    for element in &elements {
        element.set_inner_html(&format_plain_text(&element.inner_html()));
        dom::reveal(element)?;
    }
    tracing::debug!(selector, formatted = elements.len(), "formatted plain text containers");
    Ok(elements.len())
}
