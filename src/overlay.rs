use web_sys::{Document, Element, Node};

use crate::config::EmojiConfig;
use crate::emoji::{emoji_url, split_shortcodes, EmojiCatalog, Segment};
use crate::error::Result;

/// `NodeFilter.SHOW_TEXT`
const SHOW_TEXT: u32 = 0x4;

/// Walks the text nodes under `<body>` and swaps known shortcodes for
/// `<img class="emoji">`. Returns the number of images inserted.
pub fn run_overlay(document: &Document, catalog: &EmojiCatalog, config: &EmojiConfig) -> Result<usize> {
    if catalog.is_empty() {
        tracing::debug!("no emoji catalog, skipping overlay");
        return Ok(0);
    }
    let Some(body) = document.body() else {
        return Ok(0);
    };

    // Collect first: the walker would otherwise visit the nodes we insert.
    let walker = document.create_tree_walker_with_what_to_show(&body, SHOW_TEXT)?;
    let mut text_nodes = Vec::new();
    while let Some(node) = walker.next_node()? {
        text_nodes.push(node);
    }

    let ignore = config.ignore.join(", ");
    let mut inserted = 0;
    for node in text_nodes {
        let Some(parent) = node.parent_element() else {
            continue;
        };
        if !ignore.is_empty() && parent.closest(&ignore)?.is_some() {
            continue;
        }
        let text = node.text_content().unwrap_or_default();
        let segments = split_shortcodes(&text, catalog);
        if !segments.iter().any(Segment::is_emoji) {
            continue;
        }
        for segment in segments {
            let replacement: Node = match segment {
                Segment::Text(text) => document.create_text_node(text).into(),
                Segment::Emoji(name) => {
                    inserted += 1;
                    emoji_image(document, &config.img_dir, name)?.into()
                }
            };
            parent.insert_before(&replacement, Some(&node))?;
        }
        parent.remove_child(&node)?;
    }
    tracing::debug!(inserted, "emoji overlay done");
    Ok(inserted)
}

fn emoji_image(document: &Document, img_dir: &str, name: &str) -> Result<Element> {
    let img = document.create_element("img")?;
    let label = format!(":{name}:");
    img.set_attribute("class", "emoji")?;
    img.set_attribute("src", &emoji_url(img_dir, name))?;
    img.set_attribute("alt", &label)?;
    img.set_attribute("title", &label)?;
    img.set_attribute("align", "absmiddle")?;
    Ok(img)
}
