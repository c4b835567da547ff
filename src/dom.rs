use gloo_events::EventListener;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, Window};

use crate::error::{Error, Result};

pub fn window() -> Result<Window> {
    web_sys::window().ok_or(Error::MissingGlobal("window"))
}

pub fn document() -> Result<Document> {
    window()?.document().ok_or(Error::MissingGlobal("document"))
}

/// All elements matching `selector` that are of type `T`, in document order.
pub fn query_all<T: JsCast>(document: &Document, selector: &str) -> Result<Vec<T>> {
    let node_list = document.query_selector_all(selector)?;
    let mut out = Vec::with_capacity(node_list.length() as usize);
    for i in 0..node_list.length() {
        let Some(node) = node_list.item(i) else {
            continue;
        };
        if let Ok(element) = node.dyn_into::<T>() {
            out.push(element);
        }
    }
    Ok(out)
}

pub fn query_one<T: JsCast>(document: &Document, selector: &str) -> Result<Option<T>> {
    Ok(document
        .query_selector(selector)?
        .and_then(|element| element.dyn_into::<T>().ok()))
}

pub fn require<T: JsCast>(document: &Document, selector: &str) -> Result<T> {
    query_one(document, selector)?.ok_or_else(|| Error::MissingElement(selector.to_string()))
}

/// Makes a container hidden by the server markup visible.
pub fn reveal(element: &HtmlElement) -> Result<()> {
    element.remove_attribute("hidden")?;
    let style = element.style();
    style.remove_property("display")?;
    if let Some(computed) = window()?.get_computed_style(element)? {
        if computed.get_property_value("display")? == "none" {
            style.set_property("display", "block")?;
        }
    }
    Ok(())
}

/// Runs `f` once the document has been parsed.
pub fn on_ready(document: &Document, f: impl FnOnce() + 'static) {
    if document.ready_state() == "loading" {
        EventListener::once(document, "DOMContentLoaded", move |_| f()).forget();
    } else {
        f();
    }
}
