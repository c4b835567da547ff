use gloo_events::EventListener;
use web_sys::{Document, Element};

use crate::dom;
use crate::error::Result;

/// Wires the dropdown: a click on the trigger toggles `active_class`, a click
/// anywhere else in the document clears it. Returns `false` when the page has
/// no dropdown.
pub fn bind(document: &Document, selector: &str, active_class: &str) -> Result<bool> {
    let Some(dropdown) = dom::query_one::<Element>(document, selector)? else {
        tracing::debug!(selector, "no dropdown on this page");
        return Ok(false);
    };

    let trigger = dropdown.clone();
    let class = active_class.to_string();
    EventListener::new(&dropdown, "click", move |event| {
        event.stop_propagation();
        if let Err(err) = trigger.class_list().toggle(&class) {
            tracing::warn!(?err, "failed to toggle dropdown");
        }
    })
    .forget();

    let class = active_class.to_string();
    EventListener::new(document, "click", move |_| {
        let _ = dropdown.class_list().remove_1(&class);
    })
    .forget();

    Ok(true)
}
