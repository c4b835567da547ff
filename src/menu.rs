use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlFormElement, HtmlInputElement, Window};

use crate::config::Selectors;
use crate::dom;
use crate::error::Result;

/// Name of the global the form's submit button calls.
pub const WINDOW_HOOK: &str = "submitUpdateMenu";

pub fn join_menu_values(values: &[String]) -> String {
    values.join(",")
}

pub fn checked_values(document: &Document, selector: &str) -> Result<Vec<String>> {
    Ok(dom::query_all::<HtmlInputElement>(document, selector)?
        .into_iter()
        .filter(HtmlInputElement::checked)
        .map(|input| input.value())
        .collect())
}

/// Writes the checked values into the hidden field and returns the form.
pub fn fill_menu_param(document: &Document, selectors: &Selectors) -> Result<HtmlFormElement> {
    let values = checked_values(document, &selectors.menu_checkbox)?;
    let param: HtmlInputElement = dom::require(document, &selectors.menu_param)?;
    param.set_value(&join_menu_values(&values));
    dom::require(document, &selectors.menu_form)
}

pub fn submit_update_menu(selectors: &Selectors) -> Result<()> {
    let form = fill_menu_param(&dom::document()?, selectors)?;
    form.submit()?;
    Ok(())
}

/// Exposes [`submit_update_menu`] as `window.submitUpdateMenu()`.
pub fn install(window: &Window, selectors: Selectors) -> Result<()> {
    let closure = Closure::<dyn Fn()>::new(move || {
        if let Err(err) = submit_update_menu(&selectors) {
            tracing::warn!(%err, "preferences menu not submitted");
        }
    });
    js_sys::Reflect::set(window, &WINDOW_HOOK.into(), closure.as_ref())?;
    closure.forget();
    Ok(())
}
