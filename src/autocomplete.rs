use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, HtmlTextAreaElement, KeyboardEvent};

use crate::completion::{
    apply_completion, byte_to_utf16, find_trigger, key_command, step_index, utf16_to_byte,
    KeyCommand, KeyStroke,
};
use crate::config::{AutocompleteConfig, KeyBinding, SurfaceConfig};
use crate::dom;
use crate::emoji::{emoji_url, EmojiCatalog};
use crate::error::{Error, Result};

#[derive(Clone, Copy)]
struct Popup {
    items: RwSignal<Vec<String>>,
    active: RwSignal<usize>,
    anchor: RwSignal<Option<(f64, f64)>>,
}

impl Popup {
    fn new() -> Self {
        Self {
            items: RwSignal::new(Vec::new()),
            active: RwSignal::new(0),
            anchor: RwSignal::new(None),
        }
    }

    fn is_open(&self) -> bool {
        !self.items.with_untracked(Vec::is_empty)
    }

    fn show(&self, items: Vec<String>, anchor: (f64, f64)) {
        self.active.set(0);
        self.anchor.set(Some(anchor));
        self.items.set(items);
    }

    fn hide(&self) {
        if self.is_open() {
            self.items.set(Vec::new());
        }
    }

    fn step(&self, delta: isize) {
        let len = self.items.with_untracked(Vec::len);
        self.active.update(|active| *active = step_index(*active, len, delta));
    }

    fn style(&self) -> String {
        match self.anchor.get() {
            Some((left, top)) if !self.items.with(Vec::is_empty) => format!(
                "display: block; position: absolute; left: {left}px; top: {top}px; z-index: 1000;"
            ),
            _ => "display: none;".to_string(),
        }
    }
}

#[component]
fn SuggestionList(popup: Popup, img_dir: String) -> impl IntoView {
    view! {
        <ul class="textcomplete-dropdown" style=move || popup.style()>
            {move || popup.items.get().into_iter().enumerate().map(|(index, name)| {
                let src = emoji_url(&img_dir, &name);
                view! {
                    <li
                        class="textcomplete-item"
                        class:active=move || popup.active.get() == index
                        data-index=index.to_string()
                    >
                        <img class="emoji-suggest" src=src />
                        " "
                        {name}
                    </li>
                }
            }).collect::<Vec<_>>()}
        </ul>
    }
}

struct Binder {
    textarea: HtmlTextAreaElement,
    catalog: Rc<EmojiCatalog>,
    popup: Popup,
    max_count: usize,
    accept_key: KeyBinding,
}

impl Binder {
    fn refresh(&self) -> Result<()> {
        let text = self.textarea.value();
        let caret = caret_byte(&self.textarea, &text)?;
        let items: Vec<String> = find_trigger(&text[..caret])
            .map(|trigger| {
                self.catalog
                    .complete(&trigger.term, self.max_count)
                    .into_iter()
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        if items.is_empty() {
            self.popup.hide();
            return Ok(());
        }
        let rect = self.textarea.get_bounding_client_rect();
        let window = dom::window()?;
        let anchor = (rect.left() + window.scroll_x()?, rect.bottom() + window.scroll_y()?);
        self.popup.show(items, anchor);
        Ok(())
    }

    /// Returns `false` when the caret no longer sits on a trigger.
    fn accept(&self, index: usize) -> Result<bool> {
        let name = self.popup.items.with_untracked(|items| items.get(index).cloned());
        self.popup.hide();
        match name {
            Some(name) => complete_in_textarea(&self.textarea, &name),
            None => Ok(false),
        }
    }

    /// Returns `true` when the key was consumed by the popup.
    fn handle_key(&self, event: &KeyboardEvent) -> Result<bool> {
        if !self.popup.is_open() {
            return Ok(false);
        }
        let Some(command) = key_command(&KeyStroke::from_event(event), &self.accept_key) else {
            return Ok(false);
        };
        match command {
            KeyCommand::Up => self.popup.step(-1),
            KeyCommand::Down => self.popup.step(1),
            KeyCommand::Accept => return self.accept(self.popup.active.get_untracked()),
            KeyCommand::Close => self.popup.hide(),
        }
        Ok(true)
    }
}

/// Keys that move the caret without editing, so no `input` event follows.
fn moves_caret(key: &str) -> bool {
    matches!(
        key,
        "ArrowLeft" | "ArrowRight" | "Home" | "End" | "PageUp" | "PageDown"
    )
}

fn caret_byte(textarea: &HtmlTextAreaElement, text: &str) -> Result<usize> {
    let caret = textarea.selection_start()?.unwrap_or(0) as usize;
    Ok(utf16_to_byte(text, caret))
}

/// Replaces the shortcode trigger before the caret with `:name: ` and moves
/// the caret after it. Returns `false` when there is no trigger.
pub fn complete_in_textarea(textarea: &HtmlTextAreaElement, name: &str) -> Result<bool> {
    let text = textarea.value();
    let caret = caret_byte(textarea, &text)?;
    let Some(done) = apply_completion(&text, caret, name) else {
        return Ok(false);
    };
    textarea.set_value(&done.text);
    let caret = byte_to_utf16(&done.text, done.caret) as u32;
    textarea.set_selection_range(caret, caret)?;
    // Editor widgets wrapping the textarea pick the change up from `input`.
    textarea.dispatch_event(&Event::new("input")?)?;
    Ok(true)
}

/// Attaches suggestions to every textarea matching `surface.selector`.
/// Returns the number of textareas bound.
pub fn bind(
    document: &Document,
    surface: &SurfaceConfig,
    config: &AutocompleteConfig,
    catalog: Rc<EmojiCatalog>,
    img_dir: &str,
) -> Result<usize> {
    if catalog.is_empty() {
        return Ok(0);
    }
    let textareas = dom::query_all::<HtmlTextAreaElement>(document, &surface.selector)?;
    for textarea in &textareas {
        let popup = Popup::new();
        let host = mount_popup(document, popup, img_dir.to_string())?;
        let binder = Rc::new(Binder {
            textarea: textarea.clone(),
            catalog: catalog.clone(),
            popup,
            max_count: config.max_count,
            accept_key: surface.accept_key.clone(),
        });
        listen(binder, &host);
    }
    tracing::debug!(selector = %surface.selector, bound = textareas.len(), "autocomplete bound");
    Ok(textareas.len())
}

fn mount_popup(document: &Document, popup: Popup, img_dir: String) -> Result<HtmlElement> {
    let host: HtmlElement = document.create_element("div")?.unchecked_into();
    host.set_class_name("textcomplete-wrapper");
    let body = document
        .body()
        .ok_or(Error::MissingGlobal("document.body"))?;
    body.append_child(&host)?;
    leptos::mount::mount_to(host.clone(), move || {
        view! { <SuggestionList popup=popup img_dir=img_dir /> }
    })
    .forget();
    Ok(host)
}

fn listen(binder: Rc<Binder>, host: &HtmlElement) {
    let target = binder.textarea.clone();

    let on_input = binder.clone();
    EventListener::new(&target, "input", move |_| {
        if let Err(err) = on_input.refresh() {
            tracing::warn!(%err, "failed to refresh suggestions");
        }
    })
    .forget();

    let on_keyup = binder.clone();
    EventListener::new(&target, "keyup", move |event| {
        let event = event.unchecked_ref::<KeyboardEvent>();
        if !moves_caret(&event.key()) {
            return;
        }
        if let Err(err) = on_keyup.refresh() {
            tracing::warn!(%err, "failed to refresh suggestions");
        }
    })
    .forget();

    let on_click = binder.clone();
    EventListener::new(&target, "click", move |_| {
        if let Err(err) = on_click.refresh() {
            tracing::warn!(%err, "failed to refresh suggestions");
        }
    })
    .forget();

    let on_key = binder.clone();
    EventListener::new_with_options(
        &target,
        "keydown",
        EventListenerOptions::enable_prevent_default(),
        move |event| {
            let event = event.unchecked_ref::<KeyboardEvent>();
            match on_key.handle_key(event) {
                Ok(true) => event.prevent_default(),
                Ok(false) => {}
                Err(err) => tracing::warn!(%err, "suggestion key handling failed"),
            }
        },
    )
    .forget();

    let on_blur = binder.clone();
    EventListener::new(&target, "blur", move |_| on_blur.popup.hide()).forget();

    // mousedown rather than click so the textarea keeps focus.
    EventListener::new_with_options(
        host,
        "mousedown",
        EventListenerOptions::enable_prevent_default(),
        move |event| {
            event.prevent_default();
            let index = event
                .target()
                .and_then(|target| target.dyn_into::<Element>().ok())
                .and_then(|element| element.closest("[data-index]").ok().flatten())
                .and_then(|item| item.get_attribute("data-index"))
                .and_then(|index| index.parse::<usize>().ok());
            if let Some(index) = index {
                if let Err(err) = binder.accept(index) {
                    tracing::warn!(%err, "failed to insert suggestion");
                }
            }
        },
    )
    .forget();
}
