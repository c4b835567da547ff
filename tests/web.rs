//! Browser tests for the page components.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

#![cfg(target_arch = "wasm32")]

use std::rc::Rc;

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{
    Document, Element, Event, HtmlElement, HtmlTextAreaElement, KeyboardEvent, KeyboardEventInit,
};

use nippo_ui::config::{
    AutocompleteConfig, EmojiConfig, KeyBinding, NotificationConfig, RendererOptions, Selectors,
    SurfaceConfig,
};
use nippo_ui::emoji::EmojiCatalog;
use nippo_ui::{autocomplete, dropdown, menu, notification, overlay, page};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

/// Appends `html` inside a fresh container on the body.
fn fixture(html: &str) -> Element {
    let document = document();
    let root = document.create_element("div").unwrap();
    root.set_inner_html(html);
    document.body().unwrap().append_child(&root).unwrap();
    root
}

fn by_id<T: JsCast>(id: &str) -> T {
    document().get_element_by_id(id).unwrap().dyn_into::<T>().unwrap()
}

fn is_displayed(element: &HtmlElement) -> bool {
    let computed = web_sys::window()
        .unwrap()
        .get_computed_style(element)
        .unwrap()
        .unwrap();
    !element.has_attribute("hidden") && computed.get_property_value("display").unwrap() != "none"
}

/// Counts `window.alert` calls in `window.__alerts`.
fn count_alerts() {
    let window = web_sys::window().unwrap();
    let counter = js_sys::Function::new_with_args(
        "message",
        "window.__alerts = (window.__alerts || 0) + 1;",
    );
    js_sys::Reflect::set(&window, &"alert".into(), &counter).unwrap();
    js_sys::Reflect::set(&window, &"__alerts".into(), &JsValue::from(0)).unwrap();
}

fn alerts() -> Option<f64> {
    let window = web_sys::window().unwrap();
    js_sys::Reflect::get(&window, &"__alerts".into()).unwrap().as_f64()
}

/// Lets pending Leptos effects flush to the DOM.
async fn next_tick() {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        web_sys::window()
            .unwrap()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, 0)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

// === Dropdown ===

#[wasm_bindgen_test]
fn test_dropdown_toggles_and_clears() {
    fixture(r#"<div id="dd" class="dropdown-test"><span id="dd-trigger">menu</span></div>"#);
    assert!(dropdown::bind(&document(), ".dropdown-test", "is-active").unwrap());

    let dropdown: HtmlElement = by_id("dd");
    let trigger: HtmlElement = by_id("dd-trigger");

    trigger.click();
    assert!(dropdown.class_list().contains("is-active"));

    trigger.click();
    assert!(!dropdown.class_list().contains("is-active"));

    trigger.click();
    document().body().unwrap().click();
    assert!(!dropdown.class_list().contains("is-active"));
}

#[wasm_bindgen_test]
fn test_dropdown_missing_is_noop() {
    assert!(!dropdown::bind(&document(), ".no-such-dropdown", "is-active").unwrap());
}

// === Notification badge ===

#[wasm_bindgen_test]
fn test_badge_follows_count() {
    fixture(r#"<i id="badge-sync"></i>"#);
    let icon: Element = by_id("badge-sync");

    notification::apply_badge(&document(), "#badge-sync", "has-notification", true).unwrap();
    assert!(icon.class_list().contains("has-notification"));

    notification::apply_badge(&document(), "#badge-sync", "has-notification", false).unwrap();
    assert!(!icon.class_list().contains("has-notification"));
}

#[wasm_bindgen_test]
async fn test_poll_sets_badge_from_response() {
    fixture(r#"<i id="badge-poll"></i>"#);
    let config = NotificationConfig {
        url: "data:application/json,%7B%22count%22%3A5%7D".to_string(),
        ..NotificationConfig::default()
    };

    let count = notification::poll_once(&config, "#badge-poll").await.unwrap();
    assert_eq!(count.count, 5.0);
    let icon: Element = by_id("badge-poll");
    assert!(icon.class_list().contains("has-notification"));
}

#[wasm_bindgen_test]
async fn test_failed_poll_alerts_once() {
    count_alerts();
    fixture(r#"<i id="badge-fail" class="has-notification"></i>"#);
    let config = NotificationConfig {
        url: "data:application/json,not-json".to_string(),
        ..NotificationConfig::default()
    };

    assert!(notification::poll_once(&config, "#badge-fail").await.is_err());
    assert_eq!(alerts(), Some(1.0));
    let icon: Element = by_id("badge-fail");
    assert!(icon.class_list().contains("has-notification"));
}

#[wasm_bindgen_test]
async fn test_reply_without_count_clears_badge_quietly() {
    count_alerts();
    fixture(r#"<i id="badge-empty" class="has-notification"></i>"#);
    let config = NotificationConfig {
        url: "data:application/json,%7B%7D".to_string(),
        ..NotificationConfig::default()
    };

    let count = notification::poll_once(&config, "#badge-empty").await.unwrap();
    assert_eq!(count.count, 0.0);
    assert_eq!(alerts(), Some(0.0));
    let icon: Element = by_id("badge-empty");
    assert!(!icon.class_list().contains("has-notification"));
}

// === Content containers ===

#[wasm_bindgen_test]
fn test_markdown_container_rendered_and_revealed() {
    fixture(r#"<div id="post" class="marked-test" hidden>**bold**</div>"#);
    let rendered =
        page::render_marked(&document(), ".marked-test", &RendererOptions::default()).unwrap();
    assert_eq!(rendered, 1);

    let post: HtmlElement = by_id("post");
    assert!(post.inner_html().contains("<strong>bold</strong>"));
    assert!(is_displayed(&post));

    // A second pass leaves the rendered HTML alone.
    let again =
        page::render_marked(&document(), ".marked-test", &RendererOptions::default()).unwrap();
    assert_eq!(again, 0);
    assert!(post.inner_html().contains("<strong>bold</strong>"));
}

#[wasm_bindgen_test]
fn test_markdown_reads_source_as_text() {
    fixture(r#"<div id="post-escaped" class="marked-escaped" style="display: none">a &lt; b</div>"#);
    page::render_marked(&document(), ".marked-escaped", &RendererOptions::default()).unwrap();
    let post: HtmlElement = by_id("post-escaped");
    assert_eq!(post.inner_html(), "<p>a &lt; b</p>\n");
    assert!(is_displayed(&post));
}

#[wasm_bindgen_test]
fn test_plain_text_container() {
    let root = fixture("");
    let body = document().create_element("div").unwrap();
    body.set_id("tweet");
    body.set_class_name("tweet-test");
    body.set_attribute("hidden", "").unwrap();
    body.set_text_content(Some("one\ntwo\n\n"));
    root.append_child(&body).unwrap();

    assert_eq!(page::render_plain(&document(), ".tweet-test").unwrap(), 1);
    let tweet: HtmlElement = by_id("tweet");
    assert_eq!(tweet.inner_html(), "one<br>two");
    assert!(is_displayed(&tweet));
}

// === Emoji ===

#[wasm_bindgen_test]
fn test_overlay_replaces_known_shortcodes_outside_code() {
    fixture(
        r#"<p id="greeting">hi :smile: :unknown:</p><code id="snippet">:smile:</code>"#,
    );
    let catalog = EmojiCatalog::new(["smile"]);
    let inserted = overlay::run_overlay(&document(), &catalog, &EmojiConfig::default()).unwrap();
    assert!(inserted >= 1);

    let greeting: Element = by_id("greeting");
    let img = greeting.query_selector("img.emoji").unwrap().unwrap();
    assert_eq!(img.get_attribute("src").as_deref(), Some("/img/emoji/smile.png"));
    assert!(greeting.text_content().unwrap().contains(":unknown:"));

    let snippet: Element = by_id("snippet");
    assert!(snippet.query_selector("img").unwrap().is_none());
}

#[wasm_bindgen_test]
fn test_completion_replaces_triggered_span() {
    fixture(r#"<textarea id="comment-test"></textarea>"#);
    let textarea: HtmlTextAreaElement = by_id("comment-test");
    textarea.set_value("hi :smi there");
    textarea.set_selection_range(7, 7).unwrap();

    assert!(autocomplete::complete_in_textarea(&textarea, "smile").unwrap());
    assert_eq!(textarea.value(), "hi :smile:  there");
    assert_eq!(textarea.selection_start().unwrap(), Some(11));
}

#[wasm_bindgen_test]
fn test_completion_without_trigger_leaves_text() {
    fixture(r#"<textarea id="comment-plain"></textarea>"#);
    let textarea: HtmlTextAreaElement = by_id("comment-plain");
    textarea.set_value("no trigger");
    textarea.set_selection_range(10, 10).unwrap();

    assert!(!autocomplete::complete_in_textarea(&textarea, "smile").unwrap());
    assert_eq!(textarea.value(), "no trigger");
}

// === Preferences menu ===

#[wasm_bindgen_test]
fn test_menu_param_collects_checked_values() {
    fixture(
        r#"<form id="menu-form-test">
            <input type="checkbox" class="menu-test" value="post" checked>
            <input type="checkbox" class="menu-test" value="gist">
            <input type="checkbox" class="menu-test" value="nippo" checked>
            <input type="hidden" id="menu-param-test">
        </form>"#,
    );
    let selectors = Selectors {
        menu_checkbox: ".menu-test".to_string(),
        menu_param: "#menu-param-test".to_string(),
        menu_form: "#menu-form-test".to_string(),
        ..Selectors::default()
    };

    let form = menu::fill_menu_param(&document(), &selectors).unwrap();
    assert_eq!(form.id(), "menu-form-test");
    let param: web_sys::HtmlInputElement = by_id("menu-param-test");
    assert_eq!(param.value(), "post,nippo");
}

#[wasm_bindgen_test]
fn test_menu_missing_form_is_an_error() {
    let selectors = Selectors {
        menu_checkbox: ".menu-none".to_string(),
        menu_param: "#menu-param-none".to_string(),
        menu_form: "#menu-form-none".to_string(),
        ..Selectors::default()
    };
    assert!(matches!(
        menu::fill_menu_param(&document(), &selectors),
        Err(nippo_ui::Error::MissingElement(_))
    ));
}

// === Suggestion popup ===

/// Binds suggestions to a fresh textarea and returns it with its popup host.
fn bound_textarea(id: &str, names: Vec<String>) -> (HtmlTextAreaElement, Element) {
    let _ = leptos::task::Executor::init_wasm_bindgen();
    fixture(&format!(r#"<textarea id="{id}"></textarea>"#));
    let surface = SurfaceConfig {
        selector: format!("#{id}"),
        accept_key: KeyBinding::default(),
    };
    let bound = autocomplete::bind(
        &document(),
        &surface,
        &AutocompleteConfig::default(),
        Rc::new(EmojiCatalog::new(names)),
        "/img/emoji",
    )
    .unwrap();
    assert_eq!(bound, 1);

    let hosts = document().query_selector_all(".textcomplete-wrapper").unwrap();
    let host = hosts.item(hosts.length() - 1).unwrap().dyn_into::<Element>().unwrap();
    (by_id(id), host)
}

fn emoji_names() -> Vec<String> {
    ["smile", "smiley", "smirk", "sushi"].map(String::from).to_vec()
}

fn type_text(textarea: &HtmlTextAreaElement, text: &str) {
    textarea.set_value(text);
    let caret = text.encode_utf16().count() as u32;
    textarea.set_selection_range(caret, caret).unwrap();
    textarea.dispatch_event(&Event::new("input").unwrap()).unwrap();
}

/// Dispatches a cancelable keydown and returns the event.
fn press(textarea: &HtmlTextAreaElement, key: &str, ctrl: bool) -> KeyboardEvent {
    let init = KeyboardEventInit::new();
    init.set_key(key);
    init.set_ctrl_key(ctrl);
    init.set_cancelable(true);
    init.set_bubbles(true);
    let event = KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init).unwrap();
    textarea.dispatch_event(&event).unwrap();
    event
}

fn rows(host: &Element) -> Vec<Element> {
    let items = host.query_selector_all("li.textcomplete-item").unwrap();
    (0..items.length())
        .map(|i| items.item(i).unwrap().dyn_into::<Element>().unwrap())
        .collect()
}

#[wasm_bindgen_test]
async fn test_popup_lists_matching_names_with_images() {
    let (textarea, host) = bound_textarea("suggest-rows", emoji_names());
    type_text(&textarea, "hi :smi");
    next_tick().await;

    let rows = rows(&host);
    assert_eq!(rows.len(), 3);
    let img = rows[0].query_selector("img.emoji-suggest").unwrap().unwrap();
    assert_eq!(img.get_attribute("src").as_deref(), Some("/img/emoji/smile.png"));
    assert_eq!(rows[0].text_content().unwrap().trim(), "smile");
    assert!(rows[0].class_list().contains("active"));
}

#[wasm_bindgen_test]
async fn test_popup_hidden_for_unknown_prefix() {
    let (textarea, host) = bound_textarea("suggest-none", emoji_names());
    type_text(&textarea, "hi :zzz");
    next_tick().await;

    assert!(rows(&host).is_empty());
    let list: HtmlElement = host.query_selector("ul").unwrap().unwrap().dyn_into().unwrap();
    assert_eq!(list.style().get_property_value("display").unwrap(), "none");
}

#[wasm_bindgen_test]
async fn test_popup_caps_rows_at_ten() {
    let names: Vec<String> = (0..30).map(|i| format!("face{i}")).collect();
    let (textarea, host) = bound_textarea("suggest-cap", names);
    type_text(&textarea, ":face");
    next_tick().await;

    assert_eq!(rows(&host).len(), 10);
}

#[wasm_bindgen_test]
async fn test_ctrl_j_accepts_open_popup() {
    let (textarea, host) = bound_textarea("suggest-accept", emoji_names());
    type_text(&textarea, "hi :su");
    next_tick().await;
    assert_eq!(rows(&host).len(), 1);

    let event = press(&textarea, "j", true);
    assert!(event.default_prevented());
    assert_eq!(textarea.value(), "hi :sushi: ");
    next_tick().await;
    assert!(rows(&host).is_empty());
}

#[wasm_bindgen_test]
async fn test_keys_pass_through_when_popup_closed() {
    let (textarea, _host) = bound_textarea("suggest-closed", emoji_names());
    type_text(&textarea, "plain text");
    next_tick().await;

    assert!(!press(&textarea, "j", true).default_prevented());
    assert!(!press(&textarea, "Enter", false).default_prevented());
    assert_eq!(textarea.value(), "plain text");
}

#[wasm_bindgen_test]
async fn test_enter_passes_through_once_caret_leaves_trigger() {
    let (textarea, _host) = bound_textarea("suggest-moved", emoji_names());
    type_text(&textarea, "hi :smi there");
    textarea.set_selection_range(7, 7).unwrap();
    textarea.dispatch_event(&Event::new("input").unwrap()).unwrap();
    next_tick().await;

    // Caret moves to the end of the text without an input event.
    textarea.set_selection_range(13, 13).unwrap();
    assert!(!press(&textarea, "Enter", false).default_prevented());
    assert_eq!(textarea.value(), "hi :smi there");
}
