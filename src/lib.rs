//! Browser front end for the nippo pages.

pub mod autocomplete;
pub mod completion;
pub mod config;
pub mod dom;
pub mod dropdown;
pub mod emoji;
pub mod error;
pub mod logging;
pub mod markdown;
pub mod menu;
pub mod notification;
pub mod overlay;
pub mod page;
pub mod plain_text;

use std::fmt::Debug;
use std::rc::Rc;

pub use config::PageConfig;
pub use error::{Error, Result};

use emoji::EmojiCatalog;

/// Entry point: installs panic and log hooks, then runs every component once
/// the document is ready.
pub fn start() {
    console_error_panic_hook::set_once();
    logging::init();
    if let Err(err) = leptos::task::Executor::init_wasm_bindgen() {
        tracing::debug!(?err, "task executor already initialised");
    }

    let document = match dom::document() {
        Ok(document) => document,
        Err(err) => {
            tracing::error!(%err, "not running in a browser page");
            return;
        }
    };
    let config = PageConfig::from_document(&document);
    dom::on_ready(&document, move || run(&config));
}

pub fn run(config: &PageConfig) {
    let (window, document) = match (dom::window(), dom::document()) {
        (Ok(window), Ok(document)) => (window, document),
        (Err(err), _) | (_, Err(err)) => {
            tracing::error!(%err, "no document to enhance");
            return;
        }
    };
    tracing::info!("enhancing page");
    let selectors = &config.selectors;

    // Markdown first so the emoji overlay also covers rendered posts.
    report(
        "markdown",
        page::render_marked(&document, &selectors.marked, &config.renderer),
    );
    report("plain text", page::render_plain(&document, &selectors.tweet_body));

    let catalog = Rc::new(EmojiCatalog::from_window(&window, &config.emoji.names));
    tracing::debug!(emoji = catalog.len(), "emoji catalog loaded");
    report(
        "emoji overlay",
        overlay::run_overlay(&document, &catalog, &config.emoji),
    );
    for surface in &config.autocomplete.surfaces {
        report(
            "autocomplete",
            autocomplete::bind(
                &document,
                surface,
                &config.autocomplete,
                catalog.clone(),
                &config.emoji.img_dir,
            ),
        );
    }

    report(
        "dropdown",
        dropdown::bind(&document, &selectors.dropdown, &config.dropdown_active_class),
    );
    notification::poll(config.notification.clone(), selectors.notification_icon.clone());
    report("menu", menu::install(&window, selectors.clone()));
}

fn report<T: Debug>(component: &str, result: Result<T>) {
    match result {
        Ok(outcome) => tracing::debug!(component, ?outcome, "component ready"),
        Err(err) => tracing::warn!(component, %err, "component failed"),
    }
}
