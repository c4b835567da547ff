use leptos::task::spawn_local;
use serde::Deserialize;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, Request, RequestInit, Response};

use crate::config::NotificationConfig;
use crate::dom;
use crate::error::{Error, Result};

/// A reply without a numeric `count` means no unread notifications.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct NotificationCount {
    #[serde(default, deserialize_with = "lenient_count")]
    pub count: f64,
}

fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64().unwrap_or_default())
}

impl NotificationCount {
    pub fn has_notification(self) -> bool {
        self.count > 0.0
    }
}

pub fn parse_count(body: &str) -> Result<NotificationCount> {
    Ok(serde_json::from_str(body)?)
}

pub async fn fetch_count(url: &str) -> Result<NotificationCount> {
    let opts = RequestInit::new();
    opts.set_method("GET");
    let request = Request::new_with_str_and_init(url, &opts)?;
    request.headers().set("Accept", "application/json")?;

    let response: Response = JsFuture::from(dom::window()?.fetch_with_request(&request))
        .await?
        .dyn_into()
        .map_err(|_| Error::Js("fetch did not resolve to a Response".to_string()))?;
    if !response.ok() {
        return Err(Error::HttpStatus(response.status()));
    }
    let body = JsFuture::from(response.text()?).await?;
    parse_count(&body.as_string().unwrap_or_default())
}

/// Adds or removes the badge class. Returns `false` when the icon is absent.
pub fn apply_badge(document: &Document, selector: &str, badge_class: &str, on: bool) -> Result<bool> {
    let Some(icon) = dom::query_one::<Element>(document, selector)? else {
        tracing::debug!(selector, "no notification icon on this page");
        return Ok(false);
    };
    if on {
        icon.class_list().add_1(badge_class)?;
    } else {
        icon.class_list().remove_1(badge_class)?;
    }
    Ok(true)
}

/// Fetches the count once and updates the badge, alerting on failure.
pub async fn poll_once(config: &NotificationConfig, icon_selector: &str) -> Result<NotificationCount> {
    match fetch_count(&config.url).await {
        Ok(count) => {
            tracing::debug!(count = count.count, "notification count");
            apply_badge(&dom::document()?, icon_selector, &config.badge_class, count.has_notification())?;
            Ok(count)
        }
        Err(err) => {
            tracing::warn!(%err, url = %config.url, "notification count request failed");
            dom::window()?.alert_with_message(&config.error_message)?;
            Err(err)
        }
    }
}

pub fn poll(config: NotificationConfig, icon_selector: String) {
    spawn_local(async move {
        let _ = poll_once(&config, &icon_selector).await;
    });
}
