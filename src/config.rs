use serde::{Deserialize, Serialize};
use web_sys::Document;

use crate::error::{Error, Result};

pub const CONFIG_ELEMENT_ID: &str = "nippo-config";

/// Markdown renderer settings for posted content.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct RendererOptions {
    pub gfm: bool,
    pub tables: bool,
    pub breaks: bool,
    pub html: bool,
    /// Escape raw HTML even when `html` is set.
    pub sanitize: bool,
    pub linkify: bool,
    pub smartypants: bool,
    pub highlight: bool,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            gfm: true,
            tables: true,
            breaks: true,
            html: true,
            sanitize: false,
            linkify: true,
            smartypants: false,
            highlight: true,
        }
    }
}

impl RendererOptions {
    pub fn allows_html(&self) -> bool {
        self.html && !self.sanitize
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct EmojiConfig {
    pub img_dir: String,
    /// Used when the page does not define `window.emojies`.
    pub names: Vec<String>,
    /// Text under these selectors is never emojified.
    pub ignore: Vec<String>,
}

impl Default for EmojiConfig {
    fn default() -> Self {
        Self {
            img_dir: "/img/emoji".to_string(),
            names: Vec::new(),
            ignore: ["script", "style", "textarea", "pre", "code", "a", ".no-emojify"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct KeyBinding {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Default for KeyBinding {
    fn default() -> Self {
        Self {
            key: "j".to_string(),
            ctrl: true,
            shift: false,
            alt: false,
            meta: false,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct SurfaceConfig {
    pub selector: String,
    /// Extra key that accepts the highlighted suggestion.
    pub accept_key: KeyBinding,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            selector: "#input-comment".to_string(),
            accept_key: KeyBinding::default(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct AutocompleteConfig {
    pub max_count: usize,
    pub surfaces: Vec<SurfaceConfig>,
}

impl Default for AutocompleteConfig {
    fn default() -> Self {
        Self {
            max_count: 10,
            surfaces: vec![
                SurfaceConfig {
                    selector: ".CodeMirror textarea".to_string(),
                    accept_key: KeyBinding::default(),
                },
                SurfaceConfig::default(),
            ],
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct NotificationConfig {
    pub url: String,
    pub badge_class: String,
    pub error_message: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            url: "/notification_count".to_string(),
            badge_class: "has-notification".to_string(),
            error_message: "Error!".to_string(),
        }
    }
}

/// Selectors for the server-rendered markup.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Selectors {
    pub dropdown: String,
    pub notification_icon: String,
    pub marked: String,
    pub tweet_body: String,
    pub menu_checkbox: String,
    pub menu_param: String,
    pub menu_form: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            dropdown: ".dropdown".to_string(),
            notification_icon: "#notification-icon".to_string(),
            marked: ".marked".to_string(),
            tweet_body: ".tweet-body".to_string(),
            menu_checkbox: ".menu".to_string(),
            menu_param: "#menu_param".to_string(),
            menu_form: "#preference_menu_form".to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct PageConfig {
    pub renderer: RendererOptions,
    pub emoji: EmojiConfig,
    pub autocomplete: AutocompleteConfig,
    pub notification: NotificationConfig,
    pub selectors: Selectors,
    pub dropdown_active_class: String,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            renderer: RendererOptions::default(),
            emoji: EmojiConfig::default(),
            autocomplete: AutocompleteConfig::default(),
            notification: NotificationConfig::default(),
            selectors: Selectors::default(),
            dropdown_active_class: "is-active".to_string(),
        }
    }
}

impl PageConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(Error::Config)
    }

    /// Reads the embedded override block, falling back to defaults.
    pub fn from_document(document: &Document) -> Self {
        let Some(element) = document.get_element_by_id(CONFIG_ELEMENT_ID) else {
            return Self::default();
        };
        let json = element.text_content().unwrap_or_default();
        match Self::from_json(&json) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(%err, "ignoring page config");
                Self::default()
            }
        }
    }
}
