use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use web_sys::Window;

/// Page global holding the shortcode list shipped with the emoji images.
const WINDOW_GLOBAL: &str = "emojies";

#[derive(Clone, Debug, Default)]
pub struct EmojiCatalog {
    names: Vec<String>,
    index: HashSet<String>,
}

impl EmojiCatalog {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut catalog = Self::default();
        for name in names {
            let name = name.into();
            if !name.is_empty() && catalog.index.insert(name.clone()) {
                catalog.names.push(name);
            }
        }
        catalog
    }

    /// Loads `window.emojies`, or `fallback` when the page does not define it.
    pub fn from_window(window: &Window, fallback: &[String]) -> Self {
        let value = js_sys::Reflect::get(window, &WINDOW_GLOBAL.into()).unwrap_or_default();
        if value.is_undefined() || value.is_null() {
            return Self::new(fallback.iter().cloned());
        }
        match serde_wasm_bindgen::from_value::<Vec<String>>(value) {
            Ok(names) => Self::new(names),
            Err(err) => {
                tracing::warn!(%err, "window.{WINDOW_GLOBAL} is not a list of names");
                Self::new(fallback.iter().cloned())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains(name)
    }

    /// Names starting with `term`, in catalog order, at most `max_count`.
    pub fn complete(&self, term: &str, max_count: usize) -> Vec<&str> {
        self.names
            .iter()
            .filter(|name| name.starts_with(term))
            .take(max_count)
            .map(String::as_str)
            .collect()
    }
}

pub fn emoji_url(img_dir: &str, name: &str) -> String {
    format!("{}/{}.png", img_dir.trim_end_matches('/'), name)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Emoji(&'a str),
}

impl Segment<'_> {
    pub fn is_emoji(&self) -> bool {
        matches!(self, Segment::Emoji(_))
    }
}

/// Splits `text` around every `:name:` whose name is in the catalog.
/// Unknown shortcodes stay in the surrounding text.
pub fn split_shortcodes<'a>(text: &'a str, catalog: &EmojiCatalog) -> Vec<Segment<'a>> {
    static RE_SHORTCODE: OnceLock<Regex> = OnceLock::new();
    let re = RE_SHORTCODE.get_or_init(|| Regex::new(r":([0-9A-Za-z_+-]+):").unwrap());

    let mut segments = Vec::new();
    let mut emitted = 0;
    let mut search_from = 0;
    while let Some(cap) = re.captures_at(text, search_from) {
        let (Some(whole), Some(name)) = (cap.get(0), cap.get(1)) else {
            break;
        };
        if catalog.contains(name.as_str()) {
            if whole.start() > emitted {
                segments.push(Segment::Text(&text[emitted..whole.start()]));
            }
            segments.push(Segment::Emoji(name.as_str()));
            emitted = whole.end();
            search_from = whole.end();
        } else {
            // The closing colon may open the next shortcode.
            search_from = whole.end() - 1;
        }
    }
    if emitted < text.len() {
        segments.push(Segment::Text(&text[emitted..]));
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> EmojiCatalog {
        EmojiCatalog::new(["smile", "smiley", "smirk", "+1", "-1", "sweat_smile", "sushi"])
    }

    #[test]
    fn completes_by_prefix_in_catalog_order() {
        assert_eq!(catalog().complete("smi", 10), vec!["smile", "smiley", "smirk"]);
        assert_eq!(catalog().complete("+", 10), vec!["+1"]);
    }

    #[test]
    fn unknown_prefix_yields_nothing() {
        assert!(catalog().complete("zzz", 10).is_empty());
    }

    #[test]
    fn caps_candidates() {
        let names: Vec<String> = (0..30).map(|i| format!("face{i}")).collect();
        let catalog = EmojiCatalog::new(names.clone());
        let found = catalog.complete("face", 10);
        assert_eq!(found.len(), 10);
        assert!(found.iter().all(|name| name.starts_with("face") && names.iter().any(|n| n.as_str() == *name)));
    }

    #[test]
    fn empty_term_lists_from_the_start() {
        assert_eq!(catalog().complete("", 2), vec!["smile", "smiley"]);
    }

    #[test]
    fn deduplicates_names() {
        let catalog = EmojiCatalog::new(["smile", "smile", ""]);
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn builds_image_urls() {
        assert_eq!(emoji_url("/img/emoji", "smile"), "/img/emoji/smile.png");
        assert_eq!(emoji_url("/img/emoji/", "+1"), "/img/emoji/+1.png");
    }

    #[test]
    fn splits_known_shortcodes() {
        assert_eq!(
            split_shortcodes("hi :smile: and :sushi:!", &catalog()),
            vec![
                Segment::Text("hi "),
                Segment::Emoji("smile"),
                Segment::Text(" and "),
                Segment::Emoji("sushi"),
                Segment::Text("!"),
            ]
        );
    }

    #[test]
    fn leaves_unknown_shortcodes_as_text() {
        assert_eq!(
            split_shortcodes("at 10:30:00 ok", &catalog()),
            vec![Segment::Text("at 10:30:00 ok")]
        );
    }

    #[test]
    fn shortcodes_next_to_japanese_text() {
        assert_eq!(
            split_shortcodes("今日は:sushi:だ", &catalog()),
            vec![Segment::Text("今日は"), Segment::Emoji("sushi"), Segment::Text("だ")]
        );
    }

    #[test]
    fn closing_colon_of_unknown_code_can_open_a_known_one() {
        assert_eq!(
            split_shortcodes(":nope:smile:", &catalog()),
            vec![Segment::Text(":nope"), Segment::Emoji("smile")]
        );
    }
}
