use regex::Regex;
use std::sync::OnceLock;

use crate::config::KeyBinding;

/// The `:fragment` span immediately before the caret.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TriggerMatch {
    /// Byte offset of the colon.
    pub start: usize,
    /// Byte offset of the caret.
    pub end: usize,
    pub term: String,
}

/// Finds a shortcode trigger ending at the end of `before_caret`.
/// Word characters are ASCII only: `今日は:smi` triggers, `x :日本` does not.
pub fn find_trigger(before_caret: &str) -> Option<TriggerMatch> {
    static RE_TRIGGER: OnceLock<Regex> = OnceLock::new();
    let re = RE_TRIGGER.get_or_init(|| Regex::new(r":([-+0-9A-Za-z_]*)$").unwrap());

    let cap = re.captures(before_caret)?;
    let whole = cap.get(0)?;
    let preceding = before_caret[..whole.start()].chars().next_back();
    if preceding.is_some_and(is_ascii_word) {
        return None;
    }
    let term = cap.get(1).map(|m| m.as_str()).unwrap_or_default();
    Some(TriggerMatch {
        start: whole.start(),
        end: whole.end(),
        term: term.to_string(),
    })
}

fn is_ascii_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

pub fn replacement(name: &str) -> String {
    format!(":{name}: ")
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextChange {
    pub start: usize,
    pub end: usize,
    pub insert: String,
}

impl TextChange {
    pub fn new(start: usize, end: usize, insert: impl Into<String>) -> Self {
        Self {
            start,
            end,
            insert: insert.into(),
        }
    }

    pub fn apply(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() - (self.end - self.start) + self.insert.len());
        out.push_str(&text[..self.start]);
        out.push_str(&self.insert);
        out.push_str(&text[self.end..]);
        out
    }

    pub fn caret_after(&self) -> usize {
        self.start + self.insert.len()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Completed {
    pub text: String,
    pub caret: usize,
}

/// The edit that accepts `name` for the trigger ending at `caret`.
pub fn completion_change(text: &str, caret: usize, name: &str) -> Option<TextChange> {
    let caret = floor_char_boundary(text, caret.min(text.len()));
    let trigger = find_trigger(&text[..caret])?;
    Some(TextChange::new(trigger.start, trigger.end, replacement(name)))
}

pub fn apply_completion(text: &str, caret: usize, name: &str) -> Option<Completed> {
    let change = completion_change(text, caret, name)?;
    Some(Completed {
        text: change.apply(text),
        caret: change.caret_after(),
    })
}

fn floor_char_boundary(text: &str, mut pos: usize) -> usize {
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}

/// Converts a DOM selection offset (UTF-16 code units) into a byte offset.
pub fn utf16_to_byte(text: &str, utf16: usize) -> usize {
    let mut units = 0;
    for (byte, ch) in text.char_indices() {
        if units >= utf16 {
            return byte;
        }
        units += ch.len_utf16();
    }
    text.len()
}

pub fn byte_to_utf16(text: &str, byte: usize) -> usize {
    let byte = floor_char_boundary(text, byte.min(text.len()));
    text[..byte].encode_utf16().count()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyCommand {
    Up,
    Down,
    Accept,
    Close,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyStroke {
    pub key: String,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyStroke {
    pub fn from_event(event: &web_sys::KeyboardEvent) -> Self {
        Self {
            key: event.key(),
            ctrl: event.ctrl_key(),
            shift: event.shift_key(),
            alt: event.alt_key(),
            meta: event.meta_key(),
        }
    }

    pub fn matches(&self, binding: &KeyBinding) -> bool {
        self.key.eq_ignore_ascii_case(&binding.key)
            && self.ctrl == binding.ctrl
            && self.shift == binding.shift
            && self.alt == binding.alt
            && self.meta == binding.meta
    }
}

/// Maps a key press to a popup command while suggestions are shown.
pub fn key_command(stroke: &KeyStroke, accept_key: &KeyBinding) -> Option<KeyCommand> {
    if stroke.matches(accept_key) {
        return Some(KeyCommand::Accept);
    }
    let plain = !stroke.ctrl && !stroke.alt && !stroke.meta;
    match stroke.key.as_str() {
        "ArrowUp" if plain => Some(KeyCommand::Up),
        "ArrowDown" if plain => Some(KeyCommand::Down),
        "p" if stroke.ctrl && !stroke.alt && !stroke.meta => Some(KeyCommand::Up),
        "n" if stroke.ctrl && !stroke.alt && !stroke.meta => Some(KeyCommand::Down),
        "Enter" | "Tab" if plain && !stroke.shift => Some(KeyCommand::Accept),
        "Escape" => Some(KeyCommand::Close),
        _ => None,
    }
}

/// Moves the highlighted row by `delta`, wrapping at both ends.
pub fn step_index(current: usize, len: usize, delta: isize) -> usize {
    if len == 0 {
        return 0;
    }
    (current as isize + delta).rem_euclid(len as isize) as usize
}
