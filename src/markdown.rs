use std::sync::OnceLock;

use pulldown_cmark::{
    CodeBlockKind, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, TextMergeStream,
};
use regex::Regex;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::config::RendererOptions;

/// Prefix for the highlighter's span classes, e.g. `hl-keyword`.
pub const HIGHLIGHT_CLASS_PREFIX: &str = "hl-";

fn pulldown_options(options: &RendererOptions) -> Options {
    let mut out = Options::empty();
    if options.gfm {
        out.insert(Options::ENABLE_STRIKETHROUGH);
        out.insert(Options::ENABLE_TASKLISTS);
    }
    if options.gfm || options.tables {
        out.insert(Options::ENABLE_TABLES);
    }
    if options.smartypants {
        out.insert(Options::ENABLE_SMART_PUNCTUATION);
    }
    out
}

pub fn render_markdown(source: &str, options: &RendererOptions) -> String {
    let parser = TextMergeStream::new(Parser::new_ext(source, pulldown_options(options)));

    let mut events = Vec::new();
    let mut code: Option<(Option<String>, String)> = None;
    // Inside links and image alt text nothing gets linkified.
    let mut link_depth = 0usize;

    for event in parser {
        match event {
            Event::Start(Tag::CodeBlock(kind)) => {
                code = Some((code_language(&kind), String::new()));
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((lang, buffer)) = code.take() {
                    let html = code_block_html(lang.as_deref(), &buffer, options);
                    events.push(Event::Html(html.into()));
                }
            }
            Event::Text(text) => match code.as_mut() {
                Some((_, buffer)) => buffer.push_str(&text),
                None if options.linkify && link_depth == 0 => linkify(text, &mut events),
                None => events.push(Event::Text(text)),
            },
            Event::Start(tag @ (Tag::Link { .. } | Tag::Image { .. })) => {
                link_depth += 1;
                events.push(Event::Start(tag));
            }
            Event::End(end @ (TagEnd::Link | TagEnd::Image)) => {
                link_depth = link_depth.saturating_sub(1);
                events.push(Event::End(end));
            }
            Event::SoftBreak if options.breaks => events.push(Event::HardBreak),
            Event::Html(html) | Event::InlineHtml(html) if !options.allows_html() => {
                events.push(Event::Text(html));
            }
            other => events.push(other),
        }
    }

    let mut html = String::with_capacity(source.len() * 3 / 2);
    pulldown_cmark::html::push_html(&mut html, events.into_iter());
    html
}

fn code_language(kind: &CodeBlockKind<'_>) -> Option<String> {
    match kind {
        CodeBlockKind::Fenced(info) => info
            .split_whitespace()
            .next()
            .filter(|lang| !lang.is_empty())
            .map(str::to_string),
        CodeBlockKind::Indented => None,
    }
}

fn code_block_html(lang: Option<&str>, source: &str, options: &RendererOptions) -> String {
    let Some(lang) = lang else {
        return format!("<pre><code>{}</code></pre>\n", escape_html(source));
    };
    let body = if options.highlight {
        highlight_code(lang, source)
    } else {
        None
    };
    format!(
        "<pre><code class=\"language-{}\">{}</code></pre>\n",
        escape_html(lang),
        body.unwrap_or_else(|| escape_html(source))
    )
}

fn syntax_set() -> &'static SyntaxSet {
    static SYNTAXES: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAXES.get_or_init(SyntaxSet::load_defaults_newlines)
}

/// Highlighted HTML for `source`, or `None` when `lang` is unknown.
pub fn highlight_code(lang: &str, source: &str) -> Option<String> {
    let syntaxes = syntax_set();
    let syntax = syntaxes.find_syntax_by_token(lang)?;
    let mut generator = ClassedHTMLGenerator::new_with_class_style(
        syntax,
        syntaxes,
        ClassStyle::SpacedPrefixed {
            prefix: HIGHLIGHT_CLASS_PREFIX,
        },
    );
    for line in LinesWithEndings::from(source) {
        if let Err(err) = generator.parse_html_for_line_which_includes_newline(line) {
            tracing::debug!(%err, lang, "highlighting failed, falling back to plain code");
            return None;
        }
    }
    Some(generator.finalize())
}

fn linkify<'a>(text: CowStr<'a>, events: &mut Vec<Event<'a>>) {
    static RE_URL: OnceLock<Regex> = OnceLock::new();
    let re = RE_URL.get_or_init(|| Regex::new(r#"https?://[^\s<>"]+"#).unwrap());

    if !re.is_match(&text) {
        events.push(Event::Text(text));
        return;
    }

    let mut last = 0;
    for m in re.find_iter(&text) {
        let url = m
            .as_str()
            .trim_end_matches(|c: char| matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | ')' | '\''));
        if url.len() <= "https://".len() {
            continue;
        }
        if m.start() > last {
            events.push(Event::Text(text[last..m.start()].to_string().into()));
        }
        events.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: url.to_string().into(),
            title: CowStr::Borrowed(""),
            id: CowStr::Borrowed(""),
        }));
        events.push(Event::Text(url.to_string().into()));
        events.push(Event::End(TagEnd::Link));
        last = m.start() + url.len();
    }
    if last < text.len() {
        events.push(Event::Text(text[last..].to_string().into()));
    }
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
