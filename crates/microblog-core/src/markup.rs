//! Post markup
//!
//! Turns raw post text into HTML that is safe to embed in a page:
//! escaping, linkifying the first URL, and turning hashtags into links
//! to a tag query.

use std::sync::OnceLock;

use regex::{Captures, Regex};

/// Path that tag links point at; the tag goes in the `tag` query parameter
pub const TAG_QUERY_PATH: &str = "/index";

fn url_pattern() -> &'static Regex {
    static URL: OnceLock<Regex> = OnceLock::new();
    URL.get_or_init(|| Regex::new(r"https?://\S+").expect("URL pattern is valid"))
}

fn tag_pattern() -> &'static Regex {
    static TAG: OnceLock<Regex> = OnceLock::new();
    TAG.get_or_init(|| Regex::new(r" #(\S+)").expect("tag pattern is valid"))
}

/// Result of rendering post text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub html: String,
    pub tags: Vec<String>,
}

/// Render raw post text
///
/// 1. Escape `&`, `<` and `>` (ampersands first).
/// 2. Wrap the first `http://` or `https://` URL in an anchor. Only the
///    first URL is linked.
/// 3. Wrap every ` #tag` in an anchor to the tag query and collect the
///    tag names in order of appearance.
///
/// Tag names are taken from the escaped text, so a tag written as `#a&b`
/// is recorded as `a&amp;b`.
pub fn render(raw: &str) -> Rendered {
    let escaped = escape_html(raw);
    let linked = linkify_first_url(&escaped);

    let mut tags = Vec::new();
    let html = tag_pattern()
        .replace_all(&linked, |caps: &Captures| {
            let name = &caps[1];
            tags.push(name.to_string());
            format!(
                " <a href=\"{}?tag={}\">#{}</a>",
                TAG_QUERY_PATH,
                encode_uri_component(name),
                name
            )
        })
        .into_owned();

    Rendered { html, tags }
}

/// Escape the characters that would start markup
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn linkify_first_url(text: &str) -> String {
    url_pattern()
        .replace(text, |caps: &Captures| {
            let url = &caps[0];
            format!("<a href=\"{}\">{}</a>", url.replace('"', "&quot;"), url)
        })
        .into_owned()
}

/// Percent-encode a query value the way browsers' `encodeURIComponent` does
pub fn encode_uri_component(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
