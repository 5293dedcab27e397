use lazy_static::lazy_static;
use regex::Regex;

/// Display cap for card descriptions.
pub const DESCRIPTION_MAX_CHARS: usize = 150;

lazy_static! {
    static ref TAG: Regex = Regex::new(r"<[^>]+>").unwrap();
}

/// First `max` characters plus an ellipsis marker when the input is longer.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(max).collect();
    clipped.push_str("...");
    clipped
}

/// Clips a description to the standard display length.
pub fn clip_description(text: &str) -> String {
    truncate_chars(text, DESCRIPTION_MAX_CHARS)
}

/// Removes markup tags, leaving only text content.
pub fn strip_tags(text: &str) -> String {
    TAG.replace_all(text, "").to_string()
}

/// Decodes the entity set scraped markup actually uses.
pub fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}

/// Escapes text for interpolation into generated HTML.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
