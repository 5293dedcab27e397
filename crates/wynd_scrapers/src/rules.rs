use regex::Regex;

/// Slice of `text` spanning `before` bytes behind and `after` bytes past
/// `center`, clamped to char boundaries so multi-byte content never splits.
///
/// Extraction attributes dates, authors and thumbnails to a link purely by
/// proximity inside this window; overlapping cards can mis-attribute, which
/// is an accepted precision limit of the approach.
pub fn window(text: &str, center: usize, before: usize, after: usize) -> &str {
    let start = floor_char_boundary(text, center.saturating_sub(before));
    let end = floor_char_boundary(text, center.saturating_add(after).min(text.len()));
    &text[start..end.max(start)]
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Ordered-priority evaluator: the first pattern whose group 1 captures wins.
/// Later patterns are never consulted once one matches.
pub fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
    first_capture_indexed(patterns, text).map(|(_, capture)| capture)
}

/// Like [`first_capture`], also reporting which pattern matched so callers
/// can post-process per pattern.
pub fn first_capture_indexed(patterns: &[Regex], text: &str) -> Option<(usize, String)> {
    patterns.iter().enumerate().find_map(|(index, pattern)| {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| (index, m.as_str().trim().to_string()))
    })
}
