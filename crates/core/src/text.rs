//! Text normalization shared by the DOM mappers and the citation resolver.

/// Normalizes text read from the DOM.
///
/// Non-breaking spaces become regular spaces, runs of whitespace collapse to
/// a single space and the ends are trimmed. The result never contains a
/// newline, so it can always sit on a single footnote line.
pub fn clean_text(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '\u{a0}')
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Replaces the first occurrence of `needle` in `haystack`.
///
/// Returns the haystack unchanged when the needle is empty or absent.
pub fn replace_first(haystack: &str, needle: &str, replacement: &str) -> String {
    if needle.is_empty() {
        return haystack.to_string();
    }
    haystack.replacen(needle, replacement, 1)
}
