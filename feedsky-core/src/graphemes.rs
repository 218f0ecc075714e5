//! Grapheme-cluster aware length and slicing helpers.
//!
//! Bluesky counts post length in user-perceived characters. Byte or `char` based slicing
//! both miscount emoji and combining sequences, and can cut a cluster in half.

use unicode_segmentation::UnicodeSegmentation;

/// Number of extended grapheme clusters in `text`.
pub fn grapheme_len(text: &str) -> usize {
    text.graphemes(true).count()
}

/// Longest prefix of `text` holding at most `max` grapheme clusters.
///
/// The returned slice always ends on a cluster boundary.
pub fn truncate_graphemes(text: &str, max: usize) -> &str {
    match text.grapheme_indices(true).nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Longest grapheme-aligned prefix of `text` holding at most `max_chars` chars.
pub fn truncate_chars_aligned(text: &str, max_chars: usize) -> &str {
    let mut end = 0;
    let mut used = 0;
    for (idx, grapheme) in text.grapheme_indices(true) {
        let width = grapheme.chars().count();
        if used + width > max_chars {
            break;
        }
        used += width;
        end = idx + grapheme.len();
    }
    &text[..end]
}

/// Cut `prefix` (a leading slice of `full`) back to a word boundary.
///
/// If the text following the prefix starts with whitespace the prefix already ends on a
/// word boundary and is kept. Otherwise the prefix is cut at its last whitespace. With
/// no whitespace at all the raw cut is returned unchanged.
pub fn back_off_to_word<'a>(full: &str, prefix: &'a str) -> &'a str {
    let rest = &full[prefix.len()..];
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        return prefix;
    }
    match prefix.rfind(char::is_whitespace) {
        Some(idx) => &prefix[..idx],
        None => prefix,
    }
}
