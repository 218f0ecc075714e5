//! Snippet extraction: a word-safe, character-budgeted prefix of an entry summary.

use crate::graphemes::{back_off_to_word, truncate_chars_aligned};
use tracing::debug;

/// Default snippet budget in characters.
pub const DEFAULT_SNIPPET_CHARS: usize = 200;

/// Marker appended to any truncated text.
pub const ELLIPSIS: &str = "…";

/// Shorten sanitized summary text to at most `budget_chars` characters plus [`ELLIPSIS`].
///
/// Text within budget is returned unchanged. Longer text is cut on a grapheme boundary,
/// backed off to the last whitespace so no word is split, and suffixed with the ellipsis.
/// A single token longer than the budget has no word boundary to back off to and is cut
/// raw.
pub fn extract_snippet(text: &str, budget_chars: usize) -> String {
    if text.chars().count() <= budget_chars {
        return text.to_string();
    }

    let window = truncate_chars_aligned(text, budget_chars);
    let cut = back_off_to_word(text, window).trim_end();
    debug!(
        budget_chars,
        kept_chars = cut.chars().count(),
        "Summary exceeded snippet budget, truncated"
    );
    format!("{cut}{ELLIPSIS}")
}
