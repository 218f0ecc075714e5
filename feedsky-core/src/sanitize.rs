//! Plain-text extraction from feed markup.
//!
//! Feed titles and summaries frequently carry HTML. [`Sanitizer`] is the seam for turning
//! that into postable text; [`TagStripSanitizer`] is the default regex-based
//! implementation. A real HTML parser can be dropped in behind the same trait.

use regex::{Captures, Regex};

/// Capability for turning feed markup into plain text.
pub trait Sanitizer: Send + Sync {
    /// Strip markup, decode entities, normalize whitespace, trim.
    fn sanitize(&self, raw: &str) -> String;
}

/// Regex tag stripper with HTML entity decoding.
///
/// Best effort only: a stray `<` that never closes is left in the output.
pub struct TagStripSanitizer {
    break_tag: Regex,
    tag: Regex,
    entity: Regex,
    whitespace: Regex,
}

impl TagStripSanitizer {
    pub fn new() -> Self {
        Self {
            break_tag: Regex::new(
                r"(?i)<\s*(?:br|hr|/p|/div|/li|/h[1-6]|/blockquote|/tr|/td)\b[^<>]*>",
            )
            .expect("break tag pattern is valid"),
            tag: Regex::new(r"<[a-zA-Z/!?][^<>]*>").expect("tag pattern is valid"),
            entity: Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z][a-zA-Z0-9]{1,31});")
                .expect("entity pattern is valid"),
            whitespace: Regex::new(r"\s+").expect("whitespace pattern is valid"),
        }
    }
}

impl Default for TagStripSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sanitizer for TagStripSanitizer {
    fn sanitize(&self, raw: &str) -> String {
        let spaced = self.break_tag.replace_all(raw, " ");
        let stripped = self.tag.replace_all(&spaced, "");
        let decoded = self.entity.replace_all(&stripped, |caps: &Captures<'_>| {
            decode_entity(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        });
        // \s matches U+00A0, so non-breaking spaces collapse into plain spaces here
        self.whitespace.replace_all(&decoded, " ").trim().to_string()
    }
}

/// Decode the body of an entity reference (the part between `&` and `;`).
fn decode_entity(entity: &str) -> Option<String> {
    if let Some(numeric) = entity.strip_prefix('#') {
        let code = match numeric.strip_prefix(|c: char| c == 'x' || c == 'X') {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse().ok()?,
        };
        return char::from_u32(code).map(|c| match c {
            '\u{a0}' => " ".to_string(),
            other => other.to_string(),
        });
    }

    let decoded = match entity {
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        "apos" => "'",
        "nbsp" => " ",
        "hellip" => "…",
        "mdash" => "—",
        "ndash" => "–",
        "lsquo" => "‘",
        "rsquo" => "’",
        "ldquo" => "“",
        "rdquo" => "”",
        _ => return None,
    };
    Some(decoded.to_string())
}
