//! Post assembly: fit an entry into the grapheme budget and mark its link.
//!
//! The finished text is `body + "\n\n" + marker`, where the marker is either the literal
//! URL or a placeholder word (see [`LinkStyle`]). The body is truncated on grapheme
//! boundaries so the whole post stays within [`AssemblerConfig::max_graphemes`], and the
//! marker's position is recorded as a UTF-8 byte range, which is how Bluesky indexes
//! rich-text facets.

use std::ops::Range;

use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::graphemes::{back_off_to_word, grapheme_len, truncate_graphemes};
use crate::snippet::ELLIPSIS;

/// Blank line between title, snippet and link.
pub const SEPARATOR: &str = "\n\n";

/// Bluesky's post length limit in graphemes.
pub const DEFAULT_MAX_GRAPHEMES: usize = 300;

pub const DEFAULT_ICON: &str = "📄";

pub const DEFAULT_PLACEHOLDER: &str = "link";

/// Smallest body (in graphemes) a post may be squeezed down to.
const MIN_BODY_GRAPHEMES: usize = 1;

/// How the link appears in the post text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkStyle {
    /// The post ends with the literal URL, which is also the facet text.
    Url,
    /// The post ends with a fixed word that carries the link facet.
    Placeholder(String),
}

impl LinkStyle {
    /// Parse the `link_style` config value.
    pub fn parse(style: &str, placeholder: Option<&str>) -> Result<Self, ConfigError> {
        match style.trim().to_ascii_lowercase().as_str() {
            "url" => Ok(LinkStyle::Url),
            "placeholder" => {
                let word = placeholder.unwrap_or(DEFAULT_PLACEHOLDER).trim();
                if word.is_empty() {
                    return Err(ConfigError::EmptyPlaceholder);
                }
                Ok(LinkStyle::Placeholder(word.to_string()))
            }
            _ => Err(ConfigError::UnknownLinkStyle(style.to_string())),
        }
    }

    /// Word used when a placeholder is configured or a URL has to be replaced.
    fn placeholder(&self) -> &str {
        match self {
            LinkStyle::Url => DEFAULT_PLACEHOLDER,
            LinkStyle::Placeholder(word) => word,
        }
    }
}

/// Settings for [`assemble`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblerConfig {
    /// Prefix for every post; may be empty.
    pub icon: String,
    pub link_style: LinkStyle,
    /// At most [`DEFAULT_MAX_GRAPHEMES`]; a lower value tightens the budget.
    pub max_graphemes: usize,
}

impl AssemblerConfig {
    /// Reject budgets above the post limit and settings under which no post could
    /// satisfy the budget.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_graphemes > DEFAULT_MAX_GRAPHEMES {
            return Err(ConfigError::BudgetAboveLimit {
                max: self.max_graphemes,
                limit: DEFAULT_MAX_GRAPHEMES,
            });
        }
        let placeholder = self.link_style.placeholder();
        if placeholder.is_empty() {
            return Err(ConfigError::EmptyPlaceholder);
        }
        if body_room(self.max_graphemes, placeholder) < MIN_BODY_GRAPHEMES {
            return Err(ConfigError::BudgetTooSmall {
                max: self.max_graphemes,
                marker: placeholder.to_string(),
            });
        }
        Ok(())
    }
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            icon: DEFAULT_ICON.to_string(),
            link_style: LinkStyle::Url,
            max_graphemes: DEFAULT_MAX_GRAPHEMES,
        }
    }
}

/// Content placed before the link.
#[derive(Debug, Clone, Copy)]
pub enum PostBody<'a> {
    /// A feed entry: title, blank line, snippet.
    Entry { title: &'a str, snippet: &'a str },
    /// A paper: title, authors in parentheses, abstract.
    Paper {
        title: &'a str,
        authors: &'a [String],
        abstract_text: &'a str,
    },
}

impl PostBody<'_> {
    fn render(&self, icon: &str) -> String {
        let title = match self {
            PostBody::Entry { title, .. } | PostBody::Paper { title, .. } => *title,
        };
        let mut body = [icon, title]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ");

        match self {
            PostBody::Entry { snippet, .. } => {
                if !snippet.is_empty() {
                    body.push_str(SEPARATOR);
                    body.push_str(snippet);
                }
            }
            PostBody::Paper {
                authors,
                abstract_text,
                ..
            } => {
                if !authors.is_empty() {
                    body.push_str(" (");
                    body.push_str(&authors.join(", "));
                    body.push(')');
                }
                if !abstract_text.is_empty() {
                    body.push(' ');
                    body.push_str(abstract_text);
                }
            }
        }
        body
    }
}

/// A byte range of the post text that links to `uri`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFacet {
    byte_start: usize,
    byte_end: usize,
    uri: String,
}

impl LinkFacet {
    /// Inclusive start, in UTF-8 bytes.
    pub fn byte_start(&self) -> usize {
        self.byte_start
    }

    /// Exclusive end, in UTF-8 bytes.
    pub fn byte_end(&self) -> usize {
        self.byte_end
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn range(&self) -> Range<usize> {
        self.byte_start..self.byte_end
    }
}

/// Finished post text plus its link facets. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    text: String,
    facets: Vec<LinkFacet>,
}

impl PostDraft {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn facets(&self) -> &[LinkFacet] {
        &self.facets
    }

    /// The slice of the text a facet covers, if its range is valid.
    pub fn facet_text(&self, facet: &LinkFacet) -> Option<&str> {
        self.text.get(facet.range())
    }

    pub fn grapheme_len(&self) -> usize {
        grapheme_len(&self.text)
    }
}

/// Build a post for `body` linking to `link`.
///
/// # Panics
/// If the assembled text exceeds `config.max_graphemes`. That means the budget arithmetic
/// is wrong, not that the input was bad; [`AssemblerConfig::validate`] rules out the only
/// configurations that could trigger it legitimately.
pub fn assemble(config: &AssemblerConfig, body: &PostBody<'_>, link: &str) -> PostDraft {
    let marker = link_marker(config, link);
    let max_body = body_room(config.max_graphemes, marker);

    let body_text = fit_body(body.render(&config.icon), max_body);

    let byte_start = body_text.len() + SEPARATOR.len();
    let byte_end = byte_start + marker.len();

    let mut text = body_text;
    text.push_str(SEPARATOR);
    text.push_str(marker);

    let total = grapheme_len(&text);
    assert!(
        total <= config.max_graphemes,
        "assembled post is {total} graphemes, budget is {}",
        config.max_graphemes
    );

    debug!(
        graphemes = total,
        bytes = text.len(),
        byte_start,
        byte_end,
        "Assembled post"
    );

    PostDraft {
        text,
        facets: vec![LinkFacet {
            byte_start,
            byte_end,
            uri: link.to_string(),
        }],
    }
}

/// Graphemes left for the body once the separator and marker are accounted for.
fn body_room(max_graphemes: usize, marker: &str) -> usize {
    max_graphemes.saturating_sub(grapheme_len(marker) + grapheme_len(SEPARATOR))
}

fn link_marker<'a>(config: &'a AssemblerConfig, link: &'a str) -> &'a str {
    match &config.link_style {
        LinkStyle::Placeholder(word) => word,
        LinkStyle::Url if body_room(config.max_graphemes, link) >= MIN_BODY_GRAPHEMES => link,
        LinkStyle::Url => {
            warn!(
                link,
                max_graphemes = config.max_graphemes,
                "URL too long to embed in post, using placeholder text instead"
            );
            config.link_style.placeholder()
        }
    }
}

/// Truncate `candidate` to at most `max_body` graphemes, ellipsis included.
fn fit_body(candidate: String, max_body: usize) -> String {
    let length = grapheme_len(&candidate);
    if length <= max_body {
        return candidate;
    }

    let prefix = truncate_graphemes(&candidate, max_body.saturating_sub(grapheme_len(ELLIPSIS)));
    let cut = back_off_to_word(&candidate, prefix).trim_end();
    debug!(length, max_body, "Post body over budget, truncated");
    format!("{cut}{ELLIPSIS}")
}
