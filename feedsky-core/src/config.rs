use tracing::{debug, info};

use crate::assemble::{AssemblerConfig, LinkStyle};
use crate::snippet::DEFAULT_SNIPPET_CHARS;

/// Everything the feed pipeline needs for one run, secrets excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishConfig {
    pub feed_url: String,
    pub assembler: AssemblerConfig,
    /// Character budget for the summary snippet.
    pub snippet_chars: usize,
}

impl PublishConfig {
    pub fn new(feed_url: impl Into<String>) -> Self {
        Self {
            feed_url: feed_url.into(),
            assembler: AssemblerConfig::default(),
            snippet_chars: DEFAULT_SNIPPET_CHARS,
        }
    }

    pub fn trace_loaded(&self) {
        let link_style = match &self.assembler.link_style {
            LinkStyle::Url => "url",
            LinkStyle::Placeholder(_) => "placeholder",
        };
        info!(
            feed_url = %self.feed_url,
            link_style,
            max_graphemes = self.assembler.max_graphemes,
            snippet_chars = self.snippet_chars,
            "Loaded PublishConfig"
        );
        debug!(?self, "PublishConfig loaded (full debug)");
    }
}
