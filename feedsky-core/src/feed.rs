//! Feed fetching and entry selection.
//!
//! [`HttpFeedSource`] downloads a feed over HTTP(S) with timeouts and a size cap and hands
//! the body to feed-rs, which understands RSS 0.9x/1.0/2.0, Atom and JSON Feed.

use std::time::Duration;

use async_trait::async_trait;
use feed_rs::parser;
use reqwest::Client;
use tracing::{debug, info};

use crate::contract::{FeedEntry, FeedSource};
use crate::error::FeedError;
use crate::seen::SeenEntries;

/// Connect timeout in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Total timeout in seconds.
const TOTAL_TIMEOUT_SECS: u64 = 30;

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 5;

/// Maximum feed size in bytes (5MB).
pub const MAX_FEED_SIZE: u64 = 5 * 1024 * 1024;

const USER_AGENT: &str = concat!("feedsky/", env!("CARGO_PKG_VERSION"));

/// Feed source backed by a reqwest client.
pub struct HttpFeedSource {
    client: Client,
}

impl HttpFeedSource {
    pub fn new() -> Result<Self, FeedError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(TOTAL_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FeedError::Http(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch_entries(&self, url: &str) -> Result<Vec<FeedEntry>, FeedError> {
        validate_url(url)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FeedError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FeedError::Http(format!("HTTP status {}", response.status())));
        }

        if let Some(content_length) = response.content_length() {
            if content_length > MAX_FEED_SIZE {
                return Err(FeedError::TooLarge {
                    size: content_length,
                    max: MAX_FEED_SIZE,
                });
            }
        }

        let bytes = read_capped(response, MAX_FEED_SIZE).await?;

        let entries = parse_feed(&bytes)?;
        info!(feed_url = url, entries = entries.len(), "Fetched feed");
        Ok(entries)
    }
}

/// Read the body chunk by chunk, giving up as soon as it grows past `max` bytes.
///
/// Content-Length is not trusted; chunked responses carry none.
async fn read_capped(mut response: reqwest::Response, max: u64) -> Result<Vec<u8>, FeedError> {
    let mut body = Vec::new();
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| FeedError::Http(format!("failed to read response: {e}")))?
    {
        body.extend_from_slice(&chunk);
        if body.len() as u64 > max {
            debug!(read = body.len(), max, "Feed body over size cap, aborting download");
            return Err(FeedError::TooLarge {
                size: body.len() as u64,
                max,
            });
        }
    }
    Ok(body)
}

/// Only absolute http(s) URLs are fetched.
pub fn validate_url(url: &str) -> Result<(), FeedError> {
    let parsed = url::Url::parse(url).map_err(|e| FeedError::InvalidUrl(format!("{url}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(FeedError::InvalidUrl(format!(
            "unsupported URL scheme: {scheme}"
        ))),
    }
}

/// Parse a feed document into entries, in document order.
///
/// Entries without any link are dropped since there is nothing to point a post at.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<FeedEntry>, FeedError> {
    let feed = parser::parse(bytes).map_err(|e| FeedError::Parse(e.to_string()))?;

    let entries = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let link = entry
                .links
                .iter()
                .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
                .or_else(|| entry.links.first())
                .map(|l| l.href.clone());
            let Some(link) = link else {
                debug!(entry_id = %entry.id, "Skipping feed entry without a link");
                return None;
            };

            let id = if entry.id.trim().is_empty() {
                link.clone()
            } else {
                entry.id
            };
            let title = entry.title.map(|t| t.content).unwrap_or_default();
            let summary = entry
                .summary
                .map(|t| t.content)
                .or(entry.content.and_then(|c| c.body))
                .unwrap_or_default();

            Some(FeedEntry {
                id,
                title,
                link,
                summary,
                published: entry.published.or(entry.updated),
            })
        })
        .collect();

    Ok(entries)
}

/// The newest entry not yet in `seen`.
///
/// Newest means the latest `published` timestamp; entries without one rank below dated
/// entries, and ties go to the entry earlier in the document (feeds list newest first).
pub fn newest_entry<'a>(entries: &'a [FeedEntry], seen: &SeenEntries) -> Option<&'a FeedEntry> {
    entries
        .iter()
        .filter(|entry| !seen.contains(&entry.id))
        .reduce(|best, entry| {
            if entry.published > best.published {
                entry
            } else {
                best
            }
        })
}
