//! High-level pipeline: orchestrates fetch → select → sanitize → assemble → submit.
//!
//! One invocation posts at most one entry. The steps are:
//!   - Fetch the configured feed through a [`FeedSource`]
//!   - Pick the newest entry not yet recorded in [`SeenEntries`]
//!   - Sanitize its title and summary, cut the summary down to a snippet
//!   - Assemble a [`PostDraft`] within the grapheme budget
//!   - Log in and submit through a [`Publisher`], unless this is a dry run
//!
//! # Error Handling
//! Failures past configuration are reported, not raised: a feed that cannot be fetched
//! ends the run as [`PublishReport::NoEntries`], and a failed login or submission ends it
//! as [`PublishReport::SubmitFailed`]. Nothing is retried.
//!
//! # Navigation
//! - Feed entrypoint: [`publish_latest`]
//! - Paper entrypoint: [`publish_paper`]

use tracing::{error, info, warn};

use crate::assemble::{assemble, AssemblerConfig, PostBody, PostDraft};
use crate::config::PublishConfig;
use crate::contract::{Credentials, FeedSource, Paper, Publisher};
use crate::feed::newest_entry;
use crate::sanitize::Sanitizer;
use crate::seen::SeenEntries;
use crate::snippet::extract_snippet;

/// Whether a run submits its post.
#[derive(Debug, Clone, Copy)]
pub enum Delivery<'a> {
    /// Assemble and report the draft; no login, no submission.
    DryRun,
    /// Log in with these credentials and submit.
    Submit(&'a Credentials),
}

/// Outcome of one run.
#[derive(Debug)]
pub enum PublishReport {
    Posted { entry_id: String, uri: String },
    DryRun { entry_id: String, draft: PostDraft },
    /// The feed could not be fetched or had no usable entries.
    NoEntries,
    /// Every entry in the feed was posted by an earlier run.
    AlreadySeen,
    /// Login or submission failed; the error has been logged.
    SubmitFailed { entry_id: String, reason: String },
}

/// Post the newest unseen entry of the configured feed.
pub async fn publish_latest<F, P>(
    config: &PublishConfig,
    feed: &F,
    publisher: &P,
    sanitizer: &dyn Sanitizer,
    delivery: Delivery<'_>,
    seen: &mut SeenEntries,
) -> PublishReport
where
    F: FeedSource + ?Sized,
    P: Publisher + ?Sized,
{
    info!(feed_url = %config.feed_url, "Fetching feed");
    let entries = match feed.fetch_entries(&config.feed_url).await {
        Ok(entries) => entries,
        Err(e) => {
            error!(feed_url = %config.feed_url, error = %e, "Feed fetch failed, treating as empty");
            return PublishReport::NoEntries;
        }
    };

    if entries.is_empty() {
        info!(feed_url = %config.feed_url, "Feed has no entries, nothing to post");
        return PublishReport::NoEntries;
    }

    let Some(entry) = newest_entry(&entries, seen) else {
        info!(
            entries = entries.len(),
            "All feed entries have already been posted"
        );
        return PublishReport::AlreadySeen;
    };
    info!(entry_id = %entry.id, title = %entry.title, link = %entry.link, "Selected entry");

    let title = sanitizer.sanitize(&entry.title);
    let summary = sanitizer.sanitize(&entry.summary);
    let snippet = extract_snippet(&summary, config.snippet_chars);
    let draft = assemble(
        &config.assembler,
        &PostBody::Entry {
            title: &title,
            snippet: &snippet,
        },
        &entry.link,
    );

    let report = deliver(publisher, delivery, &entry.id, draft).await;

    if let PublishReport::Posted { entry_id, .. } = &report {
        seen.mark(entry_id);
        if let Err(e) = seen.persist() {
            warn!(error = %e, entry_id = %entry_id, "Posted, but failed to record entry as posted");
        }
    }
    report
}

/// Post an announcement for a paper.
pub async fn publish_paper<P>(
    config: &AssemblerConfig,
    paper: &Paper,
    publisher: &P,
    sanitizer: &dyn Sanitizer,
    delivery: Delivery<'_>,
) -> PublishReport
where
    P: Publisher + ?Sized,
{
    info!(title = %paper.title, link = %paper.link, "Preparing paper announcement");

    let title = sanitizer.sanitize(&paper.title);
    let authors: Vec<String> = paper
        .authors
        .iter()
        .map(|a| sanitizer.sanitize(a))
        .filter(|a| !a.is_empty())
        .collect();
    let abstract_text = sanitizer.sanitize(&paper.abstract_text);

    let draft = assemble(
        config,
        &PostBody::Paper {
            title: &title,
            authors: &authors,
            abstract_text: &abstract_text,
        },
        &paper.link,
    );

    deliver(publisher, delivery, &paper.link, draft).await
}

async fn deliver<P>(
    publisher: &P,
    delivery: Delivery<'_>,
    entry_id: &str,
    draft: PostDraft,
) -> PublishReport
where
    P: Publisher + ?Sized,
{
    let credentials = match delivery {
        Delivery::DryRun => {
            info!(entry_id, graphemes = draft.grapheme_len(), "Dry run, not submitting");
            return PublishReport::DryRun {
                entry_id: entry_id.to_string(),
                draft,
            };
        }
        Delivery::Submit(credentials) => credentials,
    };

    let session = match publisher.create_session(credentials).await {
        Ok(session) => {
            info!(handle = %session.handle, did = %session.did, "Logged in");
            session
        }
        Err(e) => {
            error!(handle = %credentials.handle, error = %e, "Login failed");
            return PublishReport::SubmitFailed {
                entry_id: entry_id.to_string(),
                reason: e.to_string(),
            };
        }
    };

    match publisher.create_post(&session, &draft).await {
        Ok(post) => {
            info!(entry_id, uri = %post.uri, "Posted entry");
            PublishReport::Posted {
                entry_id: entry_id.to_string(),
                uri: post.uri,
            }
        }
        Err(e) => {
            error!(entry_id, error = %e, "Post submission failed");
            PublishReport::SubmitFailed {
                entry_id: entry_id.to_string(),
                reason: e.to_string(),
            }
        }
    }
}
