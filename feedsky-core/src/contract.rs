//! # contract: seams between the pipeline and the outside world
//!
//! This module defines the two traits the publish pipeline depends on, plus the plain
//! data types that cross them:
//!
//! - [`FeedSource`] yields the entries of a feed (HTTP in production, mocks in tests).
//! - [`Publisher`] logs in to the social network and submits a finished [`PostDraft`].
//!
//! ## Mocking & Testing
//! Both traits are annotated for `mockall`, so tests get `MockFeedSource` and
//! `MockPublisher` with the `test-export-mocks` feature (on by default).

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use serde::Deserialize;

use crate::assemble::PostDraft;
use crate::error::{FeedError, PublishError};

/// One entry of a fetched feed. Read-only input to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    /// Stable identifier (guid/id, falling back to the link).
    pub id: String,
    pub title: String,
    /// Absolute URI of the entry.
    pub link: String,
    /// Summary or description, possibly HTML.
    pub summary: String,
    /// Publication time, falling back to the updated time.
    pub published: Option<DateTime<Utc>>,
}

/// An academic paper announced directly rather than through a feed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Paper {
    pub title: String,
    pub link: String,
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    #[serde(default)]
    pub authors: Vec<String>,
}

/// Login identifier and app password for the posting account.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub handle: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("handle", &self.handle)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An authenticated session returned by [`Publisher::create_session`].
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub did: String,
    pub handle: String,
    pub access_jwt: String,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("did", &self.did)
            .field("handle", &self.handle)
            .field("access_jwt", &"<redacted>")
            .finish()
    }
}

/// Reference to a created post record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRef {
    pub uri: String,
    pub cid: String,
}

/// Trait for fetching the entries of a feed.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch and parse the feed at `url`, returning its entries in document order.
    async fn fetch_entries(&self, url: &str) -> Result<Vec<FeedEntry>, FeedError>;
}

/// Trait for authenticating against and posting to the social network.
///
/// The implementor owns transport and wire format; the pipeline only sees drafts in and
/// references out.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Log in with the given credentials.
    async fn create_session(&self, credentials: &Credentials) -> Result<Session, PublishError>;

    /// Submit a finished draft as a new post.
    async fn create_post(&self, session: &Session, draft: &PostDraft)
        -> Result<PostRef, PublishError>;
}
