//! Error types for feedsky-core.

use thiserror::Error;

/// Failure to obtain entries from a feed.
#[derive(Error, Debug)]
pub enum FeedError {
    /// The feed URL could not be parsed or uses an unsupported scheme.
    #[error("invalid feed URL: {0}")]
    InvalidUrl(String),

    /// Transport-level failure or non-success HTTP status.
    #[error("failed to fetch feed: {0}")]
    Http(String),

    /// The response body exceeded the size cap.
    #[error("feed too large: {size} bytes (max {max} bytes)")]
    TooLarge { size: u64, max: u64 },

    /// The body was not a feed document feed-rs understands.
    #[error("failed to parse feed: {0}")]
    Parse(String),
}

/// Failure to log in or to submit a post.
///
/// Transient and permanent failures are not distinguished; the pipeline reports
/// every variant the same way.
#[derive(Error, Debug)]
pub enum PublishError {
    /// The service rejected the credentials.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Transport-level failure talking to the service.
    #[error("request failed: {0}")]
    Http(String),

    /// The service answered with a non-success status.
    #[error("service rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The service answered with a body we could not decode.
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// A required credential is absent from the environment.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("environment variable {0} is not set")]
    Missing(&'static str),

    #[error("environment variable {0} is empty")]
    Empty(&'static str),
}

/// Failure reading or writing the posted-entry state file.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("state file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("state file is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),

    #[error("failed to persist state file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Invalid post-assembly settings.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("max_graphemes {max} leaves no room for a body next to the link marker {marker:?}")]
    BudgetTooSmall { max: usize, marker: String },

    #[error("max_graphemes {max} exceeds the Bluesky post limit of {limit} graphemes")]
    BudgetAboveLimit { max: usize, limit: usize },

    #[error("placeholder link text must not be empty")]
    EmptyPlaceholder,

    #[error("unknown link_style {0:?} (expected \"url\" or \"placeholder\")")]
    UnknownLinkStyle(String),
}
