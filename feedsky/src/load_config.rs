//! `load_config` module: loads the optional YAML config file, injects secrets from the
//! environment, and maps both into the core crate's strongly-typed settings.
//!
//! # Responsibilities
//! - Parse the user-supplied YAML file into [`CliConfig`], defaulting every missing key
//! - Map loosely-typed keys (e.g. `link_style: placeholder`) to core enums, with validation
//! - Read `BSKY_HANDLE` / `BSKY_PASSWORD` from the environment
//! - Read paper descriptions for the `paper` subcommand
//!
//! # Errors
//! All errors surface as `anyhow::Error` with enough context for the CLI to print.
//!
//! Example file:
//!
//! ```yaml
//! feed:
//!   url: https://example.com/feed.xml
//! post:
//!   icon: "📄"
//!   link_style: placeholder   # or "url"
//!   placeholder: link
//!   max_graphemes: 300
//!   snippet_chars: 200
//! bluesky:
//!   service: https://bsky.social
//! state:
//!   path: ./posted.json
//! ```

use anyhow::{anyhow, Context, Result};
use feedsky_core::assemble::{
    AssemblerConfig, LinkStyle, DEFAULT_ICON, DEFAULT_MAX_GRAPHEMES,
};
use feedsky_core::config::PublishConfig;
use feedsky_core::contract::{Credentials, Paper};
use feedsky_core::error::CredentialsError;
use feedsky_core::snippet::DEFAULT_SNIPPET_CHARS;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

use crate::bluesky::DEFAULT_SERVICE;

pub const HANDLE_ENV: &str = "BSKY_HANDLE";
pub const PASSWORD_ENV: &str = "BSKY_PASSWORD";

#[derive(Debug, Default, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub feed: FeedSection,
    #[serde(default)]
    pub post: PostSection,
    #[serde(default)]
    pub bluesky: BlueskySection,
    #[serde(default)]
    pub state: StateSection,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedSection {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PostSection {
    pub icon: String,
    pub link_style: String,
    pub placeholder: Option<String>,
    pub max_graphemes: usize,
    pub snippet_chars: usize,
}

impl Default for PostSection {
    fn default() -> Self {
        Self {
            icon: DEFAULT_ICON.to_string(),
            link_style: "url".to_string(),
            placeholder: None,
            max_graphemes: DEFAULT_MAX_GRAPHEMES,
            snippet_chars: DEFAULT_SNIPPET_CHARS,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BlueskySection {
    pub service: String,
}

impl Default for BlueskySection {
    fn default() -> Self {
        Self {
            service: DEFAULT_SERVICE.to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct StateSection {
    /// JSON file recording posted entries across runs. In-memory only when absent.
    pub path: Option<PathBuf>,
}

impl CliConfig {
    pub fn assembler_config(&self) -> Result<AssemblerConfig> {
        let link_style =
            LinkStyle::parse(&self.post.link_style, self.post.placeholder.as_deref())?;
        let assembler = AssemblerConfig {
            icon: self.post.icon.trim().to_string(),
            link_style,
            max_graphemes: self.post.max_graphemes,
        };
        assembler.validate()?;
        Ok(assembler)
    }

    /// Merge the file settings with a `--feed-url` override.
    pub fn publish_config(&self, feed_url_override: Option<&str>) -> Result<PublishConfig> {
        let feed_url = feed_url_override
            .map(str::to_string)
            .or_else(|| self.feed.url.clone())
            .ok_or_else(|| {
                error!("No feed URL in config and none given with --feed-url");
                anyhow!("no feed URL: pass --feed-url or set feed.url in the config file")
            })?;

        Ok(PublishConfig {
            feed_url,
            assembler: self.assembler_config()?,
            snippet_chars: self.post.snippet_chars,
        })
    }
}

/// Loads a static YAML config file (no secrets).
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow!("Failed to read config file {:?}: {}", path_ref, e));
        }
    };

    // An empty file is a valid all-defaults config.
    if config_content.trim().is_empty() {
        return Ok(CliConfig::default());
    }

    match serde_yaml::from_str(&config_content) {
        Ok(conf) => {
            info!(config_path = ?path_ref, "Parsed config YAML successfully");
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            Err(anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

/// Reads the posting account's credentials from the environment.
pub fn load_credentials() -> std::result::Result<Credentials, CredentialsError> {
    let handle = required_env(HANDLE_ENV)?;
    let password = required_env(PASSWORD_ENV)?;
    info!(handle = %handle, "Bluesky credentials found in env");
    Ok(Credentials { handle, password })
}

fn required_env(name: &'static str) -> std::result::Result<String, CredentialsError> {
    match std::env::var(name) {
        Ok(value) if value.trim().is_empty() => {
            error!(var = name, "Credential environment variable is empty");
            Err(CredentialsError::Empty(name))
        }
        Ok(value) => Ok(value.trim().to_string()),
        Err(e) => {
            error!(error = ?e, var = name, "Credential environment variable not set");
            Err(CredentialsError::Missing(name))
        }
    }
}

/// Reads a paper description (`title`, `link`, `abstract`, `authors`) from YAML or JSON.
pub fn load_paper<P: AsRef<Path>>(path: P) -> Result<Paper> {
    let path_ref = path.as_ref();
    let content = fs::read_to_string(path_ref)
        .with_context(|| format!("Failed to read paper file {:?}", path_ref))?;
    let paper: Paper = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse paper file {:?}", path_ref))?;
    info!(title = %paper.title, authors = paper.authors.len(), "Loaded paper description");
    Ok(paper)
}
