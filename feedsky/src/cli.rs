//! CLI glue for feedsky: argument parsing, wiring concrete clients into the core
//! pipeline, and turning the run report into user-visible output.
//!
//! All business logic lives in `feedsky-core`. Call [`run`] with a constructed [`Cli`]
//! for programmatic use and integration tests.

use crate::bluesky::BlueskyClient;
use crate::load_config::{load_config, load_credentials, load_paper, CliConfig};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use feedsky_core::contract::Credentials;
use feedsky_core::feed::HttpFeedSource;
use feedsky_core::publish::{publish_latest, publish_paper, Delivery, PublishReport};
use feedsky_core::sanitize::TagStripSanitizer;
use feedsky_core::seen::SeenEntries;
use std::path::{Path, PathBuf};

/// CLI for feedsky: post feed entries to Bluesky.
#[derive(Parser)]
#[clap(
    name = "feedsky",
    version,
    about = "Post the newest entry of an RSS/Atom feed to Bluesky"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Post the newest entry of a feed that has not been posted yet
    Post {
        /// Path to the YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
        /// RSS/Atom feed URL, overrides feed.url from the config
        #[clap(long)]
        feed_url: Option<String>,
        /// Assemble and print the post without logging in or submitting
        #[clap(long)]
        dry_run: bool,
    },
    /// Announce a paper described in a YAML or JSON file
    Paper {
        /// File with title, link, abstract and authors
        #[clap(long)]
        paper: PathBuf,
        /// Path to the YAML config file
        #[clap(long)]
        config: Option<PathBuf>,
        /// Assemble and print the post without logging in or submitting
        #[clap(long)]
        dry_run: bool,
    },
}

/// Async CLI entrypoint for integration tests and main().
///
/// Returns an error only for configuration and credential problems; feed and submission
/// failures are logged by the pipeline and end the run normally.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Post {
            config,
            feed_url,
            dry_run,
        } => {
            let cli_config = read_config(config.as_deref())?;
            let publish_config = cli_config.publish_config(feed_url.as_deref())?;
            publish_config.trace_loaded();

            let credentials = credentials_unless_dry_run(dry_run)?;
            let delivery = delivery_for(credentials.as_ref());

            let mut seen = match &cli_config.state.path {
                Some(path) => SeenEntries::load(path)
                    .with_context(|| format!("Failed to load state file {:?}", path))?,
                None => SeenEntries::in_memory(),
            };

            let feed = HttpFeedSource::new()?;
            let publisher = BlueskyClient::new(&cli_config.bluesky.service)?;
            tracing::info!(command = "post", dry_run, "Starting publish run");
            let report = publish_latest(
                &publish_config,
                &feed,
                &publisher,
                &TagStripSanitizer::new(),
                delivery,
                &mut seen,
            )
            .await;
            print_report(&report);
            Ok(())
        }
        Commands::Paper {
            paper,
            config,
            dry_run,
        } => {
            let cli_config = read_config(config.as_deref())?;
            let assembler = cli_config.assembler_config()?;
            let paper = load_paper(&paper)?;

            let credentials = credentials_unless_dry_run(dry_run)?;
            let delivery = delivery_for(credentials.as_ref());

            let publisher = BlueskyClient::new(&cli_config.bluesky.service)?;
            tracing::info!(command = "paper", dry_run, "Starting paper announcement");
            let report = publish_paper(
                &assembler,
                &paper,
                &publisher,
                &TagStripSanitizer::new(),
                delivery,
            )
            .await;
            print_report(&report);
            Ok(())
        }
    }
}

fn read_config(path: Option<&Path>) -> Result<CliConfig> {
    match path {
        Some(path) => load_config(path),
        None => {
            tracing::info!("No config file given, using defaults");
            Ok(CliConfig::default())
        }
    }
}

fn credentials_unless_dry_run(dry_run: bool) -> Result<Option<Credentials>> {
    if dry_run {
        return Ok(None);
    }
    match load_credentials() {
        Ok(credentials) => Ok(Some(credentials)),
        Err(e) => {
            tracing::error!(error = %e, "Missing Bluesky credentials, aborting before any network call");
            Err(anyhow::Error::new(e).context("Bluesky credentials are required unless --dry-run is set"))
        }
    }
}

fn delivery_for(credentials: Option<&Credentials>) -> Delivery<'_> {
    match credentials {
        Some(credentials) => Delivery::Submit(credentials),
        None => Delivery::DryRun,
    }
}

fn print_report(report: &PublishReport) {
    match report {
        PublishReport::DryRun { draft, .. } => {
            println!("{}", draft.text());
            for facet in draft.facets() {
                println!(
                    "[link facet: bytes {}..{} -> {}]",
                    facet.byte_start(),
                    facet.byte_end(),
                    facet.uri()
                );
            }
        }
        PublishReport::Posted { entry_id, uri } => {
            tracing::info!(entry_id = %entry_id, uri = %uri, "Run complete: posted");
        }
        PublishReport::NoEntries => tracing::info!("Run complete: no entries to post"),
        PublishReport::AlreadySeen => tracing::info!("Run complete: nothing new to post"),
        PublishReport::SubmitFailed { entry_id, reason } => {
            tracing::warn!(entry_id = %entry_id, reason = %reason, "Run complete: submission failed");
        }
    }
}
