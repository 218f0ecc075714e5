#![doc = "feedsky-core: core logic library for feedsky."]

//! This crate contains all business logic for feedsky: turning the newest entry of an
//! RSS/Atom feed into a Bluesky post whose text fits the platform's grapheme budget and
//! whose link is marked with a byte-range facet.
//!
//! # Usage
//! The CLI crate wires a concrete [`contract::Publisher`] into [`publish::publish_latest`];
//! everything else (sanitizing, snippet extraction, assembly, feed parsing) lives here.

pub mod assemble;
pub mod config;
pub mod contract;
pub mod error;
pub mod feed;
pub mod graphemes;
pub mod publish;
pub mod sanitize;
pub mod seen;
pub mod snippet;
