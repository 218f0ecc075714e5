#![doc = "Bluesky publisher: implements the core `Publisher` trait over AT Protocol XRPC."]
//
//! # Bluesky integration (CLI <-> Core)
//!
//! This module wires the [`Publisher`] trait from `feedsky-core` to a Bluesky PDS
//! (`https://bsky.social` by default) using two XRPC procedures:
//!
//! - `com.atproto.server.createSession` to exchange handle + app password for a JWT
//! - `com.atproto.repo.createRecord` to write an `app.bsky.feed.post` record
//!
//! Link facets are sent as `app.bsky.richtext.facet#link` features over the UTF-8 byte
//! ranges computed by the assembler.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use feedsky_core::assemble::PostDraft;
use feedsky_core::contract::{Credentials, PostRef, Publisher, Session};
use feedsky_core::error::PublishError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SERVICE: &str = "https://bsky.social";

const POST_COLLECTION: &str = "app.bsky.feed.post";
const LINK_FEATURE: &str = "app.bsky.richtext.facet#link";

const CONNECT_TIMEOUT_SECS: u64 = 10;
const TOTAL_TIMEOUT_SECS: u64 = 30;

#[derive(Serialize)]
struct CreateSessionRequest<'a> {
    identifier: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateSessionResponse {
    access_jwt: String,
    did: String,
    handle: String,
}

#[derive(Serialize)]
struct CreateRecordRequest<'a> {
    repo: &'a str,
    collection: &'a str,
    record: PostRecord<'a>,
}

#[derive(Deserialize)]
struct CreateRecordResponse {
    uri: String,
    cid: String,
}

/// An `app.bsky.feed.post` record.
#[derive(Serialize)]
pub struct PostRecord<'a> {
    #[serde(rename = "$type")]
    record_type: &'static str,
    text: &'a str,
    #[serde(rename = "createdAt")]
    created_at: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    facets: Vec<FacetRecord<'a>>,
}

#[derive(Serialize)]
struct FacetRecord<'a> {
    index: ByteSlice,
    features: Vec<LinkFeatureRecord<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ByteSlice {
    byte_start: usize,
    byte_end: usize,
}

#[derive(Serialize)]
struct LinkFeatureRecord<'a> {
    #[serde(rename = "$type")]
    feature_type: &'static str,
    uri: &'a str,
}

/// XRPC error body.
#[derive(Deserialize, Default)]
struct XrpcError {
    error: Option<String>,
    message: Option<String>,
}

impl<'a> PostRecord<'a> {
    pub fn new(draft: &'a PostDraft, created_at: DateTime<Utc>) -> Self {
        let facets = draft
            .facets()
            .iter()
            .map(|facet| FacetRecord {
                index: ByteSlice {
                    byte_start: facet.byte_start(),
                    byte_end: facet.byte_end(),
                },
                features: vec![LinkFeatureRecord {
                    feature_type: LINK_FEATURE,
                    uri: facet.uri(),
                }],
            })
            .collect();
        Self {
            record_type: POST_COLLECTION,
            text: draft.text(),
            created_at: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            facets,
        }
    }
}

pub struct BlueskyClient {
    http: reqwest::Client,
    service: String,
}

impl BlueskyClient {
    pub fn new(service: &str) -> Result<Self, PublishError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(TOTAL_TIMEOUT_SECS))
            .build()
            .map_err(|e| PublishError::Http(format!("failed to create HTTP client: {e}")))?;
        let service = service.trim_end_matches('/').to_string();
        tracing::info!(service = %service, "Initialized BlueskyClient");
        Ok(Self { http, service })
    }

    fn endpoint(&self, nsid: &str) -> String {
        format!("{}/xrpc/{}", self.service, nsid)
    }
}

/// Turn a non-success XRPC response into a [`PublishError`].
async fn rejection(response: reqwest::Response) -> PublishError {
    let status = response.status().as_u16();
    let body: XrpcError = response.json().await.unwrap_or_default();
    map_rejection(status, body)
}

/// 401 means bad credentials or an expired token; anything else is a rejection.
fn map_rejection(status: u16, body: XrpcError) -> PublishError {
    let message = match (body.error, body.message) {
        (Some(error), Some(message)) => format!("{error}: {message}"),
        (Some(text), None) | (None, Some(text)) => text,
        (None, None) => "no error details".to_string(),
    };
    if status == 401 {
        PublishError::Auth(message)
    } else {
        PublishError::Rejected { status, message }
    }
}

#[async_trait]
impl Publisher for BlueskyClient {
    async fn create_session(&self, credentials: &Credentials) -> Result<Session, PublishError> {
        tracing::info!(handle = %credentials.handle, "Creating Bluesky session");
        let response = self
            .http
            .post(self.endpoint("com.atproto.server.createSession"))
            .json(&CreateSessionRequest {
                identifier: &credentials.handle,
                password: &credentials.password,
            })
            .send()
            .await
            .map_err(|e| PublishError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let err = rejection(response).await;
            tracing::error!(error = %err, handle = %credentials.handle, "createSession rejected");
            return Err(err);
        }

        let session: CreateSessionResponse = response
            .json()
            .await
            .map_err(|e| PublishError::Decode(e.to_string()))?;
        Ok(Session {
            did: session.did,
            handle: session.handle,
            access_jwt: session.access_jwt,
        })
    }

    async fn create_post(
        &self,
        session: &Session,
        draft: &PostDraft,
    ) -> Result<PostRef, PublishError> {
        let request = CreateRecordRequest {
            repo: &session.did,
            collection: POST_COLLECTION,
            record: PostRecord::new(draft, Utc::now()),
        };
        tracing::info!(
            repo = %session.did,
            bytes = draft.text().len(),
            facets = draft.facets().len(),
            "Submitting post record"
        );

        let response = self
            .http
            .post(self.endpoint("com.atproto.repo.createRecord"))
            .bearer_auth(&session.access_jwt)
            .json(&request)
            .send()
            .await
            .map_err(|e| PublishError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let err = rejection(response).await;
            tracing::error!(error = %err, "createRecord rejected");
            return Err(err);
        }

        let created: CreateRecordResponse = response
            .json()
            .await
            .map_err(|e| PublishError::Decode(e.to_string()))?;
        tracing::info!(uri = %created.uri, cid = %created.cid, "Post record created");
        Ok(PostRef {
            uri: created.uri,
            cid: created.cid,
        })
    }
}
