// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! YouTube transcripts for queued video URLs.
//!
//! Video URLs arrive through the source item pool. Each one is resolved to a
//! title and channel through oEmbed, a transcript through RapidAPI and the
//! best available thumbnail. Each draft names the pool item it came from; the
//! scheduler removes the item when it commits the draft, so a failed or
//! interrupted run leaves every video queued for the next one.

use std::sync::Arc;

use pressroom_config::model::RapidConfig;
use pressroom_config::SourceConfig;
use pressroom_core::{
    Draft, DraftOrigin, PressroomError, RequestBudget, SourceItem, SourceKind, SourceMetadata,
    StorageAdapter,
};
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::rapid::{RapidClient, ensure_success, request_err};

const KIND: SourceKind = SourceKind::Youtube;
const OEMBED_URL: &str = "https://www.youtube.com/oembed";
const THUMBNAIL_BASE: &str = "https://img.youtube.com/vi";
const THUMBNAIL_OPTIONS: [&str; 4] = [
    "maxresdefault.jpg",
    "hqdefault.jpg",
    "mqdefault.jpg",
    "default.jpg",
];

/// Extract the video id from a youtube.com `?v=` URL or a youtu.be short link.
pub fn video_id(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    match parsed.host_str()? {
        "www.youtube.com" | "youtube.com" | "m.youtube.com" => parsed
            .query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.into_owned())
            .filter(|v| !v.is_empty()),
        "youtu.be" => {
            let id = parsed.path().trim_start_matches('/');
            (!id.is_empty()).then(|| id.to_string())
        }
        _ => None,
    }
}

pub fn is_youtube_url(reference: &str) -> bool {
    video_id(reference).is_some()
}

#[derive(Debug, Deserialize)]
struct OEmbed {
    title: String,
    author_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscriptResponse {
    #[serde(default)]
    transcript: String,
}

pub struct YoutubeSource {
    storage: Arc<dyn StorageAdapter>,
    rapid: RapidClient,
    transcript_endpoint: String,
    oembed_url: String,
    thumbnail_base: String,
}

impl YoutubeSource {
    pub fn new(
        config: &SourceConfig,
        rapid: &RapidConfig,
        storage: Arc<dyn StorageAdapter>,
    ) -> Result<Self, PressroomError> {
        let transcript_endpoint = config
            .endpoint
            .clone()
            .ok_or_else(|| PressroomError::Config("sources.youtube.endpoint is required".into()))?;
        let host = config.host.as_deref().unwrap_or_default();
        Ok(Self {
            storage,
            rapid: RapidClient::new(KIND, rapid, host)?,
            transcript_endpoint,
            oembed_url: OEMBED_URL.to_string(),
            thumbnail_base: THUMBNAIL_BASE.to_string(),
        })
    }

    #[cfg(test)]
    fn with_public_endpoints(mut self, oembed_url: String, thumbnail_base: String) -> Self {
        self.oembed_url = oembed_url;
        self.thumbnail_base = thumbnail_base;
        self
    }

    pub async fn fetch(&self, budget: &RequestBudget) -> Result<Vec<Draft>, PressroomError> {
        let items = self.storage.list_source_items(KIND).await?;
        if items.is_empty() {
            debug!("no queued videos");
            return Ok(Vec::new());
        }

        let mut drafts = Vec::new();
        let mut last_error = None;
        for item in &items {
            let Some(id) = video_id(&item.reference) else {
                warn!(reference = %item.reference, "not a YouTube URL, skipping");
                continue;
            };
            match self.process(budget, item, &id).await {
                Ok(draft) => drafts.push(draft.with_origin(DraftOrigin::PoolItem(item.id))),
                Err(e @ PressroomError::QuotaExhausted { .. }) => {
                    info!(reference = %item.reference, "request limit reached, rest stays queued");
                    last_error = Some(e);
                    break;
                }
                Err(e) => {
                    warn!(reference = %item.reference, error = %e, "video kept in pool for retry");
                    last_error = Some(e);
                }
            }
        }

        info!(queued = items.len(), produced = drafts.len(), "youtube pool processed");
        match last_error {
            Some(e) if drafts.is_empty() => Err(e),
            _ => Ok(drafts),
        }
    }

    async fn process(
        &self,
        budget: &RequestBudget,
        item: &SourceItem,
        id: &str,
    ) -> Result<Draft, PressroomError> {
        let meta = self.metadata(&item.reference).await?;
        let transcript = self.transcript(budget, &item.reference).await?;
        if transcript.trim().is_empty() {
            return Err(PressroomError::source_failure(KIND, "empty transcript"));
        }

        let mut metadata = SourceMetadata::new(KIND, transcript);
        metadata.title = Some(meta.title);
        metadata.author = meta.author_name;
        metadata.created_at = Some(item.added_at.clone());
        metadata.link = Some(item.reference.clone());

        let mut draft = Draft::new(metadata);
        draft.image = self.thumbnail(id).await;
        Ok(draft)
    }

    async fn metadata(&self, url: &str) -> Result<OEmbed, PressroomError> {
        let endpoint = Url::parse_with_params(&self.oembed_url, &[("url", url), ("format", "json")])
            .map_err(|e| PressroomError::source_failure(KIND, format!("invalid oEmbed URL: {e}")))?;
        let response = self
            .rapid
            .http()
            .get(endpoint)
            .send()
            .await
            .map_err(request_err(KIND, "oEmbed request failed"))?;
        ensure_success(KIND, response)
            .await?
            .json()
            .await
            .map_err(request_err(KIND, "failed to parse oEmbed response"))
    }

    async fn transcript(&self, budget: &RequestBudget, url: &str) -> Result<String, PressroomError> {
        let response: TranscriptResponse = self
            .rapid
            .get_json(budget, &self.transcript_endpoint, &[("url", url), ("flat_text", "true")])
            .await?;
        debug!(chars = response.transcript.len(), "transcript retrieved");
        Ok(response.transcript)
    }

    /// First thumbnail that downloads, best quality first.
    async fn thumbnail(&self, id: &str) -> Option<Vec<u8>> {
        for option in THUMBNAIL_OPTIONS {
            let url = format!("{}/{id}/{option}", self.thumbnail_base);
            match self.rapid.http().get(&url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    if let Ok(bytes) = resp.bytes().await {
                        debug!(video = %id, quality = option, "thumbnail downloaded");
                        return Some(bytes.to_vec());
                    }
                }
                Ok(resp) => debug!(video = %id, quality = option, status = %resp.status(), "thumbnail unavailable"),
                Err(e) => debug!(video = %id, quality = option, error = %e, "thumbnail request failed"),
            }
        }
        None
    }
}
