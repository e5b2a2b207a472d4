// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! arXiv Atom API source.
//!
//! Queries recently updated papers in the configured categories, sorted by
//! relevance, and turns each entry's abstract into a draft.

use std::time::Duration;

use chrono::{DateTime, Utc};
use feed_rs::parser;
use pressroom_config::SourceConfig;
use pressroom_core::{
    Draft, PressroomError, RequestBudget, SourceKind, SourceMetadata, SourceScheduleRecord,
};
use tracing::{debug, info};

use crate::rapid::{ensure_success, http_client, request_err};

const DEFAULT_ENDPOINT: &str = "http://export.arxiv.org/api/query";

pub struct ArxivSource {
    client: reqwest::Client,
    endpoint: String,
    topics: Vec<String>,
    max_results: usize,
}

impl ArxivSource {
    pub fn new(config: &SourceConfig, timeout: Duration) -> Result<Self, PressroomError> {
        Ok(Self {
            client: http_client(SourceKind::Arxiv, timeout)?,
            endpoint: config
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            topics: config.topics.clone(),
            max_results: config.max_results,
        })
    }

    /// Papers updated within the last `window_days` before `now`.
    pub fn query_url(&self, now: DateTime<Utc>, window_days: u32) -> String {
        let from = now - chrono::Duration::days(i64::from(window_days.max(1)));
        let categories = self
            .topics
            .iter()
            .map(|t| format!("cat:{}", t.trim_start_matches("cat:")))
            .collect::<Vec<_>>()
            .join("+OR+");
        format!(
            "{}?search_query=({categories})+AND+lastUpdatedDate:[{}+TO+{}]&sortBy=relevance&max_results={}",
            self.endpoint,
            from.format("%Y%m%d%H%M"),
            now.format("%Y%m%d%H%M"),
            self.max_results
        )
    }

    /// One API query per run, counted against the budget.
    pub async fn fetch(
        &self,
        record: &SourceScheduleRecord,
        budget: &RequestBudget,
    ) -> Result<Vec<Draft>, PressroomError> {
        let url = self.query_url(Utc::now(), record.execution_period_days);
        budget.acquire()?;
        debug!(url = %url, "querying arXiv");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(request_err(SourceKind::Arxiv, "arXiv request failed"))?;
        let body = ensure_success(SourceKind::Arxiv, response)
            .await?
            .bytes()
            .await
            .map_err(request_err(SourceKind::Arxiv, "failed to read arXiv response"))?;

        let drafts = parse_feed(&body)?;
        info!(entries = drafts.len(), "arXiv returned entries");
        Ok(drafts)
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub(crate) fn parse_feed(body: &[u8]) -> Result<Vec<Draft>, PressroomError> {
    let feed = parser::parse(body).map_err(|e| PressroomError::TransientSource {
        kind: SourceKind::Arxiv,
        message: format!("failed to parse arXiv feed: {e}"),
        source: Some(Box::new(e)),
    })?;

    let drafts = feed
        .entries
        .into_iter()
        .filter_map(|entry| {
            let title = entry.title.map(|t| collapse_whitespace(&t.content))?;
            let summary = entry.summary.map(|s| collapse_whitespace(&s.content))?;
            let authors = entry
                .authors
                .iter()
                .map(|a| a.name.trim())
                .collect::<Vec<_>>()
                .join(", ");
            let link = entry
                .links
                .iter()
                .find(|l| l.rel.as_deref() != Some("related"))
                .map(|l| l.href.clone())
                .or_else(|| (!entry.id.is_empty()).then(|| entry.id.clone()));

            let mut metadata = SourceMetadata::new(SourceKind::Arxiv, summary);
            metadata.title = Some(title);
            metadata.author = (!authors.is_empty()).then_some(authors);
            metadata.created_at = entry.published.or(entry.updated).map(|d| d.to_rfc3339());
            metadata.link = link;
            Some(Draft::new(metadata))
        })
        .collect();
    Ok(drafts)
}
