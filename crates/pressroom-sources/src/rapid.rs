// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared HTTP plumbing for RapidAPI-hosted sources.

use std::time::Duration;

use pressroom_config::model::RapidConfig;
use pressroom_core::{PressroomError, RequestBudget, SourceKind};
use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Wide enough that html2text never wraps a paragraph.
const TEXT_WIDTH: usize = 10_000;

/// Builds a reqwest client with the configured timeout.
pub(crate) fn http_client(kind: SourceKind, timeout: Duration) -> Result<reqwest::Client, PressroomError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| PressroomError::TransientSource {
            kind,
            message: format!("failed to build HTTP client: {e}"),
            source: Some(Box::new(e)),
        })
}

pub(crate) fn request_err(kind: SourceKind, what: &str) -> impl Fn(reqwest::Error) -> PressroomError {
    let what = what.to_string();
    move |e| PressroomError::TransientSource {
        kind,
        message: format!("{what}: {e}"),
        source: Some(Box::new(e)),
    }
}

/// Fails with `TransientSource` on a non-2xx status, keeping the body for context.
pub(crate) async fn ensure_success(
    kind: SourceKind,
    response: reqwest::Response,
) -> Result<reqwest::Response, PressroomError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let url = response.url().clone();
    let body = response.text().await.unwrap_or_default();
    Err(PressroomError::source_failure(
        kind,
        format!("{url} returned {status}: {body}"),
    ))
}

/// Fetches a page and renders its HTML as plain text.
pub(crate) async fn fetch_page_text(
    client: &reqwest::Client,
    kind: SourceKind,
    url: &str,
) -> Result<String, PressroomError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(request_err(kind, "page request failed"))?;
    let response = ensure_success(kind, response).await?;
    let html = response
        .bytes()
        .await
        .map_err(request_err(kind, "failed to read page"))?;
    html_to_text(kind, &html)
}

pub(crate) fn html_to_text(kind: SourceKind, html: &[u8]) -> Result<String, PressroomError> {
    html2text::from_read(html, TEXT_WIDTH).map_err(|e| PressroomError::TransientSource {
        kind,
        message: format!("failed to convert HTML: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Client for a single RapidAPI host. Every request takes a slot from the
/// run's [`RequestBudget`] before it is sent, matching how RapidAPI bills.
#[derive(Debug, Clone)]
pub struct RapidClient {
    kind: SourceKind,
    client: reqwest::Client,
    api_key: SecretString,
    host: String,
}

impl RapidClient {
    pub fn new(kind: SourceKind, config: &RapidConfig, host: &str) -> Result<Self, PressroomError> {
        let api_key = config
            .api_key
            .as_ref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                PressroomError::Config(format!(
                    "rapid.api_key is required for the {kind} source"
                ))
            })?;
        Ok(Self {
            kind,
            client: http_client(kind, Duration::from_secs(config.timeout_secs))?,
            api_key: SecretString::from(api_key.clone()),
            host: host.to_string(),
        })
    }

    /// The plain client, without RapidAPI headers, for fetching linked pages.
    pub fn http(&self) -> &reqwest::Client {
        &self.client
    }

    fn url(&self, base: &str, params: &[(&str, &str)]) -> Result<Url, PressroomError> {
        Url::parse_with_params(base, params).map_err(|e| {
            PressroomError::source_failure(self.kind, format!("invalid URL {base}: {e}"))
        })
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        budget: &RequestBudget,
        base: &str,
        params: &[(&str, &str)],
    ) -> Result<T, PressroomError> {
        let url = self.url(base, params)?;
        budget.acquire()?;
        debug!(source = %self.kind, url = %url, "rapid GET");
        let response = self
            .client
            .get(url)
            .header("x-rapidapi-key", self.api_key.expose_secret())
            .header("x-rapidapi-host", &self.host)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(request_err(self.kind, "rapid request failed"))?;
        self.decode(response).await
    }

    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        budget: &RequestBudget,
        url: &str,
        body: &B,
    ) -> Result<T, PressroomError> {
        budget.acquire()?;
        debug!(source = %self.kind, url = %url, "rapid POST");
        let response = self
            .client
            .post(url)
            .header("x-rapidapi-key", self.api_key.expose_secret())
            .header("x-rapidapi-host", &self.host)
            .json(body)
            .send()
            .await
            .map_err(request_err(self.kind, "rapid request failed"))?;
        self.decode(response).await
    }

    async fn decode<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, PressroomError> {
        let response = ensure_success(self.kind, response).await?;
        response
            .json()
            .await
            .map_err(request_err(self.kind, "failed to parse rapid response"))
    }
}
