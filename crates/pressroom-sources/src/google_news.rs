// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Google News search through RapidAPI.
//!
//! Each configured topic is searched separately. The article behind every
//! result is downloaded and rendered to text; results whose page cannot be
//! read are dropped. Only the RapidAPI search counts against the quota; the
//! article pages are fetched from their publishers.

use pressroom_config::model::RapidConfig;
use pressroom_config::SourceConfig;
use pressroom_core::{Draft, PressroomError, RequestBudget, SourceKind, SourceMetadata};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::rapid::{RapidClient, fetch_page_text};

const KIND: SourceKind = SourceKind::GoogleNews;

#[derive(Debug, Serialize)]
struct NewsQuery<'a> {
    text: &'a str,
    region: &'static str,
    max_results: usize,
}

#[derive(Debug, Default, Deserialize)]
struct NewsResponse {
    #[serde(default)]
    news: Vec<NewsItem>,
}

#[derive(Debug, Deserialize)]
struct NewsItem {
    title: Option<String>,
    body: Option<String>,
    url: String,
    date: Option<String>,
    source: Option<String>,
    image: Option<String>,
}

pub struct GoogleNewsSource {
    rapid: RapidClient,
    endpoint: String,
    topics: Vec<String>,
    max_results: usize,
}

impl GoogleNewsSource {
    pub fn new(config: &SourceConfig, rapid: &RapidConfig) -> Result<Self, PressroomError> {
        let endpoint = config.endpoint.clone().ok_or_else(|| {
            PressroomError::Config("sources.google_news.endpoint is required".into())
        })?;
        let host = config.host.as_deref().unwrap_or_default();
        Ok(Self {
            rapid: RapidClient::new(KIND, rapid, host)?,
            endpoint,
            topics: config.topics.clone(),
            max_results: config.max_results,
        })
    }

    pub async fn fetch(&self, budget: &RequestBudget) -> Result<Vec<Draft>, PressroomError> {
        let mut drafts = Vec::new();
        let mut last_error = None;
        let mut any_ok = false;

        for topic in &self.topics {
            match self.search_topic(budget, topic).await {
                Ok(found) => {
                    info!(topic = %topic, results = found.len(), "google news topic searched");
                    any_ok = true;
                    drafts.extend(found);
                }
                Err(e @ PressroomError::QuotaExhausted { .. }) => {
                    info!(topic = %topic, "google news request limit reached");
                    last_error = Some(e);
                    break;
                }
                Err(e) => {
                    warn!(topic = %topic, error = %e, "google news topic failed");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) if !any_ok => Err(e),
            _ => Ok(drafts),
        }
    }

    async fn search_topic(
        &self,
        budget: &RequestBudget,
        topic: &str,
    ) -> Result<Vec<Draft>, PressroomError> {
        let query = NewsQuery {
            text: topic,
            region: "wt-wt",
            max_results: self.max_results,
        };
        let response: NewsResponse = self.rapid.post_json(budget, &self.endpoint, &query).await?;

        let mut drafts = Vec::with_capacity(response.news.len());
        for item in response.news {
            let text = match fetch_page_text(self.rapid.http(), KIND, &item.url).await {
                Ok(text) => text,
                Err(e) => {
                    debug!(url = %item.url, error = %e, "skipping unreadable article");
                    continue;
                }
            };
            let mut metadata = SourceMetadata::new(KIND, text);
            metadata.title = item.title;
            metadata.author = item.source;
            metadata.created_at = item.date;
            metadata.description = item.body;
            metadata.link = Some(item.url);

            let mut draft = Draft::new(metadata);
            if let Some(image_url) = item.image {
                draft.image = self.download_image(&image_url).await;
            }
            drafts.push(draft);
        }
        Ok(drafts)
    }

    async fn download_image(&self, url: &str) -> Option<Vec<u8>> {
        let response = self.rapid.http().get(url).send().await.ok()?;
        if !response.status().is_success() {
            return None;
        }
        response.bytes().await.ok().map(|b| b.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn source(server: &MockServer, topics: &[&str]) -> GoogleNewsSource {
        let config = SourceConfig {
            endpoint: Some(format!("{}/", server.uri())),
            topics: topics.iter().map(|t| t.to_string()).collect(),
            max_results: 2,
            ..SourceConfig::google_news()
        };
        let rapid = RapidConfig {
            api_key: Some("k".into()),
            timeout_secs: 5,
        };
        GoogleNewsSource::new(&config, &rapid).unwrap()
    }

    #[tokio::test]
    async fn articles_are_fetched_and_converted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_partial_json(serde_json::json!({
                "text": "rust", "region": "wt-wt", "max_results": 2
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "news": [
                    {
                        "title": "Rust 2.0 announced",
                        "body": "A short teaser",
                        "url": format!("{}/article/1", server.uri()),
                        "date": "2026-10-18T09:00:00+00:00",
                        "source": "Example Times",
                        "image": format!("{}/img/1.jpg", server.uri())
                    },
                    {
                        "title": "Gone",
                        "body": "missing",
                        "url": format!("{}/article/404", server.uri())
                    }
                ]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/article/1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html><body><p>The full story of the release.</p></body></html>"),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/img/1.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF]))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/article/404"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let budget = RequestBudget::unlimited(KIND);
        let drafts = source(&server, &["rust"]).await.fetch(&budget).await.unwrap();
        assert_eq!(drafts.len(), 1);
        // One search; publisher pages and images are not RapidAPI calls.
        assert_eq!(budget.used(), 1);
        let meta = &drafts[0].metadata;
        assert_eq!(meta.title.as_deref(), Some("Rust 2.0 announced"));
        assert!(meta.raw_content.contains("The full story of the release."));
        assert_eq!(meta.description.as_deref(), Some("A short teaser"));
        assert_eq!(meta.author.as_deref(), Some("Example Times"));
        assert_eq!(drafts[0].image.as_deref(), Some(&[0xFF, 0xD8, 0xFF][..]));
    }

    #[tokio::test]
    async fn all_topics_failing_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let budget = RequestBudget::unlimited(KIND);
        let err = source(&server, &["a", "b"]).await.fetch(&budget).await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(budget.used(), 2);
    }

    #[tokio::test]
    async fn limit_stops_before_the_next_topic() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"news": []})))
            .mount(&server)
            .await;
        let budget = RequestBudget::new(KIND, 0, Some(2));
        let drafts = source(&server, &["a", "b", "c"]).await.fetch(&budget).await.unwrap();
        assert!(drafts.is_empty());
        assert_eq!(server.received_requests().await.unwrap().len(), 2);
        assert_eq!(budget.used(), 2);
    }
}
