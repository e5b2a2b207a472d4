// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Medium articles through the RapidAPI Medium gateway.
//!
//! A run costs one search per topic plus up to three requests per article
//! (details, content, author). Once the budget runs dry the run stops and
//! returns what it already collected.

use pressroom_config::model::RapidConfig;
use pressroom_config::SourceConfig;
use pressroom_core::{Draft, PressroomError, RequestBudget, SourceKind, SourceMetadata};
use serde::Deserialize;
use tracing::{info, warn};

use crate::rapid::RapidClient;

const KIND: SourceKind = SourceKind::Medium;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    articles: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleInfo {
    #[serde(default)]
    title: String,
    #[serde(default)]
    subtitle: Option<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ArticleContent {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct UserInfo {
    #[serde(default)]
    fullname: Option<String>,
}

pub struct MediumSource {
    rapid: RapidClient,
    base: String,
    topics: Vec<String>,
    max_results: usize,
}

impl MediumSource {
    pub fn new(config: &SourceConfig, rapid: &RapidConfig) -> Result<Self, PressroomError> {
        let base = config
            .endpoint
            .as_deref()
            .ok_or_else(|| PressroomError::Config("sources.medium.endpoint is required".into()))?
            .trim_end_matches('/')
            .to_string();
        let host = config.host.as_deref().unwrap_or_default();
        Ok(Self {
            rapid: RapidClient::new(KIND, rapid, host)?,
            base,
            topics: config.topics.clone(),
            max_results: config.max_results,
        })
    }

    pub async fn fetch(&self, budget: &RequestBudget) -> Result<Vec<Draft>, PressroomError> {
        let mut drafts = Vec::new();
        let mut last_error = None;
        let mut any_ok = false;

        'topics: for topic in &self.topics {
            let search: SearchResponse = match self
                .rapid
                .get_json(
                    budget,
                    &format!("{}/search/articles", self.base),
                    &[("query", topic.as_str())],
                )
                .await
            {
                Ok(found) => found,
                Err(e @ PressroomError::QuotaExhausted { .. }) => {
                    last_error = Some(e);
                    break;
                }
                Err(e) => {
                    warn!(topic = %topic, error = %e, "medium search failed");
                    last_error = Some(e);
                    continue;
                }
            };
            any_ok = true;
            info!(topic = %topic, results = search.articles.len(), "medium topic searched");

            for id in search.articles.iter().take(self.max_results) {
                match self.article(budget, id).await {
                    Ok(draft) => drafts.push(draft),
                    Err(PressroomError::QuotaExhausted { limit, .. }) => {
                        info!(limit, collected = drafts.len(), "medium request limit reached");
                        break 'topics;
                    }
                    Err(e) => warn!(article = %id, error = %e, "skipping medium article"),
                }
            }
        }

        match last_error {
            Some(e) if !any_ok => Err(e),
            _ => Ok(drafts),
        }
    }

    async fn article(&self, budget: &RequestBudget, id: &str) -> Result<Draft, PressroomError> {
        let info: ArticleInfo = self
            .rapid
            .get_json(budget, &format!("{}/article/{id}", self.base), &[])
            .await?;
        let content: ArticleContent = self
            .rapid
            .get_json(budget, &format!("{}/article/{id}/content", self.base), &[])
            .await?;

        let author = match info.author.as_deref().filter(|a| !a.is_empty()) {
            Some(user_id) => self.author_name(budget, user_id).await,
            None => None,
        };

        let mut metadata = SourceMetadata::new(KIND, content.content);
        metadata.title = (!info.title.is_empty()).then_some(info.title);
        metadata.description = info.subtitle.filter(|s| !s.is_empty());
        metadata.author = author;
        metadata.created_at = info.published_at;
        metadata.link = info.url;
        Ok(Draft::new(metadata))
    }

    /// Best effort: an unknown author, or no budget left, leaves the field empty.
    async fn author_name(&self, budget: &RequestBudget, user_id: &str) -> Option<String> {
        match self
            .rapid
            .get_json::<UserInfo>(budget, &format!("{}/user/{user_id}", self.base), &[])
            .await
        {
            Ok(user) => user.fullname.filter(|n| !n.is_empty()),
            Err(e) => {
                warn!(user = %user_id, error = %e, "medium author lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn search_then_article_details() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/articles"))
            .and(query_param("query", "ai"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "articles": ["a1", "a2", "a3"]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/article/a1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "title": "Agents in practice",
                "subtitle": "What works",
                "author": "u9",
                "published_at": "2026-10-01 08:00:00",
                "url": "https://medium.com/p/a1"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/article/a1/content"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "content": "Long article text."
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/user/u9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "fullname": "Grace Hopper"
            })))
            .mount(&server)
            .await;
        // a2 is unreachable; a3 is beyond max_results.
        Mock::given(method("GET"))
            .and(path("/article/a2"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = SourceConfig {
            endpoint: Some(server.uri()),
            topics: vec!["ai".into()],
            max_results: 2,
            ..SourceConfig::medium()
        };
        let rapid = RapidConfig {
            api_key: Some("k".into()),
            timeout_secs: 5,
        };
        let budget = RequestBudget::unlimited(KIND);
        let drafts = MediumSource::new(&config, &rapid).unwrap().fetch(&budget).await.unwrap();
        assert_eq!(drafts.len(), 1);
        let meta = &drafts[0].metadata;
        assert_eq!(meta.title.as_deref(), Some("Agents in practice"));
        assert_eq!(meta.author.as_deref(), Some("Grace Hopper"));
        assert_eq!(meta.raw_content, "Long article text.");
        assert_eq!(meta.link.as_deref(), Some("https://medium.com/p/a1"));

        let requested: Vec<String> = server
            .received_requests()
            .await
            .unwrap()
            .iter()
            .map(|r| r.url.path().to_string())
            .collect();
        assert!(!requested.iter().any(|p| p.starts_with("/article/a3")));
        assert_eq!(budget.used() as usize, requested.len());
    }

    async fn three_article_server() -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/articles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "articles": ["a1", "a2", "a3"]
            })))
            .mount(&server)
            .await;
        for id in ["a1", "a2", "a3"] {
            Mock::given(method("GET"))
                .and(path(format!("/article/{id}")))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "title": format!("Article {id}"),
                    "author": "u1"
                })))
                .mount(&server)
                .await;
            Mock::given(method("GET"))
                .and(path(format!("/article/{id}/content")))
                .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                    "content": format!("Body of {id}, which is comfortably long enough to clear the content filter.")
                })))
                .mount(&server)
                .await;
        }
        Mock::given(method("GET"))
            .and(path("/user/u1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "fullname": "Ada"
            })))
            .mount(&server)
            .await;
        server
    }

    #[tokio::test]
    async fn every_request_is_counted_and_the_limit_holds() {
        let server = three_article_server().await;
        let config = SourceConfig {
            endpoint: Some(server.uri()),
            topics: vec!["ai".into()],
            max_results: 3,
            ..SourceConfig::medium()
        };
        let rapid = RapidConfig {
            api_key: Some("k".into()),
            timeout_secs: 5,
        };
        let source = MediumSource::new(&config, &rapid).unwrap();

        // Search plus details, content and author for a1; a2 stops at the limit.
        let budget = RequestBudget::new(KIND, 0, Some(5));
        let drafts = source.fetch(&budget).await.unwrap();
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].metadata.title.as_deref(), Some("Article a1"));

        let sent = server.received_requests().await.unwrap().len();
        assert_eq!(sent, 5);
        assert_eq!(budget.used(), 5);

        // Nothing left: the next run fails without touching the network.
        let err = source.fetch(&budget).await.unwrap_err();
        assert_eq!(err.code(), "quota_exhausted");
        assert_eq!(server.received_requests().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn scheduler_stores_what_the_run_actually_sent() {
        use crate::{Source, SourceOutcome, SourcesScheduler};
        use chrono::Utc;
        use pressroom_config::model::{SourcesConfig, StorageConfig};
        use pressroom_core::{SourceAdapter, StorageAdapter};
        use pressroom_storage::SqliteStorage;
        use std::sync::Arc;

        let server = three_article_server().await;
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::new(StorageConfig {
            database_path: dir.path().join("medium.db").to_string_lossy().into_owned(),
            wal_mode: true,
        });
        storage.initialize().await.unwrap();
        let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

        let mut config = SourcesConfig::default();
        config.medium = SourceConfig {
            active: true,
            endpoint: Some(server.uri()),
            topics: vec!["ai".into()],
            max_results: 3,
            request_limit: Some(150),
            ..SourceConfig::medium()
        };
        let rapid = RapidConfig {
            api_key: Some("k".into()),
            timeout_secs: 5,
        };
        let medium = MediumSource::new(&config.medium, &rapid).unwrap();
        let sources: Vec<Arc<dyn SourceAdapter>> = vec![Arc::new(Source::Medium(medium))];
        let report = SourcesScheduler::new(storage.clone(), sources, config)
            .run_cycle(Utc::now())
            .await;
        assert_eq!(report.outcome(KIND), Some(SourceOutcome::Fetched(3)));

        // One search, then details, content and author per article.
        let sent = server.received_requests().await.unwrap().len();
        assert_eq!(sent, 10);
        let record = storage.get_schedule(KIND).await.unwrap().unwrap();
        assert_eq!(record.request_count as usize, sent);
    }
}
