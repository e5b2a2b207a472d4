// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LinkedIn publishing client for Pressroom.
//!
//! Posts go through the UGC Posts API. Images are registered as assets and
//! uploaded before the post that references them. A missing or rejected
//! access token yields [`PublishOutcome::NeedsReauth`] so the workflow can
//! hand the operator a sign-in link instead of failing.

pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use pressroom_config::model::LinkedInConfig;
use pressroom_core::{
    AdapterType, ExternalPostId, HealthStatus, PluginAdapter, PressroomError, PublishClient,
    PublishOutcome,
};
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::types::{RegisterUploadRequest, RegisterUploadResponse, UgcPost, person_urn};

const RESTLI_VERSION: &str = "2.0.0";

/// Result of an authenticated call that may have been rejected for auth.
enum Authed<T> {
    Ok(T),
    Unauthorized,
}

/// Publishes posts to a LinkedIn member feed.
pub struct LinkedInPublisher {
    client: reqwest::Client,
    token: RwLock<Option<SecretString>>,
    author_id: Option<String>,
    footer: Option<String>,
    auth_url: String,
    api_base_url: String,
}

impl LinkedInPublisher {
    pub fn new(config: &LinkedInConfig) -> Result<Self, PressroomError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PressroomError::Publish {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        let token = config
            .access_token
            .as_ref()
            .filter(|t| !t.is_empty())
            .map(|t| SecretString::from(t.clone()));

        Ok(Self {
            client,
            token: RwLock::new(token),
            author_id: config.author_id.clone(),
            footer: config.footer.clone(),
            auth_url: config.auth_url.clone(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Installs a fresh access token after the operator re-authenticated.
    pub async fn set_access_token(&self, token: String) {
        *self.token.write().await = Some(SecretString::from(token));
        info!("LinkedIn access token replaced");
    }

    pub async fn has_token(&self) -> bool {
        self.token.read().await.is_some()
    }

    async fn invalidate_token(&self) {
        *self.token.write().await = None;
        warn!("LinkedIn rejected the access token; re-authentication required");
    }

    fn needs_reauth(&self) -> PublishOutcome {
        PublishOutcome::NeedsReauth {
            auth_url: self.auth_url.clone(),
        }
    }

    fn commentary(&self, content: &str) -> String {
        match self.footer.as_deref().filter(|f| !f.is_empty()) {
            Some(footer) => format!("{content}\n\n{footer}"),
            None => content.to_string(),
        }
    }

    async fn upload_image(
        &self,
        token: &SecretString,
        owner: &str,
        image: &[u8],
    ) -> Result<Authed<String>, PressroomError> {
        let response = self
            .client
            .post(format!("{}/v2/assets?action=registerUpload", self.api_base_url))
            .bearer_auth(token.expose_secret())
            .header("X-Restli-Protocol-Version", RESTLI_VERSION)
            .json(&RegisterUploadRequest::image(owner.to_string()))
            .send()
            .await
            .map_err(publish_err("image registration request failed"))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(Authed::Unauthorized);
        }
        let response = error_for_status(response, "image registration").await?;
        let registered: RegisterUploadResponse = response
            .json()
            .await
            .map_err(publish_err("failed to parse image registration response"))?;

        let upload = self
            .client
            .put(&registered.value.upload_mechanism.http_request.upload_url)
            .bearer_auth(token.expose_secret())
            .body(image.to_vec())
            .send()
            .await
            .map_err(publish_err("image upload request failed"))?;
        if upload.status() == StatusCode::UNAUTHORIZED {
            return Ok(Authed::Unauthorized);
        }
        error_for_status(upload, "image upload").await?;

        debug!(asset = %registered.value.asset, bytes = image.len(), "image uploaded");
        Ok(Authed::Ok(registered.value.asset))
    }

    async fn create_post(
        &self,
        token: &SecretString,
        post: &UgcPost,
    ) -> Result<Authed<ExternalPostId>, PressroomError> {
        let response = self
            .client
            .post(format!("{}/v2/ugcPosts", self.api_base_url))
            .bearer_auth(token.expose_secret())
            .header("X-Restli-Protocol-Version", RESTLI_VERSION)
            .json(post)
            .send()
            .await
            .map_err(publish_err("post request failed"))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Ok(Authed::Unauthorized);
        }
        if status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            return Err(PressroomError::Publish {
                message: format!("LinkedIn returned {status}: {body}"),
                source: None,
            });
        }

        let header_id = response
            .headers()
            .get("x-restli-id")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let id = match header_id {
            Some(id) => id,
            None => {
                let body: serde_json::Value = response.json().await.unwrap_or_default();
                body.get("id")
                    .and_then(|v| v.as_str())
                    .map(str::to_string)
                    .ok_or_else(|| PressroomError::Publish {
                        message: "LinkedIn response carried no post id".into(),
                        source: None,
                    })?
            }
        };
        Ok(Authed::Ok(ExternalPostId(id)))
    }
}

fn publish_err(context: &'static str) -> impl Fn(reqwest::Error) -> PressroomError {
    move |e| PressroomError::Publish {
        message: format!("{context}: {e}"),
        source: Some(Box::new(e)),
    }
}

async fn error_for_status(
    response: reqwest::Response,
    what: &str,
) -> Result<reqwest::Response, PressroomError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(PressroomError::Publish {
        message: format!("{what} returned {status}: {body}"),
        source: None,
    })
}

#[async_trait]
impl PluginAdapter for LinkedInPublisher {
    fn name(&self) -> &str {
        "linkedin"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Publisher
    }

    async fn health_check(&self) -> Result<HealthStatus, PressroomError> {
        if self.has_token().await {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded("no access token".into()))
        }
    }

    async fn shutdown(&self) -> Result<(), PressroomError> {
        Ok(())
    }
}

#[async_trait]
impl PublishClient for LinkedInPublisher {
    async fn publish(
        &self,
        content: &str,
        image: Option<&[u8]>,
    ) -> Result<PublishOutcome, PressroomError> {
        let Some(token) = self.token.read().await.clone() else {
            return Ok(self.needs_reauth());
        };
        let author_id = self.author_id.as_deref().ok_or_else(|| {
            PressroomError::Config("linkedin.author_id is required to publish".into())
        })?;
        let author = person_urn(author_id);

        let asset = match image {
            Some(bytes) => match self.upload_image(&token, &author, bytes).await? {
                Authed::Ok(asset) => Some(asset),
                Authed::Unauthorized => {
                    self.invalidate_token().await;
                    return Ok(self.needs_reauth());
                }
            },
            None => None,
        };

        let post = UgcPost::new(author, self.commentary(content), asset);
        match self.create_post(&token, &post).await? {
            Authed::Ok(id) => {
                info!(post_id = %id.0, with_image = image.is_some(), "published to LinkedIn");
                Ok(PublishOutcome::Published(id))
            }
            Authed::Unauthorized => {
                self.invalidate_token().await;
                Ok(self.needs_reauth())
            }
        }
    }
}
