// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock publishing client.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use pressroom_core::{
    AdapterType, ExternalPostId, HealthStatus, PluginAdapter, PressroomError, PublishClient,
    PublishOutcome,
};

/// Scripted publish result.
#[derive(Debug, Clone)]
pub enum MockPublish {
    Ok,
    NeedsReauth(String),
    Fail(String),
}

/// Records every publish call. Unscripted calls succeed with `mock-post-<n>`.
#[derive(Clone, Default)]
pub struct MockPublisher {
    script: Arc<Mutex<VecDeque<MockPublish>>>,
    published: Arc<Mutex<Vec<(String, Option<Vec<u8>>)>>>,
    counter: Arc<AtomicUsize>,
}

impl MockPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push(&self, result: MockPublish) {
        self.script.lock().await.push_back(result);
    }

    /// Content and image of every call that reached the platform.
    pub async fn published(&self) -> Vec<(String, Option<Vec<u8>>)> {
        self.published.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for MockPublisher {
    fn name(&self) -> &str {
        "mock-publisher"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Publisher
    }

    async fn health_check(&self) -> Result<HealthStatus, PressroomError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PressroomError> {
        Ok(())
    }
}

#[async_trait]
impl PublishClient for MockPublisher {
    async fn publish(
        &self,
        content: &str,
        image: Option<&[u8]>,
    ) -> Result<PublishOutcome, PressroomError> {
        let next = self.script.lock().await.pop_front().unwrap_or(MockPublish::Ok);
        match next {
            MockPublish::Ok => {
                self.published
                    .lock()
                    .await
                    .push((content.to_string(), image.map(<[u8]>::to_vec)));
                let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
                Ok(PublishOutcome::Published(ExternalPostId(format!(
                    "mock-post-{n}"
                ))))
            }
            MockPublish::NeedsReauth(auth_url) => Ok(PublishOutcome::NeedsReauth { auth_url }),
            MockPublish::Fail(message) => Err(PressroomError::Publish {
                message,
                source: None,
            }),
        }
    }
}
