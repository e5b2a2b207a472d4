// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock generation model with scripted responses.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use pressroom_core::{
    AdapterType, GenerationModel, HealthStatus, PluginAdapter, PressroomError, Turn,
};

/// One recorded `generate` call.
#[derive(Debug, Clone)]
pub struct GenerationCall {
    pub prompt: String,
    pub history: Vec<Turn>,
}

/// Scripted response: text, or a transient failure.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Text(String),
    Fail(String),
}

/// Pops scripted responses in FIFO order; returns `"mock post"` once drained.
#[derive(Clone, Default)]
pub struct MockGeneration {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    calls: Arc<Mutex<Vec<GenerationCall>>>,
    delay_ms: Arc<AtomicU64>,
}

impl MockGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let queue = responses
            .into_iter()
            .map(|r| MockResponse::Text(r.into()))
            .collect();
        Self {
            responses: Arc::new(Mutex::new(queue)),
            ..Self::default()
        }
    }

    pub async fn push_response(&self, text: impl Into<String>) {
        self.responses
            .lock()
            .await
            .push_back(MockResponse::Text(text.into()));
    }

    pub async fn push_failure(&self, message: impl Into<String>) {
        self.responses
            .lock()
            .await
            .push_back(MockResponse::Fail(message.into()));
    }

    /// Make every following `generate()` take this long.
    pub fn set_delay(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self.delay_ms.store(millis, Ordering::SeqCst);
    }

    pub async fn calls(&self) -> Vec<GenerationCall> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }
}

#[async_trait]
impl PluginAdapter for MockGeneration {
    fn name(&self) -> &str {
        "mock-generation"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Generation
    }

    async fn health_check(&self) -> Result<HealthStatus, PressroomError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PressroomError> {
        Ok(())
    }
}

#[async_trait]
impl GenerationModel for MockGeneration {
    async fn generate(&self, prompt: &str, history: &[Turn]) -> Result<String, PressroomError> {
        self.calls.lock().await.push(GenerationCall {
            prompt: prompt.to_string(),
            history: history.to_vec(),
        });
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        match self.responses.lock().await.pop_front() {
            Some(MockResponse::Text(text)) => Ok(text),
            Some(MockResponse::Fail(message)) => Err(PressroomError::generation(message)),
            None => Ok("mock post".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_then_default() {
        let model = MockGeneration::with_responses(["first"]);
        model.push_failure("down").await;
        assert_eq!(model.generate("p", &[]).await.unwrap(), "first");
        assert!(model.generate("p", &[]).await.is_err());
        assert_eq!(model.generate("p", &[]).await.unwrap(), "mock post");
        assert_eq!(model.call_count().await, 3);
    }
}
