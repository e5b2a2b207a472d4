// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock source adapter returning canned drafts.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use pressroom_core::{
    AdapterType, Draft, DraftOrigin, HealthStatus, PluginAdapter, PressroomError, RequestBudget,
    SourceAdapter, SourceKind, SourceMetadata, SourceScheduleRecord,
};

/// A source that returns the same drafts on every fetch.
///
/// Each fetch spends one request from the budget before answering.
#[derive(Clone)]
pub struct MockSource {
    kind: SourceKind,
    drafts: Arc<Mutex<Vec<Draft>>>,
    failing: Arc<AtomicBool>,
    delay: Option<Duration>,
    fetches: Arc<AtomicUsize>,
    acknowledged: Arc<Mutex<Vec<DraftOrigin>>>,
}

impl MockSource {
    pub fn new(kind: SourceKind) -> Self {
        Self {
            kind,
            drafts: Arc::default(),
            failing: Arc::default(),
            delay: None,
            fetches: Arc::default(),
            acknowledged: Arc::default(),
        }
    }

    pub fn with_drafts(kind: SourceKind, drafts: Vec<Draft>) -> Self {
        Self {
            drafts: Arc::new(Mutex::new(drafts)),
            ..Self::new(kind)
        }
    }

    /// One draft per body, titled `"<kind> item <n>"`.
    pub fn with_contents<I, S>(kind: SourceKind, bodies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let drafts = bodies
            .into_iter()
            .enumerate()
            .map(|(i, body)| {
                let mut metadata = SourceMetadata::new(kind, body);
                metadata.title = Some(format!("{kind} item {}", i + 1));
                Draft::new(metadata)
            })
            .collect();
        Self {
            drafts: Arc::new(Mutex::new(drafts)),
            ..Self::new(kind)
        }
    }

    /// Sleep before answering, to exercise fetch timeouts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Origins passed to `acknowledge` so far.
    pub async fn acknowledged(&self) -> Vec<DraftOrigin> {
        self.acknowledged.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for MockSource {
    fn name(&self) -> &str {
        "mock-source"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Source
    }

    async fn health_check(&self) -> Result<HealthStatus, PressroomError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PressroomError> {
        Ok(())
    }
}

#[async_trait]
impl SourceAdapter for MockSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn fetch(
        &self,
        _record: &SourceScheduleRecord,
        budget: &RequestBudget,
    ) -> Result<Vec<Draft>, PressroomError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        budget.acquire()?;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(PressroomError::source_failure(self.kind, "mock source failure"));
        }
        Ok(self.drafts.lock().await.clone())
    }

    async fn acknowledge(&self, origins: &[DraftOrigin]) -> Result<(), PressroomError> {
        self.acknowledged.lock().await.extend_from_slice(origins);
        Ok(())
    }
}
