// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns `DRAFT` publications into posts awaiting approval.
//!
//! For each draft the producer optionally condenses the raw content, asks the
//! model for an initial post, writes the body and a fresh checkpoint, and only
//! then advances the publication to `PENDING_APPROVAL`. Any failure leaves the
//! draft untouched for the next cycle.

use std::sync::Arc;
use std::time::Duration;

use pressroom_config::model::ProducerConfig;
use pressroom_context::CheckpointManager;
use pressroom_core::format::apply_unicode_bold;
use pressroom_core::{
    CondenseConfig, GenerationModel, PressroomError, Publication, PublicationState,
    RetrievalPipeline, StorageAdapter, Turn,
};
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// The publication fields handed to the model as the generation prompt.
#[derive(Debug, Serialize)]
struct GenerationInput<'a> {
    title: Option<&'a str>,
    author: Option<&'a str>,
    created_at: Option<&'a str>,
    description: Option<&'a str>,
    content: &'a str,
    source_type: String,
    link: Option<&'a str>,
}

/// Counts from one pass over the drafts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProducerReport {
    pub advanced: usize,
    pub failed: usize,
}

pub struct PublicationsProducer {
    storage: Arc<dyn StorageAdapter>,
    model: Arc<dyn GenerationModel>,
    pipeline: Arc<dyn RetrievalPipeline>,
    checkpoints: Arc<CheckpointManager>,
    system_prompt: String,
    config: ProducerConfig,
}

impl PublicationsProducer {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        model: Arc<dyn GenerationModel>,
        pipeline: Arc<dyn RetrievalPipeline>,
        checkpoints: Arc<CheckpointManager>,
        system_prompt: impl Into<String>,
        config: ProducerConfig,
    ) -> Self {
        Self {
            storage,
            model,
            pipeline,
            checkpoints,
            system_prompt: system_prompt.into(),
            config,
        }
    }

    /// Process every current draft. Cancellation is checked between drafts.
    pub async fn process_cycle(
        &self,
        cancel: &CancellationToken,
    ) -> Result<ProducerReport, PressroomError> {
        let drafts = self.storage.list_publications(PublicationState::Draft).await?;
        let mut report = ProducerReport::default();
        for publication in drafts {
            if cancel.is_cancelled() {
                info!("shutdown requested, stopping producer cycle");
                break;
            }
            match self.process_one(&publication).await {
                Ok(()) => report.advanced += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        publication_id = %publication.id,
                        error = %e,
                        "publication stays in draft"
                    );
                }
            }
        }
        Ok(report)
    }

    async fn process_one(&self, publication: &Publication) -> Result<(), PressroomError> {
        let metadata = &publication.source_metadata;
        let generation_timeout = Duration::from_secs(self.config.generation_timeout_secs);

        let (content, title) =
            if metadata.raw_content.chars().count() < self.config.condensation_threshold_chars {
                (metadata.raw_content.clone(), metadata.title.clone())
            } else {
                let condense = CondenseConfig {
                    chunk_size: self.config.chunk_size,
                    chunk_overlap: self.config.chunk_overlap,
                    questions: self.config.questions,
                    chunks_per_question: self.config.chunks_per_question,
                    known_title: metadata.title.clone(),
                };
                debug!(publication_id = %publication.id, "condensing long content");
                let condensed = with_timeout(
                    generation_timeout,
                    self.pipeline.condense(&metadata.raw_content, &condense),
                )
                .await?;
                (condensed.dialog, condensed.title)
            };

        let input = GenerationInput {
            title: title.as_deref(),
            author: metadata.author.as_deref(),
            created_at: metadata.created_at.as_deref(),
            description: metadata.description.as_deref(),
            content: &content,
            source_type: metadata.source_type.to_string(),
            link: metadata.link.as_deref(),
        };
        let prompt = serde_json::to_string(&input)
            .map_err(|e| PressroomError::Internal(format!("failed to encode generation input: {e}")))?;

        let system = Turn::system(self.system_prompt.clone());
        let post = with_timeout(
            generation_timeout,
            self.model.generate(&prompt, std::slice::from_ref(&system)),
        )
        .await?;
        let post = if self.config.apply_unicode_bold {
            apply_unicode_bold(post.trim())
        } else {
            post.trim().to_string()
        };
        if post.is_empty() {
            return Err(PressroomError::generation("model returned an empty post"));
        }

        self.storage.update_content(&publication.id, &post).await?;
        self.checkpoints
            .create(&publication.id, &[system, Turn::agent(post)])
            .await?;
        self.storage
            .transition_state(
                &publication.id,
                PublicationState::Draft,
                PublicationState::PendingApproval,
            )
            .await?;
        info!(publication_id = %publication.id, "advanced to pending approval");
        Ok(())
    }

    /// Run cycles until cancelled.
    pub async fn run(&self, cancel: CancellationToken) {
        let interval = Duration::from_secs(self.config.poll_interval_secs.max(1));
        info!(interval_secs = interval.as_secs(), "publications producer started");
        loop {
            match self.process_cycle(&cancel).await {
                Ok(report) if report.advanced + report.failed > 0 => {
                    info!(
                        advanced = report.advanced,
                        failed = report.failed,
                        "producer cycle complete"
                    );
                }
                Ok(_) => {}
                Err(e) => error!(error = %e, "producer cycle failed"),
            }
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = cancel.cancelled() => break,
            }
        }
        info!("publications producer stopped");
    }
}

async fn with_timeout<T>(
    duration: Duration,
    fut: impl Future<Output = Result<T, PressroomError>>,
) -> Result<T, PressroomError> {
    tokio::time::timeout(duration, fut)
        .await
        .map_err(|_| PressroomError::Timeout { duration })?
}
