// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Suggestion/approval controller.
//!
//! Owns the persisted [`ControllerState`] and the in-memory [`ApprovalQueue`]
//! pointer behind a single lock, so the periodic evaluation and the operator
//! command handler never interleave their state changes. Every state change is
//! written back to storage before the lock is released. Model calls and
//! channel sends run with the lock released.
//!
//! Phases: `IDLE` delivers the current suggestion when nothing blocks it and
//! moves to `AWAITING_INTERACTION`; `publish` moves to `COOLING_OFF`, which
//! returns to `IDLE` once `cool_off_until` has passed.

mod commands;

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use pressroom_config::PressroomConfig;
use pressroom_context::CheckpointManager;
use pressroom_core::{
    ControllerPhase, ControllerState, GenerationModel, OperatorChannel, PressroomError,
    PublicationId, PublicationSummary, StorageAdapter,
};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::publish::PublishWorkflow;
use crate::queue::ApprovalQueue;

/// Timing and formatting knobs for the controller.
#[derive(Debug, Clone)]
pub struct ControllerSettings {
    /// Cool-off after a successful publish.
    pub suggestion_period: chrono::Duration,
    pub evaluation_interval: Duration,
    pub empty_queue_backoff: Duration,
    pub generation_timeout: Duration,
    pub apply_unicode_bold: bool,
}

impl ControllerSettings {
    pub fn from_config(config: &PressroomConfig) -> Self {
        Self {
            suggestion_period: chrono::Duration::days(i64::from(
                config.suggestions.suggestion_period_days,
            )),
            evaluation_interval: Duration::from_secs(
                config.suggestions.evaluation_interval_secs.max(1),
            ),
            empty_queue_backoff: Duration::from_secs(config.suggestions.empty_queue_backoff_secs),
            generation_timeout: Duration::from_secs(config.producer.generation_timeout_secs),
            apply_unicode_bold: config.producer.apply_unicode_bold,
        }
    }
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self::from_config(&PressroomConfig::default())
    }
}

/// What one periodic evaluation did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Evaluation {
    Delivered(PublicationId),
    DeliveryFailed(PublicationId),
    CoolingOff,
    AwaitingInteraction,
    Blocked,
    NoOperator,
    EmptyQueue,
}

struct Inner {
    state: ControllerState,
    queue: ApprovalQueue,
}

pub struct SuggestionController {
    storage: Arc<dyn StorageAdapter>,
    channel: Arc<dyn OperatorChannel>,
    model: Arc<dyn GenerationModel>,
    checkpoints: Arc<CheckpointManager>,
    workflow: Arc<PublishWorkflow>,
    settings: ControllerSettings,
    inner: Mutex<Inner>,
}

impl SuggestionController {
    /// Load the persisted controller state and build the controller.
    pub async fn new(
        storage: Arc<dyn StorageAdapter>,
        channel: Arc<dyn OperatorChannel>,
        model: Arc<dyn GenerationModel>,
        checkpoints: Arc<CheckpointManager>,
        workflow: Arc<PublishWorkflow>,
        settings: ControllerSettings,
    ) -> Result<Self, PressroomError> {
        let state = storage.load_controller_state().await?;
        info!(
            phase = %state.phase,
            blocked = state.suggestions_blocked,
            bound = state.operator_identity.is_some(),
            "suggestion controller loaded"
        );
        Ok(Self {
            storage,
            channel,
            model,
            checkpoints,
            workflow,
            settings,
            inner: Mutex::new(Inner {
                state,
                queue: ApprovalQueue::new(),
            }),
        })
    }

    /// A copy of the current controller state.
    pub async fn state(&self) -> ControllerState {
        self.inner.lock().await.state.clone()
    }

    /// Recompute the queue from storage and re-anchor the pointer on the
    /// publication last shown to the operator.
    async fn refresh(&self, inner: &mut Inner) -> Result<(), PressroomError> {
        let ids = self.storage.pending_publication_ids().await?;
        inner.queue.resync(ids);
        if let Some(id) = &inner.state.current_publication {
            inner.queue.focus(id);
        }
        inner.state.current_publication = inner.queue.current_id().cloned();
        Ok(())
    }

    async fn save(&self, inner: &Inner) -> Result<(), PressroomError> {
        self.storage.save_controller_state(&inner.state).await
    }

    async fn summary(
        &self,
        queue: &ApprovalQueue,
        id: &PublicationId,
    ) -> Result<PublicationSummary, PressroomError> {
        let publication = self
            .storage
            .get_publication(id)
            .await?
            .ok_or_else(|| PressroomError::PublicationNotFound(id.to_string()))?;
        Ok(publication.summary(queue.current_index(), queue.len()))
    }

    /// One pass of the automatic suggestion logic.
    pub async fn evaluate(&self, now: DateTime<Utc>) -> Result<Evaluation, PressroomError> {
        let mut inner = self.inner.lock().await;
        self.refresh(&mut inner).await?;

        if inner.state.phase == ControllerPhase::CoolingOff {
            if inner.state.is_cooling_off(now) {
                return Ok(Evaluation::CoolingOff);
            }
            inner.state.phase = ControllerPhase::Idle;
            inner.state.cool_off_until = None;
            inner.state.suggestions_blocked = held_block(&inner.state);
            self.save(&inner).await?;
            info!("cool-off period over");
        }
        if inner.state.phase == ControllerPhase::AwaitingInteraction {
            return Ok(Evaluation::AwaitingInteraction);
        }
        if inner.state.suggestions_blocked {
            return Ok(Evaluation::Blocked);
        }
        let Some(operator) = inner.state.operator_identity.clone() else {
            return Ok(Evaluation::NoOperator);
        };
        let Some(id) = inner.queue.current_id().cloned() else {
            return Ok(Evaluation::EmptyQueue);
        };

        let summary = self.summary(&inner.queue, &id).await?;

        // Claimed before sending, so no later pass delivers it twice.
        inner.state.phase = ControllerPhase::AwaitingInteraction;
        inner.state.suggestions_blocked = true;
        inner.state.current_publication = Some(id.clone());
        self.save(&inner).await?;
        drop(inner);

        match self.channel.deliver(&operator, &summary).await {
            Ok(()) => {
                info!(publication_id = %id, "suggestion delivered");
                Ok(Evaluation::Delivered(id))
            }
            Err(e) => {
                warn!(
                    publication_id = %id,
                    error = %e,
                    "suggestion delivery failed, blocking until allowed"
                );
                let mut inner = self.inner.lock().await;
                inner.state.delivery_failed = true;
                inner.state.suggestions_blocked = true;
                self.save(&inner).await?;
                Ok(Evaluation::DeliveryFailed(id))
            }
        }
    }

    /// Periodic evaluation loop.
    pub async fn run_evaluation(&self, cancel: CancellationToken) {
        info!(
            interval_secs = self.settings.evaluation_interval.as_secs(),
            "suggestion evaluation started"
        );
        loop {
            let wait = match self.evaluate(Utc::now()).await {
                Ok(Evaluation::EmptyQueue) => {
                    debug!("approval queue empty, backing off");
                    self.settings.empty_queue_backoff
                }
                Ok(_) => self.settings.evaluation_interval,
                Err(e) => {
                    error!(error = %e, "suggestion evaluation failed");
                    self.settings.evaluation_interval
                }
            };
            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = cancel.cancelled() => break,
            }
        }
        info!("suggestion evaluation stopped");
    }

    /// Operator command loop: receive, execute, reply.
    pub async fn run_commands(&self, cancel: CancellationToken) {
        info!("operator command handler started");
        loop {
            tokio::select! {
                received = self.channel.receive() => match received {
                    Ok(inbound) => {
                        let sender = inbound.sender.clone();
                        let reply = self.handle_command(inbound).await;
                        if let Err(e) = self.channel.reply(&sender, &reply).await {
                            warn!(error = %e, "failed to send command reply");
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "operator channel receive failed");
                        tokio::select! {
                            _ = tokio::time::sleep(Duration::from_secs(1)) => {}
                            _ = cancel.cancelled() => break,
                        }
                    }
                },
                _ = cancel.cancelled() => break,
            }
        }
        info!("operator command handler stopped");
    }
}

/// The block that survives leaving a phase: an operator `stop` or an
/// unacknowledged delivery failure.
fn held_block(state: &ControllerState) -> bool {
    state.operator_paused || state.delivery_failed
}
