// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation checkpoints for iterative post editing.
//!
//! Each publication under review owns an ordered turn log persisted through
//! the [`StorageAdapter`]. The log outlives the process, is trimmed after
//! every append, and is deleted once the publication reaches a terminal state.

pub mod trim;

use std::sync::Arc;

use pressroom_config::model::ConversationConfig;
use pressroom_core::{PressroomError, PublicationId, StorageAdapter, Turn};
use tokio::sync::Mutex;
use tracing::debug;

pub use trim::{TrimPolicy, trim};

/// Persists, trims and loads per-publication conversation history.
pub struct CheckpointManager {
    storage: Arc<dyn StorageAdapter>,
    policy: TrimPolicy,
    /// Serializes load-append-write cycles.
    write_lock: Mutex<()>,
}

impl CheckpointManager {
    pub fn new(storage: Arc<dyn StorageAdapter>, config: &ConversationConfig) -> Self {
        Self::with_policy(storage, TrimPolicy::from(config))
    }

    pub fn with_policy(storage: Arc<dyn StorageAdapter>, policy: TrimPolicy) -> Self {
        Self {
            storage,
            policy,
            write_lock: Mutex::new(()),
        }
    }

    pub fn policy(&self) -> TrimPolicy {
        self.policy
    }

    /// Start a fresh checkpoint, replacing any leftover from an earlier attempt.
    pub async fn create(&self, id: &PublicationId, turns: &[Turn]) -> Result<(), PressroomError> {
        let _guard = self.write_lock.lock().await;
        let trimmed = trim(turns.to_vec(), self.policy);
        self.storage.write_checkpoint(id, &trimmed).await?;
        debug!(publication_id = %id, turns = trimmed.len(), "checkpoint created");
        Ok(())
    }

    /// Append a turn and apply the trimming policy.
    pub async fn append(&self, id: &PublicationId, turn: Turn) -> Result<(), PressroomError> {
        let _guard = self.write_lock.lock().await;
        let mut turns = self.storage.load_checkpoint(id).await?;
        turns.push(turn);
        let before = turns.len();
        let trimmed = trim(turns, self.policy);
        if trimmed.len() < before {
            debug!(
                publication_id = %id,
                evicted = before - trimmed.len(),
                "checkpoint trimmed"
            );
        }
        self.storage.write_checkpoint(id, &trimmed).await
    }

    /// The retained turns, oldest first.
    pub async fn load(&self, id: &PublicationId) -> Result<Vec<Turn>, PressroomError> {
        self.storage.load_checkpoint(id).await
    }

    /// Remove the checkpoint. Safe to call when none exists.
    pub async fn delete(&self, id: &PublicationId) -> Result<(), PressroomError> {
        let _guard = self.write_lock.lock().await;
        self.storage.delete_checkpoint(id).await?;
        debug!(publication_id = %id, "checkpoint deleted");
        Ok(())
    }
}
