// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock operator channel for deterministic testing.
//!
//! `MockChannel` implements `OperatorChannel` with injectable inbound commands
//! and captured deliveries and replies for assertion in tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use pressroom_core::{
    AdapterType, Command, CommandReply, HealthStatus, InboundCommand, OperatorChannel,
    PluginAdapter, PressroomError, PublicationSummary,
};

/// A mock operator channel. Clones share the same queues.
#[derive(Clone, Default)]
pub struct MockChannel {
    inbound: Arc<Mutex<VecDeque<InboundCommand>>>,
    delivered: Arc<Mutex<Vec<(String, PublicationSummary)>>>,
    replies: Arc<Mutex<Vec<(String, CommandReply)>>>,
    fail_delivery: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl MockChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a command; the next `receive()` returns it.
    pub async fn inject(&self, sender: &str, command: Command) {
        self.inbound.lock().await.push_back(InboundCommand {
            sender: sender.to_string(),
            command,
        });
        self.notify.notify_one();
    }

    /// Make every following `deliver()` fail until reset.
    pub fn set_delivery_failure(&self, failing: bool) {
        self.fail_delivery.store(failing, Ordering::SeqCst);
    }

    pub async fn deliveries(&self) -> Vec<(String, PublicationSummary)> {
        self.delivered.lock().await.clone()
    }

    pub async fn delivery_count(&self) -> usize {
        self.delivered.lock().await.len()
    }

    pub async fn replies(&self) -> Vec<(String, CommandReply)> {
        self.replies.lock().await.clone()
    }

    pub async fn clear(&self) {
        self.delivered.lock().await.clear();
        self.replies.lock().await.clear();
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, PressroomError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PressroomError> {
        Ok(())
    }
}

#[async_trait]
impl OperatorChannel for MockChannel {
    async fn connect(&mut self) -> Result<(), PressroomError> {
        Ok(())
    }

    async fn deliver(
        &self,
        recipient: &str,
        summary: &PublicationSummary,
    ) -> Result<(), PressroomError> {
        if self.fail_delivery.load(Ordering::SeqCst) {
            return Err(PressroomError::DeliveryFailure {
                message: "mock channel unreachable".into(),
                source: None,
            });
        }
        self.delivered
            .lock()
            .await
            .push((recipient.to_string(), summary.clone()));
        Ok(())
    }

    async fn reply(&self, recipient: &str, reply: &CommandReply) -> Result<(), PressroomError> {
        self.replies
            .lock()
            .await
            .push((recipient.to_string(), reply.clone()));
        Ok(())
    }

    async fn receive(&self) -> Result<InboundCommand, PressroomError> {
        loop {
            {
                let mut queue = self.inbound.lock().await;
                if let Some(cmd) = queue.pop_front() {
                    return Ok(cmd);
                }
            }
            self.notify.notified().await;
        }
    }
}
