// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator channel trait (Telegram, test mocks).

use async_trait::async_trait;

use crate::error::PressroomError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{CommandReply, InboundCommand, PublicationSummary};

/// Bidirectional link to the single human operator.
#[async_trait]
pub trait OperatorChannel: PluginAdapter {
    /// Establishes the connection and starts receiving commands.
    async fn connect(&mut self) -> Result<(), PressroomError>;

    /// Delivers a suggestion. Failures are reported as
    /// [`PressroomError::DeliveryFailure`].
    async fn deliver(
        &self,
        recipient: &str,
        summary: &PublicationSummary,
    ) -> Result<(), PressroomError>;

    /// Sends the result of a command back to its sender.
    async fn reply(&self, recipient: &str, reply: &CommandReply) -> Result<(), PressroomError>;

    /// Receives the next inbound command.
    async fn receive(&self) -> Result<InboundCommand, PressroomError>;
}
