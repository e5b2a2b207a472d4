// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generation model trait.

use async_trait::async_trait;

use crate::error::PressroomError;
use crate::traits::adapter::PluginAdapter;
use crate::types::Turn;

/// A text generation backend.
#[async_trait]
pub trait GenerationModel: PluginAdapter {
    /// Generate a reply to `prompt`, given prior turns.
    ///
    /// A system turn in `history` becomes the system prompt. Operator turns map
    /// to the user role and agent turns to the assistant role.
    async fn generate(&self, prompt: &str, history: &[Turn]) -> Result<String, PressroomError>;
}
