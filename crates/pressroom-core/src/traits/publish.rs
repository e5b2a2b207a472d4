// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publishing platform client trait.

use async_trait::async_trait;

use crate::error::PressroomError;
use crate::traits::adapter::PluginAdapter;
use crate::types::PublishOutcome;

/// Posts approved content to the publishing platform.
#[async_trait]
pub trait PublishClient: PluginAdapter {
    /// A missing or expired credential is reported as
    /// [`PublishOutcome::NeedsReauth`], not as an error.
    async fn publish(
        &self,
        content: &str,
        image: Option<&[u8]>,
    ) -> Result<PublishOutcome, PressroomError>;
}
