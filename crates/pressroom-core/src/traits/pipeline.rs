// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retrieval pipeline trait.

use async_trait::async_trait;

use crate::error::PressroomError;
use crate::types::{CondenseConfig, Condensed};

/// Condenses long raw content into a question/answer dialog plus a title.
#[async_trait]
pub trait RetrievalPipeline: Send + Sync {
    async fn condense(
        &self,
        raw_content: &str,
        config: &CondenseConfig,
    ) -> Result<Condensed, PressroomError>;
}
