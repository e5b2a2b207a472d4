// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source adapter trait.

use async_trait::async_trait;

use crate::error::PressroomError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Draft, DraftOrigin, RequestBudget, SourceKind, SourceScheduleRecord};

/// Fetches raw items from one external source and turns them into drafts.
///
/// Adapters never persist anything during `fetch`. Drafts built from operator
/// input carry a [`DraftOrigin`]; the scheduler releases pool items in the same
/// transaction that stores the drafts and hands the rest to
/// [`SourceAdapter::acknowledge`] afterwards.
#[async_trait]
pub trait SourceAdapter: PluginAdapter {
    fn kind(&self) -> SourceKind;

    /// Every call counted against the external quota takes a slot from `budget`.
    async fn fetch(
        &self,
        record: &SourceScheduleRecord,
        budget: &RequestBudget,
    ) -> Result<Vec<Draft>, PressroomError>;

    /// Called once the drafts built from `origins` are committed.
    async fn acknowledge(&self, _origins: &[DraftOrigin]) -> Result<(), PressroomError> {
        Ok(())
    }
}
