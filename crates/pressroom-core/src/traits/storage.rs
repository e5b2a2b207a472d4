// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for persistence backends (SQLite, etc.).

use async_trait::async_trait;

use crate::error::PressroomError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{
    ControllerState, Draft, Publication, PublicationId, PublicationState, SourceItem, SourceKind,
    SourceScheduleRecord, Turn,
};

/// Persistence for publications, schedules, controller state and checkpoints.
///
/// Every state transition is an atomic check-and-set; callers never mutate
/// state by read-modify-write outside the store.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), PressroomError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), PressroomError>;

    // --- Publications ---

    /// Persists a draft as a new `DRAFT` publication.
    async fn create_publication(&self, draft: &Draft) -> Result<Publication, PressroomError>;

    async fn get_publication(
        &self,
        id: &PublicationId,
    ) -> Result<Option<Publication>, PressroomError>;

    /// Publications in `state`, ordered by creation time then insertion order.
    async fn list_publications(
        &self,
        state: PublicationState,
    ) -> Result<Vec<Publication>, PressroomError>;

    /// Ids of `PENDING_APPROVAL` publications in queue order.
    async fn pending_publication_ids(&self) -> Result<Vec<PublicationId>, PressroomError>;

    /// Replaces the post body. Fails on terminal publications.
    async fn update_content(
        &self,
        id: &PublicationId,
        content: &str,
    ) -> Result<(), PressroomError>;

    /// Sets or clears the image. Fails on terminal publications.
    async fn set_image(
        &self,
        id: &PublicationId,
        image: Option<Vec<u8>>,
    ) -> Result<(), PressroomError>;

    /// Moves `id` from `expected` to `next` if and only if it is currently in
    /// `expected`; otherwise returns `PreconditionFailed` and changes nothing.
    async fn transition_state(
        &self,
        id: &PublicationId,
        expected: PublicationState,
        next: PublicationState,
    ) -> Result<(), PressroomError>;

    // --- Source schedules ---

    async fn get_schedule(
        &self,
        source: SourceKind,
    ) -> Result<Option<SourceScheduleRecord>, PressroomError>;

    async fn list_schedules(&self) -> Result<Vec<SourceScheduleRecord>, PressroomError>;

    /// Writes a schedule record in a single transaction.
    async fn save_schedule(&self, record: &SourceScheduleRecord) -> Result<(), PressroomError>;

    /// Ends a successful source run in one transaction: inserts `drafts` as
    /// `DRAFT` publications, removes `released_items` from the source item
    /// pool and writes `record`. Either all of it lands or none of it does.
    async fn commit_source_run(
        &self,
        drafts: &[Draft],
        released_items: &[i64],
        record: &SourceScheduleRecord,
    ) -> Result<Vec<PublicationId>, PressroomError>;

    // --- Controller ---

    async fn load_controller_state(&self) -> Result<ControllerState, PressroomError>;

    async fn save_controller_state(&self, state: &ControllerState) -> Result<(), PressroomError>;

    // --- Checkpoints ---

    /// Retained turns in order; empty when no checkpoint exists.
    async fn load_checkpoint(&self, id: &PublicationId) -> Result<Vec<Turn>, PressroomError>;

    /// Atomically replaces the checkpoint with `turns`.
    async fn write_checkpoint(
        &self,
        id: &PublicationId,
        turns: &[Turn],
    ) -> Result<(), PressroomError>;

    /// Removes the checkpoint; a no-op when none exists.
    async fn delete_checkpoint(&self, id: &PublicationId) -> Result<(), PressroomError>;

    // --- Source items ---

    /// Queues a reference for a source. Returns `false` if already queued.
    async fn add_source_item(
        &self,
        source: SourceKind,
        reference: &str,
    ) -> Result<bool, PressroomError>;

    /// Queued references for `source`, oldest first.
    async fn list_source_items(
        &self,
        source: SourceKind,
    ) -> Result<Vec<SourceItem>, PressroomError>;
}
