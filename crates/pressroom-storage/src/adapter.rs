// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use pressroom_config::model::StorageConfig;
use pressroom_core::{
    AdapterType, ControllerState, Draft, HealthStatus, PluginAdapter, PressroomError,
    Publication, PublicationId, PublicationState, SourceItem, SourceKind, SourceScheduleRecord,
    StorageAdapter, Turn,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules. The
/// database is opened on the first call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns the underlying Database, or an error if not initialized.
    pub fn db(&self) -> Result<&Database, PressroomError> {
        self.db.get().ok_or_else(|| PressroomError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    /// Publication counts per state, for status output.
    pub async fn count_by_state(&self) -> Result<Vec<(PublicationState, i64)>, PressroomError> {
        queries::publications::count_by_state(self.db()?).await
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, PressroomError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PressroomError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), PressroomError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| PressroomError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), PressroomError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Publications ---

    async fn create_publication(&self, draft: &Draft) -> Result<Publication, PressroomError> {
        queries::publications::insert_draft(self.db()?, draft).await
    }

    async fn get_publication(
        &self,
        id: &PublicationId,
    ) -> Result<Option<Publication>, PressroomError> {
        queries::publications::get_publication(self.db()?, id).await
    }

    async fn list_publications(
        &self,
        state: PublicationState,
    ) -> Result<Vec<Publication>, PressroomError> {
        queries::publications::list_by_state(self.db()?, state).await
    }

    async fn pending_publication_ids(&self) -> Result<Vec<PublicationId>, PressroomError> {
        queries::publications::pending_ids(self.db()?).await
    }

    async fn update_content(
        &self,
        id: &PublicationId,
        content: &str,
    ) -> Result<(), PressroomError> {
        queries::publications::update_content(self.db()?, id, content).await
    }

    async fn set_image(
        &self,
        id: &PublicationId,
        image: Option<Vec<u8>>,
    ) -> Result<(), PressroomError> {
        queries::publications::set_image(self.db()?, id, image).await
    }

    async fn transition_state(
        &self,
        id: &PublicationId,
        expected: PublicationState,
        next: PublicationState,
    ) -> Result<(), PressroomError> {
        queries::publications::transition(self.db()?, id, expected, next).await
    }

    // --- Source schedules ---

    async fn get_schedule(
        &self,
        source: SourceKind,
    ) -> Result<Option<SourceScheduleRecord>, PressroomError> {
        queries::schedules::get_schedule(self.db()?, source).await
    }

    async fn list_schedules(&self) -> Result<Vec<SourceScheduleRecord>, PressroomError> {
        queries::schedules::list_schedules(self.db()?).await
    }

    async fn save_schedule(&self, record: &SourceScheduleRecord) -> Result<(), PressroomError> {
        queries::schedules::save_schedule(self.db()?, record).await
    }

    async fn commit_source_run(
        &self,
        drafts: &[Draft],
        released_items: &[i64],
        record: &SourceScheduleRecord,
    ) -> Result<Vec<PublicationId>, PressroomError> {
        queries::source_runs::commit_source_run(self.db()?, drafts, released_items, record).await
    }

    // --- Controller ---

    async fn load_controller_state(&self) -> Result<ControllerState, PressroomError> {
        queries::controller::load_controller_state(self.db()?).await
    }

    async fn save_controller_state(&self, state: &ControllerState) -> Result<(), PressroomError> {
        queries::controller::save_controller_state(self.db()?, state).await
    }

    // --- Checkpoints ---

    async fn load_checkpoint(&self, id: &PublicationId) -> Result<Vec<Turn>, PressroomError> {
        queries::checkpoints::load_turns(self.db()?, id).await
    }

    async fn write_checkpoint(
        &self,
        id: &PublicationId,
        turns: &[Turn],
    ) -> Result<(), PressroomError> {
        queries::checkpoints::write_turns(self.db()?, id, turns).await
    }

    async fn delete_checkpoint(&self, id: &PublicationId) -> Result<(), PressroomError> {
        queries::checkpoints::delete_turns(self.db()?, id).await
    }

    // --- Source items ---

    async fn add_source_item(
        &self,
        source: SourceKind,
        reference: &str,
    ) -> Result<bool, PressroomError> {
        queries::source_items::add_item(self.db()?, source, reference).await
    }

    async fn list_source_items(
        &self,
        source: SourceKind,
    ) -> Result<Vec<SourceItem>, PressroomError> {
        queries::source_items::list_items(self.db()?, source).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_in(dir: &tempfile::TempDir) -> StorageConfig {
        StorageConfig {
            database_path: dir.path().join("adapter.db").to_string_lossy().into_owned(),
            wal_mode: true,
        }
    }

    #[tokio::test]
    async fn uninitialized_storage_errors() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::new(config_in(&dir));
        assert!(storage.pending_publication_ids().await.is_err());
        // Shutdown before initialize is a no-op.
        storage.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let storage = SqliteStorage::new(config_in(&dir));
        storage.initialize().await.unwrap();
        assert!(storage.initialize().await.is_err());
        assert_eq!(storage.health_check().await.unwrap(), HealthStatus::Healthy);
        assert_eq!(storage.adapter_type(), AdapterType::Storage);
        storage.close().await.unwrap();
    }
}
