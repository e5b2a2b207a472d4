// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Terminal transitions of a publication: publish and discard.

use std::sync::Arc;

use pressroom_context::CheckpointManager;
use pressroom_core::{
    ExternalPostId, PressroomError, Publication, PublicationId, PublicationState, PublishClient,
    PublishOutcome, StorageAdapter,
};
use tracing::{info, warn};

pub struct PublishWorkflow {
    storage: Arc<dyn StorageAdapter>,
    publisher: Arc<dyn PublishClient>,
    checkpoints: Arc<CheckpointManager>,
}

impl PublishWorkflow {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        publisher: Arc<dyn PublishClient>,
        checkpoints: Arc<CheckpointManager>,
    ) -> Self {
        Self {
            storage,
            publisher,
            checkpoints,
        }
    }

    async fn pending(&self, id: &PublicationId) -> Result<Publication, PressroomError> {
        let publication = self
            .storage
            .get_publication(id)
            .await?
            .ok_or_else(|| PressroomError::PublicationNotFound(id.to_string()))?;
        if publication.state != PublicationState::PendingApproval {
            return Err(PressroomError::PreconditionFailed {
                publication_id: id.to_string(),
                expected: PublicationState::PendingApproval,
                actual: publication.state,
            });
        }
        Ok(publication)
    }

    /// Post the publication and mark it `PUBLISHED`.
    ///
    /// A missing or expired credential yields [`PressroomError::ReauthRequired`]
    /// and leaves the publication pending, as does any other failure.
    pub async fn publish(&self, id: &PublicationId) -> Result<ExternalPostId, PressroomError> {
        let publication = self.pending(id).await?;
        let outcome = self
            .publisher
            .publish(publication.body(), publication.image.as_deref())
            .await
            .inspect_err(|e| warn!(publication_id = %id, error = %e, "publish failed"))?;

        match outcome {
            PublishOutcome::NeedsReauth { auth_url } => {
                info!(publication_id = %id, "publishing credential needs renewal");
                Err(PressroomError::ReauthRequired { auth_url })
            }
            PublishOutcome::Published(post_id) => {
                self.storage
                    .transition_state(
                        id,
                        PublicationState::PendingApproval,
                        PublicationState::Published,
                    )
                    .await?;
                self.checkpoints.delete(id).await?;
                info!(publication_id = %id, post_id = %post_id.0, "publication published");
                Ok(post_id)
            }
        }
    }

    /// Mark the publication `DISCARDED` and drop its checkpoint.
    pub async fn discard(&self, id: &PublicationId) -> Result<(), PressroomError> {
        self.storage
            .transition_state(
                id,
                PublicationState::PendingApproval,
                PublicationState::Discarded,
            )
            .await?;
        self.checkpoints.delete(id).await?;
        info!(publication_id = %id, "publication discarded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pressroom_config::model::ConversationConfig;
    use pressroom_core::{Draft, SourceKind, SourceMetadata, Turn};
    use pressroom_storage::SqliteStorage;
    use pressroom_test_utils::{MockPublish, MockPublisher, temp_storage};
    use tracing_test::traced_test;

    struct Fixture {
        storage: Arc<SqliteStorage>,
        publisher: Arc<MockPublisher>,
        workflow: PublishWorkflow,
        _dir: tempfile::TempDir,
    }

    async fn fixture() -> Fixture {
        let (storage, dir) = temp_storage().await;
        let publisher = Arc::new(MockPublisher::new());
        let checkpoints = Arc::new(CheckpointManager::new(
            storage.clone(),
            &ConversationConfig::default(),
        ));
        let workflow = PublishWorkflow::new(storage.clone(), publisher.clone(), checkpoints);
        Fixture {
            storage,
            publisher,
            workflow,
            _dir: dir,
        }
    }

    async fn pending(storage: &SqliteStorage) -> PublicationId {
        let p = storage
            .create_publication(&Draft::new(SourceMetadata::new(SourceKind::Manual, "raw")))
            .await
            .unwrap();
        storage.update_content(&p.id, "the post").await.unwrap();
        storage
            .write_checkpoint(&p.id, &[Turn::system("s"), Turn::agent("the post")])
            .await
            .unwrap();
        storage
            .transition_state(&p.id, PublicationState::Draft, PublicationState::PendingApproval)
            .await
            .unwrap();
        p.id
    }

    #[tokio::test]
    async fn publish_success_is_terminal_and_drops_checkpoint() {
        let f = fixture().await;
        let id = pending(&f.storage).await;
        let post = f.workflow.publish(&id).await.unwrap();
        assert_eq!(post.0, "mock-post-1");

        let stored = f.storage.get_publication(&id).await.unwrap().unwrap();
        assert_eq!(stored.state, PublicationState::Published);
        assert!(f.storage.load_checkpoint(&id).await.unwrap().is_empty());
        assert_eq!(f.publisher.published().await[0].0, "the post");
    }

    #[tokio::test]
    async fn publishing_a_draft_fails_without_side_effects() {
        let f = fixture().await;
        let draft = f
            .storage
            .create_publication(&Draft::new(SourceMetadata::new(SourceKind::Manual, "raw")))
            .await
            .unwrap();
        let err = f.workflow.publish(&draft.id).await.unwrap_err();
        assert!(matches!(
            err,
            PressroomError::PreconditionFailed {
                actual: PublicationState::Draft,
                ..
            }
        ));
        assert!(f.publisher.published().await.is_empty());
        let stored = f.storage.get_publication(&draft.id).await.unwrap().unwrap();
        assert_eq!(stored.state, PublicationState::Draft);
        assert_eq!(stored.last_updated, draft.last_updated);
    }

    #[tokio::test]
    async fn reauth_keeps_publication_pending() {
        let f = fixture().await;
        let id = pending(&f.storage).await;
        f.publisher
            .push(MockPublish::NeedsReauth("https://auth.example".into()))
            .await;
        let err = f.workflow.publish(&id).await.unwrap_err();
        assert!(matches!(err, PressroomError::ReauthRequired { ref auth_url } if auth_url == "https://auth.example"));
        let stored = f.storage.get_publication(&id).await.unwrap().unwrap();
        assert_eq!(stored.state, PublicationState::PendingApproval);
        assert_eq!(f.storage.load_checkpoint(&id).await.unwrap().len(), 2);

        // Retry succeeds once the credential is back.
        f.workflow.publish(&id).await.unwrap();
    }

    #[tokio::test]
    #[traced_test]
    async fn outcomes_are_logged_with_the_publication_id() {
        let f = fixture().await;
        let id = pending(&f.storage).await;
        f.publisher.push(MockPublish::Fail("503".into())).await;
        assert!(f.workflow.publish(&id).await.is_err());
        assert!(logs_contain("publish failed"));

        f.workflow.publish(&id).await.unwrap();
        assert!(logs_contain("publication published"));
        assert!(logs_contain(id.as_str()));
    }

    #[tokio::test]
    async fn platform_failure_is_reported_and_changes_nothing() {
        let f = fixture().await;
        let id = pending(&f.storage).await;
        f.publisher.push(MockPublish::Fail("500".into())).await;
        let err = f.workflow.publish(&id).await.unwrap_err();
        assert_eq!(err.code(), "publish_failed");
        let stored = f.storage.get_publication(&id).await.unwrap().unwrap();
        assert_eq!(stored.state, PublicationState::PendingApproval);
    }

    #[tokio::test]
    async fn discard_and_missing_publication() {
        let f = fixture().await;
        let id = pending(&f.storage).await;
        f.workflow.discard(&id).await.unwrap();
        let stored = f.storage.get_publication(&id).await.unwrap().unwrap();
        assert_eq!(stored.state, PublicationState::Discarded);
        assert!(f.workflow.discard(&id).await.is_err());

        let err = f.workflow.publish(&PublicationId::from("nope")).await.unwrap_err();
        assert_eq!(err.code(), "not_found");
    }
}
