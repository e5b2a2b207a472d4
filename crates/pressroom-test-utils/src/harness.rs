// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness wiring the producer, controller and publish workflow over a
//! temporary SQLite database and mock adapters.

use std::sync::Arc;

use pressroom_agent::{
    ControllerSettings, DefaultRetrievalPipeline, ProducerReport, PublicationsProducer,
    PublishWorkflow, SuggestionController,
};
use pressroom_config::PressroomConfig;
use pressroom_config::model::StorageConfig;
use pressroom_context::CheckpointManager;
use pressroom_core::{
    Command, CommandReply, Draft, InboundCommand, PressroomError, PublicationId, SourceKind,
    SourceMetadata, StorageAdapter,
};
use pressroom_storage::SqliteStorage;
use tokio_util::sync::CancellationToken;

use crate::mock_channel::MockChannel;
use crate::mock_generation::MockGeneration;
use crate::mock_publisher::MockPublisher;

/// Identity used by [`TestHarness::start`].
pub const OPERATOR: &str = "operator-1";

/// Open and migrate a throwaway database. Keep the `TempDir` alive.
pub async fn temp_storage() -> (Arc<SqliteStorage>, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("temp dir");
    let storage = SqliteStorage::new(StorageConfig {
        database_path: dir.path().join("test.db").to_string_lossy().into_owned(),
        wal_mode: true,
    });
    storage.initialize().await.expect("storage init");
    (Arc::new(storage), dir)
}

pub struct TestHarnessBuilder {
    responses: Vec<String>,
    config: PressroomConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            responses: Vec::new(),
            config: PressroomConfig::default(),
        }
    }

    /// Scripted generation replies, consumed in order.
    pub fn with_responses<I, S>(mut self, responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.responses = responses.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_config(mut self, config: PressroomConfig) -> Self {
        self.config = config;
        self
    }

    pub async fn build(self) -> Result<TestHarness, PressroomError> {
        let (storage, temp_dir) = temp_storage().await;
        let channel = Arc::new(MockChannel::new());
        let model = Arc::new(MockGeneration::with_responses(self.responses));
        let publisher = Arc::new(MockPublisher::new());
        let checkpoints = Arc::new(CheckpointManager::new(
            storage.clone(),
            &self.config.conversation,
        ));
        let workflow = Arc::new(PublishWorkflow::new(
            storage.clone(),
            publisher.clone(),
            checkpoints.clone(),
        ));
        let producer = PublicationsProducer::new(
            storage.clone(),
            model.clone(),
            Arc::new(DefaultRetrievalPipeline::new(model.clone())),
            checkpoints.clone(),
            "You are a test copywriter.",
            self.config.producer.clone(),
        );
        let controller = SuggestionController::new(
            storage.clone(),
            channel.clone(),
            model.clone(),
            checkpoints.clone(),
            workflow.clone(),
            ControllerSettings::from_config(&self.config),
        )
        .await?;

        Ok(TestHarness {
            storage,
            channel,
            model,
            publisher,
            checkpoints,
            workflow,
            producer,
            controller,
            config: self.config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete lifecycle stack with mock adapters and temp storage.
pub struct TestHarness {
    pub storage: Arc<SqliteStorage>,
    pub channel: Arc<MockChannel>,
    pub model: Arc<MockGeneration>,
    pub publisher: Arc<MockPublisher>,
    pub checkpoints: Arc<CheckpointManager>,
    pub workflow: Arc<PublishWorkflow>,
    pub producer: PublicationsProducer,
    pub controller: SuggestionController,
    pub config: PressroomConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Persist a manual-source draft with the given title and body.
    pub async fn add_draft(&self, title: &str, body: &str) -> Result<PublicationId, PressroomError> {
        let mut metadata = SourceMetadata::new(SourceKind::Manual, body);
        metadata.title = Some(title.to_string());
        Ok(self.storage.create_publication(&Draft::new(metadata)).await?.id)
    }

    /// Run one producer cycle.
    pub async fn produce(&self) -> Result<ProducerReport, PressroomError> {
        self.producer.process_cycle(&CancellationToken::new()).await
    }

    /// Add `titles.len()` drafts and advance them all to pending approval.
    pub async fn add_pending(&self, titles: &[&str]) -> Result<Vec<PublicationId>, PressroomError> {
        let mut ids = Vec::with_capacity(titles.len());
        for title in titles {
            ids.push(self.add_draft(title, &format!("{title} body")).await?);
        }
        self.produce().await?;
        Ok(ids)
    }

    /// Send a command as `sender` and return the reply.
    pub async fn command_from(&self, sender: &str, command: Command) -> CommandReply {
        self.controller
            .handle_command(InboundCommand {
                sender: sender.to_string(),
                command,
            })
            .await
    }

    /// Send a command as the bound operator.
    pub async fn command(&self, command: Command) -> CommandReply {
        self.command_from(OPERATOR, command).await
    }

    /// Bind [`OPERATOR`] to the controller.
    pub async fn start(&self) -> CommandReply {
        self.command(Command::Start).await
    }
}
