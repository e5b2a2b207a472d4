// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `pressroom serve` command implementation.
//!
//! Wires SQLite storage, the source adapters, the Anthropic model, the
//! LinkedIn publisher and the Telegram operator channel together, then runs
//! four loops until a shutdown signal arrives: source scheduling, draft
//! production, suggestion evaluation and operator command handling.

use std::sync::Arc;

use pressroom_agent::{
    ControllerSettings, DefaultRetrievalPipeline, PublicationsProducer, PublishWorkflow,
    SuggestionController, install_signal_handler,
};
use pressroom_anthropic::{AnthropicModel, load_system_prompt};
use pressroom_config::PressroomConfig;
use pressroom_context::CheckpointManager;
use pressroom_core::{
    GenerationModel, HealthStatus, OperatorChannel, PluginAdapter, PressroomError, PublishClient,
    SourceAdapter, StorageAdapter,
};
use pressroom_linkedin::LinkedInPublisher;
use pressroom_sources::{Source, SourcesScheduler};
use pressroom_storage::SqliteStorage;
use pressroom_telegram::TelegramChannel;
use tracing::{error, info, warn};

/// Runs the `pressroom serve` command.
pub async fn run_serve(config: PressroomConfig) -> Result<(), PressroomError> {
    init_tracing(&config.agent.log_level);
    info!(name = %config.agent.name, "starting pressroom serve");

    let sqlite = Arc::new(SqliteStorage::new(config.storage.clone()));
    sqlite.initialize().await?;
    let storage: Arc<dyn StorageAdapter> = sqlite.clone();

    let model: Arc<dyn GenerationModel> = Arc::new(AnthropicModel::new(&config)?);
    let system_prompt = load_system_prompt(&config.anthropic).await;
    let checkpoints = Arc::new(CheckpointManager::new(
        storage.clone(),
        &config.conversation,
    ));

    let sources: Vec<Arc<dyn SourceAdapter>> = Source::build_active(&config, storage.clone())?
        .into_iter()
        .map(|s| Arc::new(s) as Arc<dyn SourceAdapter>)
        .collect();
    let scheduler = Arc::new(SourcesScheduler::new(
        storage.clone(),
        sources,
        config.sources.clone(),
    ));

    let producer = Arc::new(PublicationsProducer::new(
        storage.clone(),
        model.clone(),
        Arc::new(DefaultRetrievalPipeline::new(model.clone())),
        checkpoints.clone(),
        system_prompt,
        config.producer.clone(),
    ));

    let publisher: Arc<dyn PublishClient> = Arc::new(LinkedInPublisher::new(&config.linkedin)?);
    report_health(publisher.as_ref()).await;
    let workflow = Arc::new(PublishWorkflow::new(
        storage.clone(),
        publisher,
        checkpoints.clone(),
    ));

    let mut telegram = TelegramChannel::new(config.telegram.clone())?;
    telegram.connect().await?;
    let channel: Arc<dyn OperatorChannel> = Arc::new(telegram);
    report_health(channel.as_ref()).await;

    let controller = Arc::new(
        SuggestionController::new(
            storage.clone(),
            channel.clone(),
            model,
            checkpoints,
            workflow,
            ControllerSettings::from_config(&config),
        )
        .await?,
    );

    let cancel = install_signal_handler();

    let mut tasks = Vec::with_capacity(4);
    {
        let scheduler = scheduler.clone();
        let cancel = cancel.clone();
        tasks.push(tokio::spawn(async move { scheduler.run(cancel).await }));
    }
    {
        let producer = producer.clone();
        let cancel = cancel.clone();
        tasks.push(tokio::spawn(async move { producer.run(cancel).await }));
    }
    {
        let controller = controller.clone();
        let cancel = cancel.clone();
        tasks.push(tokio::spawn(
            async move { controller.run_evaluation(cancel).await },
        ));
    }
    {
        let controller = controller.clone();
        let cancel = cancel.clone();
        tasks.push(tokio::spawn(async move { controller.run_commands(cancel).await }));
    }
    info!("all loops running");

    cancel.cancelled().await;
    for task in tasks {
        if let Err(e) = task.await {
            error!(error = %e, "background loop panicked");
        }
    }

    if let Err(e) = channel.shutdown().await {
        warn!(error = %e, "operator channel shutdown failed");
    }
    storage.close().await?;
    info!("pressroom serve shutdown complete");
    Ok(())
}

/// Log the startup health of an adapter without failing startup.
async fn report_health<A: PluginAdapter + ?Sized>(adapter: &A) {
    match adapter.health_check().await {
        Ok(HealthStatus::Healthy) => info!(adapter = adapter.name(), "adapter healthy"),
        Ok(HealthStatus::Degraded(reason)) => {
            warn!(adapter = adapter.name(), reason = %reason, "adapter degraded")
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            warn!(adapter = adapter.name(), reason = %reason, "adapter unhealthy")
        }
        Err(e) => warn!(adapter = adapter.name(), error = %e, "health check failed"),
    }
}

/// Initializes the tracing subscriber. `RUST_LOG` overrides the config level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pressroom={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
