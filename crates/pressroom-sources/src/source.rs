// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The closed set of source variants behind one [`SourceAdapter`] impl.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pressroom_config::PressroomConfig;
use pressroom_core::{
    AdapterType, Draft, DraftOrigin, HealthStatus, PluginAdapter, PressroomError, RequestBudget,
    SourceAdapter, SourceKind, SourceScheduleRecord, StorageAdapter,
};
use tracing::info;

use crate::arxiv::ArxivSource;
use crate::google_news::GoogleNewsSource;
use crate::manual::ManualSource;
use crate::medium::MediumSource;
use crate::youtube::{YoutubeSource, is_youtube_url};

pub enum Source {
    Arxiv(ArxivSource),
    GoogleNews(GoogleNewsSource),
    Medium(MediumSource),
    Youtube(YoutubeSource),
    Manual(ManualSource),
}

impl Source {
    /// Build the adapter for `kind` from its config section.
    pub fn build(
        kind: SourceKind,
        config: &PressroomConfig,
        storage: Arc<dyn StorageAdapter>,
    ) -> Result<Self, PressroomError> {
        let section = config.sources.get(kind);
        let timeout = Duration::from_secs(config.rapid.timeout_secs);
        Ok(match kind {
            SourceKind::Arxiv => Self::Arxiv(ArxivSource::new(section, timeout)?),
            SourceKind::GoogleNews => {
                Self::GoogleNews(GoogleNewsSource::new(section, &config.rapid)?)
            }
            SourceKind::Medium => Self::Medium(MediumSource::new(section, &config.rapid)?),
            SourceKind::Youtube => {
                Self::Youtube(YoutubeSource::new(section, &config.rapid, storage)?)
            }
            SourceKind::Manual => Self::Manual(ManualSource::new(section, storage, timeout)?),
        })
    }

    /// Every source whose config section is active.
    pub fn build_active(
        config: &PressroomConfig,
        storage: Arc<dyn StorageAdapter>,
    ) -> Result<Vec<Self>, PressroomError> {
        let sources = SourceKind::ALL
            .iter()
            .filter(|kind| config.sources.get(**kind).active)
            .map(|kind| Self::build(*kind, config, storage.clone()))
            .collect::<Result<Vec<_>, _>>()?;
        info!(
            sources = ?sources.iter().map(|s| s.kind()).collect::<Vec<_>>(),
            "source adapters built"
        );
        Ok(sources)
    }
}

/// Which pooled source a reference queued by the operator belongs to.
pub fn classify_reference(reference: &str) -> SourceKind {
    if is_youtube_url(reference) {
        SourceKind::Youtube
    } else {
        SourceKind::Manual
    }
}

#[async_trait]
impl PluginAdapter for Source {
    fn name(&self) -> &str {
        match self {
            Self::Arxiv(_) => "arxiv",
            Self::GoogleNews(_) => "google_news",
            Self::Medium(_) => "medium",
            Self::Youtube(_) => "youtube",
            Self::Manual(_) => "manual",
        }
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Source
    }

    async fn health_check(&self) -> Result<HealthStatus, PressroomError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), PressroomError> {
        Ok(())
    }
}

#[async_trait]
impl SourceAdapter for Source {
    fn kind(&self) -> SourceKind {
        match self {
            Self::Arxiv(_) => SourceKind::Arxiv,
            Self::GoogleNews(_) => SourceKind::GoogleNews,
            Self::Medium(_) => SourceKind::Medium,
            Self::Youtube(_) => SourceKind::Youtube,
            Self::Manual(_) => SourceKind::Manual,
        }
    }

    async fn fetch(
        &self,
        record: &SourceScheduleRecord,
        budget: &RequestBudget,
    ) -> Result<Vec<Draft>, PressroomError> {
        match self {
            Self::Arxiv(s) => s.fetch(record, budget).await,
            Self::GoogleNews(s) => s.fetch(budget).await,
            Self::Medium(s) => s.fetch(budget).await,
            Self::Youtube(s) => s.fetch(budget).await,
            Self::Manual(s) => s.fetch().await,
        }
    }

    async fn acknowledge(&self, origins: &[DraftOrigin]) -> Result<(), PressroomError> {
        match self {
            Self::Manual(s) => s.acknowledge(origins).await,
            _ => Ok(()),
        }
    }
}
