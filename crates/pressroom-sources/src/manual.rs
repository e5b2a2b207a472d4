// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Operator-supplied documents.
//!
//! Two inputs feed this source: references queued with `add_source_item`
//! (web pages or local files) and `.txt`/`.md` files dropped into the inbox
//! directory. Every draft names where it came from: pooled references are
//! released by the scheduler's commit, inbox files are moved to `processed/`
//! by [`ManualSource::acknowledge`] once that commit succeeded.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use pressroom_config::SourceConfig;
use pressroom_core::{
    Draft, DraftOrigin, PressroomError, SourceKind, SourceMetadata, StorageAdapter,
};
use tracing::{debug, info, warn};

use crate::rapid::{fetch_page_text, http_client};

const KIND: SourceKind = SourceKind::Manual;
const PROCESSED_DIR: &str = "processed";
const INBOX_EXTENSIONS: [&str; 2] = ["txt", "md"];

fn io_err(context: String) -> impl FnOnce(std::io::Error) -> PressroomError {
    move |e| PressroomError::TransientSource {
        kind: KIND,
        message: format!("{context}: {e}"),
        source: Some(Box::new(e)),
    }
}

fn is_web_reference(reference: &str) -> bool {
    reference.starts_with("http://") || reference.starts_with("https://")
}

fn title_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .map(|s| s.to_string_lossy().replace(['_', '-'], " "))
}

pub struct ManualSource {
    storage: Arc<dyn StorageAdapter>,
    client: reqwest::Client,
    inbox_dir: Option<PathBuf>,
}

impl ManualSource {
    pub fn new(
        config: &SourceConfig,
        storage: Arc<dyn StorageAdapter>,
        timeout: Duration,
    ) -> Result<Self, PressroomError> {
        Ok(Self {
            storage,
            client: http_client(KIND, timeout)?,
            inbox_dir: config.inbox_dir.as_ref().map(PathBuf::from),
        })
    }

    pub async fn fetch(&self) -> Result<Vec<Draft>, PressroomError> {
        let mut drafts = self.drain_pool().await?;
        if let Some(dir) = &self.inbox_dir {
            drafts.extend(self.scan_inbox(dir).await?);
        }
        Ok(drafts)
    }

    async fn drain_pool(&self) -> Result<Vec<Draft>, PressroomError> {
        let items = self.storage.list_source_items(KIND).await?;
        let mut drafts = Vec::new();
        for item in items {
            let result = if is_web_reference(&item.reference) {
                self.from_web(&item.reference).await
            } else {
                self.from_file(Path::new(&item.reference)).await
            };
            match result {
                Ok(draft) => drafts.push(draft.with_origin(DraftOrigin::PoolItem(item.id))),
                Err(e) => warn!(reference = %item.reference, error = %e, "manual item kept for retry"),
            }
        }
        Ok(drafts)
    }

    async fn from_web(&self, url: &str) -> Result<Draft, PressroomError> {
        let text = fetch_page_text(&self.client, KIND, url).await?;
        let title = text
            .lines()
            .map(|l| l.trim_start_matches('#').trim())
            .find(|l| !l.is_empty())
            .map(str::to_string);
        let mut metadata = SourceMetadata::new(KIND, text);
        metadata.title = title;
        metadata.link = Some(url.to_string());
        Ok(Draft::new(metadata))
    }

    async fn from_file(&self, path: &Path) -> Result<Draft, PressroomError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(io_err(format!("failed to read {}", path.display())))?;
        let mut metadata = SourceMetadata::new(KIND, text);
        metadata.title = title_from_path(path);
        Ok(Draft::new(metadata))
    }

    async fn scan_inbox(&self, dir: &Path) -> Result<Vec<Draft>, PressroomError> {
        if !tokio::fs::try_exists(dir).await.unwrap_or(false) {
            debug!(dir = %dir.display(), "inbox directory does not exist");
            return Ok(Vec::new());
        }

        let mut entries = tokio::fs::read_dir(dir)
            .await
            .map_err(io_err(format!("failed to list {}", dir.display())))?;
        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(io_err(format!("failed to list {}", dir.display())))?
        {
            let path = entry.path();
            let wanted = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| INBOX_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
            if wanted && path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let mut drafts = Vec::with_capacity(files.len());
        for path in files {
            let draft = self.from_file(&path).await?;
            drafts.push(draft.with_origin(DraftOrigin::InboxFile(path)));
        }
        info!(count = drafts.len(), "inbox documents collected");
        Ok(drafts)
    }

    /// Move committed inbox files into `processed/` next to them.
    pub async fn acknowledge(&self, origins: &[DraftOrigin]) -> Result<(), PressroomError> {
        for origin in origins {
            let DraftOrigin::InboxFile(path) = origin else {
                continue;
            };
            let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
                continue;
            };
            let processed = parent.join(PROCESSED_DIR);
            tokio::fs::create_dir_all(&processed)
                .await
                .map_err(io_err(format!("failed to create {}", processed.display())))?;
            tokio::fs::rename(path, processed.join(name))
                .await
                .map_err(io_err(format!("failed to move {}", path.display())))?;
            debug!(file = %path.display(), "inbox file processed");
        }
        Ok(())
    }
}
