// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic ingestion across all active sources.
//!
//! Each cycle loads every source's schedule record and runs the due ones (in
//! parallel unless `one_by_one` is set). A successful run commits its drafts,
//! the pool items they came from and the updated record in one transaction.
//! A failing source is logged and retried next cycle; it never takes siblings
//! down with it. Requests spent by a failed run still count.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use pressroom_config::SourceConfig;
use pressroom_config::model::SourcesConfig;
use pressroom_core::{
    Draft, DraftOrigin, PressroomError, RequestBudget, SourceAdapter, SourceKind,
    SourceScheduleRecord, StorageAdapter,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::filter::ContentFilter;

/// What happened to one source during a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceOutcome {
    NotDue,
    QuotaExhausted,
    /// Ran successfully and persisted this many drafts.
    Fetched(usize),
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub outcomes: Vec<(SourceKind, SourceOutcome)>,
}

impl CycleReport {
    pub fn drafts_saved(&self) -> usize {
        self.outcomes
            .iter()
            .map(|(_, o)| match o {
                SourceOutcome::Fetched(n) => *n,
                _ => 0,
            })
            .sum()
    }

    pub fn outcome(&self, kind: SourceKind) -> Option<SourceOutcome> {
        self.outcomes
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, o)| *o)
    }
}

pub struct SourcesScheduler {
    storage: Arc<dyn StorageAdapter>,
    sources: Vec<Arc<dyn SourceAdapter>>,
    config: SourcesConfig,
    filter: ContentFilter,
}

impl SourcesScheduler {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        sources: Vec<Arc<dyn SourceAdapter>>,
        config: SourcesConfig,
    ) -> Self {
        let filter = ContentFilter::from(&config);
        Self {
            storage,
            sources,
            config,
            filter,
        }
    }

    fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.config.fetch_timeout_secs)
    }

    /// Run every due source once.
    pub async fn run_cycle(&self, now: DateTime<Utc>) -> CycleReport {
        let outcomes = if self.config.one_by_one {
            let mut outcomes = Vec::with_capacity(self.sources.len());
            for source in &self.sources {
                outcomes.push((source.kind(), self.run_source(source.as_ref(), now).await));
            }
            outcomes
        } else {
            join_all(self.sources.iter().map(|source| async move {
                (source.kind(), self.run_source(source.as_ref(), now).await)
            }))
            .await
        };

        let report = CycleReport { outcomes };
        debug!(drafts = report.drafts_saved(), "source cycle complete");
        report
    }

    async fn run_source(&self, source: &dyn SourceAdapter, now: DateTime<Utc>) -> SourceOutcome {
        let kind = source.kind();
        match self.try_run_source(source, now).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(source = %kind, error = %e, "source run aborted");
                SourceOutcome::Failed
            }
        }
    }

    async fn try_run_source(
        &self,
        source: &dyn SourceAdapter,
        now: DateTime<Utc>,
    ) -> Result<SourceOutcome, PressroomError> {
        let kind = source.kind();
        let section = self.config.get(kind);
        let mut record = self
            .storage
            .get_schedule(kind)
            .await?
            .unwrap_or_else(|| SourceScheduleRecord::new(kind, section.execution_period_days));
        apply_config(&mut record, section);

        if !record.is_due(now) {
            debug!(source = %kind, next_due = ?record.next_attempt_at(), "source not due");
            return Ok(SourceOutcome::NotDue);
        }

        record.roll_quota_window(now);
        if record.quota_exhausted() {
            info!(
                source = %kind,
                count = record.request_count,
                resets_at = ?record.count_reset_time,
                "request quota exhausted, skipping"
            );
            return Ok(SourceOutcome::QuotaExhausted);
        }

        let budget = RequestBudget::for_record(&record);
        let fetched = match tokio::time::timeout(self.fetch_timeout(), source.fetch(&record, &budget))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(PressroomError::Timeout {
                duration: self.fetch_timeout(),
            }),
        };
        record.request_count = budget.used();

        let drafts = match fetched {
            Ok(drafts) => drafts,
            Err(e) => {
                self.storage.save_schedule(&record).await?;
                return Ok(match e {
                    PressroomError::QuotaExhausted { .. } => {
                        info!(source = %kind, count = record.request_count, "request limit reached during fetch");
                        SourceOutcome::QuotaExhausted
                    }
                    e => {
                        warn!(source = %kind, error = %e, "source fetch failed, will retry next cycle");
                        SourceOutcome::Failed
                    }
                });
            }
        };

        // Filtered drafts still release their input, or it would be refetched forever.
        let origins: Vec<DraftOrigin> = drafts.iter().filter_map(|d| d.origin.clone()).collect();
        let released: Vec<i64> = drafts.iter().filter_map(Draft::pool_item).collect();
        let drafts = self.filter.apply(drafts);

        let previous_run = record.last_run_time.replace(now);
        let saved = match self
            .storage
            .commit_source_run(&drafts, &released, &record)
            .await
        {
            Ok(saved) => saved,
            Err(e) => {
                record.last_run_time = previous_run;
                if let Err(save_err) = self.storage.save_schedule(&record).await {
                    warn!(source = %kind, error = %save_err, "could not record spent requests");
                }
                return Err(e);
            }
        };
        for id in &saved {
            debug!(source = %kind, publication_id = %id, "draft saved");
        }

        if let Err(e) = source.acknowledge(&origins).await {
            warn!(source = %kind, error = %e, "committed input could not be acknowledged");
        }

        info!(source = %kind, drafts = saved.len(), requests = record.request_count, "source fetched");
        Ok(SourceOutcome::Fetched(saved.len()))
    }

    /// Earliest moment any active source becomes due again.
    pub async fn next_due(&self, now: DateTime<Utc>) -> Result<Option<DateTime<Utc>>, PressroomError> {
        let records = self.storage.list_schedules().await?;
        let mut earliest: Option<DateTime<Utc>> = None;
        for source in &self.sources {
            let kind = source.kind();
            let section = self.config.get(kind);
            if !section.active {
                continue;
            }
            let due = records
                .iter()
                .find(|r| r.source == kind)
                .and_then(SourceScheduleRecord::next_attempt_at)
                .unwrap_or(now);
            earliest = Some(earliest.map_or(due, |e| e.min(due)));
        }
        Ok(earliest)
    }

    /// Run cycles until `cancel` fires. An in-flight cycle always completes.
    pub async fn run(&self, cancel: CancellationToken) {
        info!(sources = self.sources.len(), one_by_one = self.config.one_by_one, "sources scheduler running");
        let min = Duration::from_secs(self.config.min_poll_interval_secs);
        let max = Duration::from_secs(self.config.max_poll_interval_secs);

        while !cancel.is_cancelled() {
            let now = Utc::now();
            self.run_cycle(now).await;

            let next = match self.next_due(Utc::now()).await {
                Ok(next) => next,
                Err(e) => {
                    warn!(error = %e, "could not compute next due time");
                    None
                }
            };
            let wait = sleep_duration(Utc::now(), next, min, max);
            debug!(seconds = wait.as_secs(), "scheduler sleeping");

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(wait) => {}
            }
        }
        info!("sources scheduler stopped");
    }
}

/// Config is authoritative for the static fields; run state comes from storage.
fn apply_config(record: &mut SourceScheduleRecord, section: &SourceConfig) {
    record.active = section.active;
    record.execution_period_days = section.execution_period_days;
    record.request_limit = section.request_limit;
    record.quota_window_days = section.quota_window_days;
}

/// Time until `next_due`, clamped to `[min, max]`. No candidate means `max`.
pub fn sleep_duration(
    now: DateTime<Utc>,
    next_due: Option<DateTime<Utc>>,
    min: Duration,
    max: Duration,
) -> Duration {
    let wanted = match next_due {
        Some(due) => (due - now).to_std().unwrap_or(Duration::ZERO),
        None => max,
    };
    wanted.clamp(min, max.max(min))
}
