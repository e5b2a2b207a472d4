// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `pressroom sources` command implementation.

use std::io::IsTerminal;

use chrono::{DateTime, Utc};
use pressroom_config::PressroomConfig;
use pressroom_core::{PressroomError, SourceKind, SourceScheduleRecord, StorageAdapter};
use pressroom_storage::SqliteStorage;
use serde::Serialize;

/// One line of `pressroom sources` output.
#[derive(Debug, Serialize)]
pub struct SourceRow {
    pub source: String,
    pub active: bool,
    pub execution_period_days: u32,
    pub last_run_time: Option<DateTime<Utc>>,
    pub next_due_at: Option<DateTime<Utc>>,
    pub due_now: bool,
    pub requests: u32,
    pub request_limit: Option<u32>,
    pub count_reset_time: Option<DateTime<Utc>>,
}

/// Merge stored schedule records with the configuration. A source that
/// never ran has no record yet and is shown as due.
pub fn source_rows(
    config: &PressroomConfig,
    records: &[SourceScheduleRecord],
    now: DateTime<Utc>,
) -> Vec<SourceRow> {
    SourceKind::ALL
        .iter()
        .map(|kind| {
            let section = config.sources.get(*kind);
            let record = records
                .iter()
                .find(|r| r.source == *kind)
                .cloned()
                .unwrap_or_else(|| {
                    SourceScheduleRecord::new(*kind, section.execution_period_days)
                });
            SourceRow {
                source: kind.to_string(),
                active: section.active,
                execution_period_days: section.execution_period_days,
                last_run_time: record.last_run_time,
                next_due_at: record.next_due_at(),
                due_now: section.active && record.is_due(now),
                requests: record.request_count,
                request_limit: section.request_limit,
                count_reset_time: record.count_reset_time,
            }
        })
        .collect()
}

/// Run the `pressroom sources` command.
pub async fn run_sources(
    config: &PressroomConfig,
    json: bool,
    plain: bool,
) -> Result<(), PressroomError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let records = storage.list_schedules().await;
    storage.close().await?;
    let rows = source_rows(config, &records?, Utc::now());

    if json {
        let rendered = serde_json::to_string_pretty(&rows)
            .map_err(|e| PressroomError::Internal(format!("failed to render sources: {e}")))?;
        println!("{rendered}");
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print!("{}", render_sources(&rows, use_color));
    }
    Ok(())
}

fn when(time: Option<DateTime<Utc>>) -> String {
    time.map_or_else(|| "never".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}

/// Human-readable source table.
pub fn render_sources(rows: &[SourceRow], use_color: bool) -> String {
    use colored::Colorize;
    use std::fmt::Write;

    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "  pressroom sources");
    let _ = writeln!(out, "  {}", "-".repeat(35));
    for row in rows {
        let state = match (row.active, row.due_now) {
            (false, _) => "inactive",
            (true, true) => "due",
            (true, false) => "waiting",
        };
        let state = if use_color {
            match state {
                "due" => state.green().to_string(),
                "inactive" => state.dimmed().to_string(),
                _ => state.to_string(),
            }
        } else {
            state.to_string()
        };
        let quota = match row.request_limit {
            Some(limit) => format!("{}/{limit}", row.requests),
            None => "unlimited".to_string(),
        };
        let _ = writeln!(out, "    {:<12} {state}", row.source);
        let _ = writeln!(
            out,
            "      every {}d, last run {}, quota {quota}",
            row.execution_period_days,
            when(row.last_run_time)
        );
    }
    let _ = writeln!(out);
    out
}
