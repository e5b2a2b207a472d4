// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `pressroom status` command implementation.
//!
//! Reads the database directly, so it works whether or not `serve` is
//! running: publication counts, the controller state and the approval
//! queue in delivery order.

use std::collections::BTreeMap;
use std::io::IsTerminal;

use chrono::{DateTime, Utc};
use pressroom_config::PressroomConfig;
use pressroom_core::format::truncate_chars;
use pressroom_core::{ControllerState, PressroomError, PublicationState, StorageAdapter};
use pressroom_storage::SqliteStorage;
use serde::Serialize;

const LABEL_CHARS: usize = 60;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub database: String,
    pub publications: BTreeMap<String, i64>,
    pub controller: ControllerStatus,
    pub queue: Vec<QueueEntry>,
}

#[derive(Debug, Serialize)]
pub struct ControllerStatus {
    pub phase: String,
    pub suggestions_blocked: bool,
    pub operator_paused: bool,
    pub delivery_failed: bool,
    pub operator_bound: bool,
    pub current_publication: Option<String>,
    pub last_published_at: Option<DateTime<Utc>>,
    pub cool_off_until: Option<DateTime<Utc>>,
}

impl From<&ControllerState> for ControllerStatus {
    fn from(state: &ControllerState) -> Self {
        Self {
            phase: state.phase.to_string(),
            suggestions_blocked: state.suggestions_blocked,
            operator_paused: state.operator_paused,
            delivery_failed: state.delivery_failed,
            operator_bound: state.operator_identity.is_some(),
            current_publication: state.current_publication.as_ref().map(|id| id.to_string()),
            last_published_at: state.last_published_at,
            cool_off_until: state.cool_off_until,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct QueueEntry {
    pub index: usize,
    pub id: String,
    pub label: String,
    pub source: String,
}

/// Gather the status report from an initialized store.
pub async fn collect_status(
    storage: &SqliteStorage,
    database: &str,
) -> Result<StatusReport, PressroomError> {
    let mut publications: BTreeMap<String, i64> = [
        PublicationState::Draft,
        PublicationState::PendingApproval,
        PublicationState::Published,
        PublicationState::Discarded,
    ]
    .iter()
    .map(|s| (s.to_string(), 0))
    .collect();
    for (state, count) in storage.count_by_state().await? {
        publications.insert(state.to_string(), count);
    }

    let state = storage.load_controller_state().await?;

    let mut queue = Vec::new();
    for (index, id) in storage.pending_publication_ids().await?.into_iter().enumerate() {
        let Some(publication) = storage.get_publication(&id).await? else {
            continue;
        };
        let label = publication
            .source_metadata
            .title
            .clone()
            .unwrap_or_else(|| truncate_chars(publication.body(), LABEL_CHARS));
        queue.push(QueueEntry {
            index,
            id: id.to_string(),
            label,
            source: publication.source_metadata.source_type.to_string(),
        });
    }

    Ok(StatusReport {
        database: database.to_string(),
        publications,
        controller: ControllerStatus::from(&state),
        queue,
    })
}

/// Run the `pressroom status` command.
pub async fn run_status(
    config: &PressroomConfig,
    json: bool,
    plain: bool,
) -> Result<(), PressroomError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let report = collect_status(&storage, &config.storage.database_path).await;
    storage.close().await?;
    let report = report?;

    if json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|e| PressroomError::Internal(format!("failed to render status: {e}")))?;
        println!("{rendered}");
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print!("{}", render_status(&report, use_color));
    }
    Ok(())
}

fn flag(on: bool, on_text: &str, off_text: &str, use_color: bool) -> String {
    use colored::Colorize;
    match (on, use_color) {
        (true, true) => on_text.yellow().to_string(),
        (false, true) => off_text.green().to_string(),
        (true, false) => on_text.to_string(),
        (false, false) => off_text.to_string(),
    }
}

/// Human-readable status text.
pub fn render_status(report: &StatusReport, use_color: bool) -> String {
    use colored::Colorize;
    use std::fmt::Write;

    let c = &report.controller;
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "  pressroom status");
    let _ = writeln!(out, "  {}", "-".repeat(35));
    let _ = writeln!(out, "    Database:    {}", report.database);
    let _ = writeln!(out, "    Phase:       {}", c.phase);
    let _ = writeln!(
        out,
        "    Suggestions: {}",
        flag(c.suggestions_blocked, "blocked", "allowed", use_color)
    );
    if c.operator_paused {
        let _ = writeln!(out, "                 stopped by the operator");
    }
    if c.delivery_failed {
        let _ = writeln!(out, "                 last delivery failed, send allow to resume");
    }
    let _ = writeln!(
        out,
        "    Operator:    {}",
        flag(!c.operator_bound, "not bound (send start)", "bound", use_color)
    );
    if let Some(until) = c.cool_off_until {
        let _ = writeln!(out, "    Cool-off:    until {}", until.format("%Y-%m-%d %H:%M UTC"));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "  Publications");
    for (state, count) in &report.publications {
        let _ = writeln!(out, "    {state:<17} {count}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "  Approval queue ({})", report.queue.len());
    for entry in &report.queue {
        let marker = if c.current_publication.as_deref() == Some(entry.id.as_str()) {
            if use_color { "▸".cyan().to_string() } else { ">".to_string() }
        } else {
            " ".to_string()
        };
        let _ = writeln!(
            out,
            "  {marker} {:>3}  {}  [{}]",
            entry.index, entry.label, entry.source
        );
    }
    let _ = writeln!(out);
    out
}
