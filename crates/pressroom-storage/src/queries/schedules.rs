// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Source schedule records.

use pressroom_core::{PressroomError, SourceKind, SourceScheduleRecord};
use rusqlite::{OptionalExtension, Row, params};

use super::{format_ts, parse_enum, parse_ts};
use crate::database::Database;

const COLUMNS: &str = "source, last_run_time, execution_period_days, active, request_count, \
                       request_limit, quota_window_days, count_reset_time";

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<SourceScheduleRecord> {
    let source: String = row.get(0)?;
    Ok(SourceScheduleRecord {
        source: parse_enum(0, &source)?,
        last_run_time: parse_ts(1, row.get(1)?)?,
        execution_period_days: row.get(2)?,
        active: row.get(3)?,
        request_count: row.get(4)?,
        request_limit: row.get(5)?,
        quota_window_days: row.get(6)?,
        count_reset_time: parse_ts(7, row.get(7)?)?,
    })
}

pub async fn get_schedule(
    db: &Database,
    source: SourceKind,
) -> Result<Option<SourceScheduleRecord>, PressroomError> {
    let source = source.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM source_schedules WHERE source = ?1"),
                params![source],
                row_to_record,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn list_schedules(db: &Database) -> Result<Vec<SourceScheduleRecord>, PressroomError> {
    db.connection()
        .call(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {COLUMNS} FROM source_schedules ORDER BY source"))?;
            let rows = stmt.query_map([], row_to_record)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Upsert `record` on an open connection or transaction.
pub(crate) fn upsert_record(
    conn: &rusqlite::Connection,
    record: &SourceScheduleRecord,
) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO source_schedules (source, last_run_time, execution_period_days,
             active, request_count, request_limit, quota_window_days, count_reset_time)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT (source) DO UPDATE SET
             last_run_time = excluded.last_run_time,
             execution_period_days = excluded.execution_period_days,
             active = excluded.active,
             request_count = excluded.request_count,
             request_limit = excluded.request_limit,
             quota_window_days = excluded.quota_window_days,
             count_reset_time = excluded.count_reset_time,
             updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
        params![
            record.source.to_string(),
            record.last_run_time.as_ref().map(format_ts),
            record.execution_period_days,
            record.active,
            record.request_count,
            record.request_limit,
            record.quota_window_days,
            record.count_reset_time.as_ref().map(format_ts),
        ],
    )?;
    Ok(())
}

/// Insert or replace a schedule record in a single transaction.
pub async fn save_schedule(
    db: &Database,
    record: &SourceScheduleRecord,
) -> Result<(), PressroomError> {
    let record = record.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            upsert_record(&tx, &record)?;
            tx.commit()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
