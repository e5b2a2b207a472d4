// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pool of references queued for a source adapter.

use pressroom_core::{PressroomError, SourceItem, SourceKind};
use rusqlite::params;

use super::parse_enum;
use crate::database::Database;

/// Queue a reference. Returns `false` if it was already queued.
pub async fn add_item(
    db: &Database,
    source: SourceKind,
    reference: &str,
) -> Result<bool, PressroomError> {
    let source = source.to_string();
    let reference = reference.to_string();
    db.connection()
        .call(move |conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO source_items (source, reference) VALUES (?1, ?2)",
                params![source, reference],
            )?;
            Ok(inserted > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Queued items for `source`, oldest first.
pub async fn list_items(
    db: &Database,
    source: SourceKind,
) -> Result<Vec<SourceItem>, PressroomError> {
    let source = source.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, source, reference, added_at FROM source_items
                 WHERE source = ?1 ORDER BY added_at, id",
            )?;
            let rows = stmt.query_map(params![source], |row| {
                let source: String = row.get(1)?;
                Ok(SourceItem {
                    id: row.get(0)?,
                    source: parse_enum(1, &source)?,
                    reference: row.get(2)?,
                    added_at: row.get(3)?,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}
