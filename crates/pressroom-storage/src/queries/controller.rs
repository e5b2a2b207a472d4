// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The single controller state row.

use pressroom_core::{ControllerState, PressroomError, PublicationId};
use rusqlite::params;

use super::{format_ts, parse_enum, parse_ts};
use crate::database::Database;

pub async fn load_controller_state(db: &Database) -> Result<ControllerState, PressroomError> {
    db.connection()
        .call(|conn| {
            conn.query_row(
                "SELECT operator_identity, phase, suggestions_blocked, operator_paused,
                        delivery_failed, current_publication, last_published_at, cool_off_until
                 FROM controller_state WHERE id = 1",
                [],
                |row| {
                    let phase: String = row.get(1)?;
                    Ok(ControllerState {
                        operator_identity: row.get(0)?,
                        phase: parse_enum(1, &phase)?,
                        suggestions_blocked: row.get(2)?,
                        operator_paused: row.get(3)?,
                        delivery_failed: row.get(4)?,
                        current_publication: row.get::<_, Option<String>>(5)?.map(PublicationId),
                        last_published_at: parse_ts(6, row.get(6)?)?,
                        cool_off_until: parse_ts(7, row.get(7)?)?,
                    })
                },
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Overwrite the controller row.
///
/// The operator identity is write-once: a stored identity is never replaced.
pub async fn save_controller_state(
    db: &Database,
    state: &ControllerState,
) -> Result<(), PressroomError> {
    let state = state.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE controller_state SET
                     operator_identity = COALESCE(operator_identity, ?1),
                     phase = ?2,
                     suggestions_blocked = ?3,
                     operator_paused = ?4,
                     delivery_failed = ?5,
                     current_publication = ?6,
                     last_published_at = ?7,
                     cool_off_until = ?8,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = 1",
                params![
                    state.operator_identity,
                    state.phase.to_string(),
                    state.suggestions_blocked,
                    state.operator_paused,
                    state.delivery_failed,
                    state.current_publication.as_ref().map(|id| id.0.clone()),
                    state.last_published_at.as_ref().map(format_ts),
                    state.cool_off_until.as_ref().map(format_ts),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
