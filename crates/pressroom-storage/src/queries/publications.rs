// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publication CRUD and check-and-set state transitions.

use pressroom_core::{
    Draft, PressroomError, Publication, PublicationId, PublicationState, SourceMetadata,
};
use rusqlite::{OptionalExtension, Row, params};

use super::parse_enum;
use crate::database::Database;

const COLUMNS: &str = "id, state, source_type, title, author, source_created_at, description, \
                       raw_content, link, content, image, created_at, last_updated";

fn row_to_publication(row: &Row<'_>) -> rusqlite::Result<Publication> {
    let state: String = row.get(1)?;
    let source_type: String = row.get(2)?;
    Ok(Publication {
        id: PublicationId(row.get(0)?),
        state: parse_enum(1, &state)?,
        source_metadata: SourceMetadata {
            title: row.get(3)?,
            author: row.get(4)?,
            created_at: row.get(5)?,
            description: row.get(6)?,
            raw_content: row.get(7)?,
            source_type: parse_enum(2, &source_type)?,
            link: row.get(8)?,
        },
        content: row.get(9)?,
        image: row.get(10)?,
        created_at: row.get(11)?,
        last_updated: row.get(12)?,
    })
}

/// Outcome of a guarded write, resolved into an error outside the closure.
enum Guarded {
    Applied,
    Missing,
    WrongState(PublicationState),
}

fn resolve(
    outcome: Guarded,
    id: &PublicationId,
    expected: PublicationState,
) -> Result<(), PressroomError> {
    match outcome {
        Guarded::Applied => Ok(()),
        Guarded::Missing => Err(PressroomError::PublicationNotFound(id.to_string())),
        Guarded::WrongState(actual) => Err(PressroomError::PreconditionFailed {
            publication_id: id.to_string(),
            expected,
            actual,
        }),
    }
}

fn current_state(
    conn: &rusqlite::Connection,
    id: &str,
) -> rusqlite::Result<Option<PublicationState>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT state FROM publications WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )
        .optional()?;
    raw.map(|s| parse_enum(0, &s)).transpose()
}

/// Insert `draft` as a new `DRAFT` row on an open connection or transaction.
pub(crate) fn insert_draft_row(
    conn: &rusqlite::Connection,
    draft: &Draft,
) -> rusqlite::Result<PublicationId> {
    let id = PublicationId::generate();
    let m = &draft.metadata;
    conn.execute(
        "INSERT INTO publications (id, state, source_type, title, author, \
         source_created_at, description, raw_content, link, image)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            id.0,
            PublicationState::Draft.to_string(),
            m.source_type.to_string(),
            m.title,
            m.author,
            m.created_at,
            m.description,
            m.raw_content,
            m.link,
            draft.image,
        ],
    )?;
    Ok(id)
}

/// Insert a draft as a new `DRAFT` publication and return the stored row.
pub async fn insert_draft(db: &Database, draft: &Draft) -> Result<Publication, PressroomError> {
    let draft = draft.clone();
    db.connection()
        .call(move |conn| {
            let id = insert_draft_row(conn, &draft)?;
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM publications WHERE id = ?1"),
                params![id.0],
                row_to_publication,
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

pub async fn get_publication(
    db: &Database,
    id: &PublicationId,
) -> Result<Option<Publication>, PressroomError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM publications WHERE id = ?1"),
                params![id],
                row_to_publication,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Publications in `state`, oldest first with insertion order as tiebreaker.
pub async fn list_by_state(
    db: &Database,
    state: PublicationState,
) -> Result<Vec<Publication>, PressroomError> {
    let state = state.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM publications WHERE state = ?1 ORDER BY created_at, rowid"
            ))?;
            let rows = stmt.query_map(params![state], row_to_publication)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Ids of publications awaiting approval, in queue order.
pub async fn pending_ids(db: &Database) -> Result<Vec<PublicationId>, PressroomError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id FROM publications WHERE state = 'PENDING_APPROVAL'
                 ORDER BY created_at, rowid",
            )?;
            let rows = stmt.query_map([], |row| Ok(PublicationId(row.get(0)?)))?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Number of publications per state, for status reporting.
pub async fn count_by_state(
    db: &Database,
) -> Result<Vec<(PublicationState, i64)>, PressroomError> {
    db.connection()
        .call(|conn| {
            let mut stmt =
                conn.prepare("SELECT state, COUNT(*) FROM publications GROUP BY state")?;
            let rows = stmt.query_map([], |row| {
                let state: String = row.get(0)?;
                Ok((parse_enum(0, &state)?, row.get(1)?))
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Replace the post body of a non-terminal publication.
pub async fn update_content(
    db: &Database,
    id: &PublicationId,
    content: &str,
) -> Result<(), PressroomError> {
    let key = id.0.clone();
    let content = content.to_string();
    let outcome = db
        .connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE publications SET content = ?2,
                 last_updated = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1 AND state IN ('DRAFT', 'PENDING_APPROVAL')",
                params![key, content],
            )?;
            guarded_outcome(conn, &key, changed)
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    resolve(outcome, id, PublicationState::PendingApproval)
}

/// Set or clear the image of a non-terminal publication.
pub async fn set_image(
    db: &Database,
    id: &PublicationId,
    image: Option<Vec<u8>>,
) -> Result<(), PressroomError> {
    let key = id.0.clone();
    let outcome = db
        .connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE publications SET image = ?2,
                 last_updated = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1 AND state IN ('DRAFT', 'PENDING_APPROVAL')",
                params![key, image],
            )?;
            guarded_outcome(conn, &key, changed)
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    resolve(outcome, id, PublicationState::PendingApproval)
}

fn guarded_outcome(
    conn: &rusqlite::Connection,
    id: &str,
    changed: usize,
) -> rusqlite::Result<Guarded> {
    if changed > 0 {
        return Ok(Guarded::Applied);
    }
    Ok(match current_state(conn, id)? {
        None => Guarded::Missing,
        Some(actual) => Guarded::WrongState(actual),
    })
}

/// Atomically move `id` from `expected` to `next`.
///
/// The read, the check and the write happen in one transaction; on mismatch
/// nothing is written and `PreconditionFailed` reports the actual state.
pub async fn transition(
    db: &Database,
    id: &PublicationId,
    expected: PublicationState,
    next: PublicationState,
) -> Result<(), PressroomError> {
    if !expected.can_transition_to(next) {
        return Err(PressroomError::Internal(format!(
            "illegal transition {expected} -> {next}"
        )));
    }
    let key = id.0.clone();
    let outcome = db
        .connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let outcome = match current_state(&tx, &key)? {
                None => Guarded::Missing,
                Some(actual) if actual != expected => Guarded::WrongState(actual),
                Some(_) => {
                    tx.execute(
                        "UPDATE publications SET state = ?3,
                         last_updated = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                         WHERE id = ?1 AND state = ?2",
                        params![key, expected.to_string(), next.to_string()],
                    )?;
                    Guarded::Applied
                }
            };
            tx.commit()?;
            Ok(outcome)
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    resolve(outcome, id, expected)
}
