// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversation checkpoints: ordered turn logs keyed by publication id.

use pressroom_core::{PressroomError, PublicationId, Turn};
use rusqlite::params;

use super::parse_enum;
use crate::database::Database;

pub async fn load_turns(db: &Database, id: &PublicationId) -> Result<Vec<Turn>, PressroomError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT role, content, attachment, token_estimate
                 FROM checkpoint_turns WHERE publication_id = ?1 ORDER BY seq",
            )?;
            let rows = stmt.query_map(params![id], |row| {
                let role: String = row.get(0)?;
                Ok(Turn {
                    role: parse_enum(0, &role)?,
                    content: row.get(1)?,
                    attachment: row.get(2)?,
                    token_estimate: row.get::<_, i64>(3)?.max(0) as usize,
                })
            })?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Replace the whole checkpoint in one transaction.
pub async fn write_turns(
    db: &Database,
    id: &PublicationId,
    turns: &[Turn],
) -> Result<(), PressroomError> {
    let id = id.0.clone();
    let turns = turns.to_vec();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "DELETE FROM checkpoint_turns WHERE publication_id = ?1",
                params![id],
            )?;
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO checkpoint_turns
                         (publication_id, seq, role, content, attachment, token_estimate)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )?;
                for (seq, turn) in turns.iter().enumerate() {
                    stmt.execute(params![
                        id,
                        seq as i64,
                        turn.role.to_string(),
                        turn.content,
                        turn.attachment,
                        turn.token_estimate as i64,
                    ])?;
                }
            }
            tx.commit()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete a checkpoint. Deleting an absent checkpoint is a no-op.
pub async fn delete_turns(db: &Database, id: &PublicationId) -> Result<(), PressroomError> {
    let id = id.0.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "DELETE FROM checkpoint_turns WHERE publication_id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::publications::insert_draft;
    use pressroom_core::{Draft, SourceKind, SourceMetadata, TurnRole};

    async fn setup() -> (Database, tempfile::TempDir, PublicationId) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        let p = insert_draft(&db, &Draft::new(SourceMetadata::new(SourceKind::Manual, "x")))
            .await
            .unwrap();
        (db, dir, p.id)
    }

    #[tokio::test]
    async fn write_load_replace() {
        let (db, _dir, id) = setup().await;
        assert!(load_turns(&db, &id).await.unwrap().is_empty());

        let turns = vec![
            Turn::system("be brief"),
            Turn::agent("draft one"),
            Turn::operator("shorter").with_attachment("photo:1"),
        ];
        write_turns(&db, &id, &turns).await.unwrap();
        assert_eq!(load_turns(&db, &id).await.unwrap(), turns);

        write_turns(&db, &id, &turns[..1]).await.unwrap();
        let loaded = load_turns(&db, &id).await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].role, TurnRole::System);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let (db, _dir, id) = setup().await;
        write_turns(&db, &id, &[Turn::system("s")]).await.unwrap();
        delete_turns(&db, &id).await.unwrap();
        delete_turns(&db, &id).await.unwrap();
        assert!(load_turns(&db, &id).await.unwrap().is_empty());
    }
}
