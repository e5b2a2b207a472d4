// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Commit of a finished source run: drafts, pool releases and the schedule
//! record land together or not at all.

use pressroom_core::{Draft, PressroomError, PublicationId, SourceScheduleRecord};
use rusqlite::params;

use super::publications::insert_draft_row;
use super::schedules::upsert_record;
use crate::database::Database;

pub async fn commit_source_run(
    db: &Database,
    drafts: &[Draft],
    released_items: &[i64],
    record: &SourceScheduleRecord,
) -> Result<Vec<PublicationId>, PressroomError> {
    let drafts = drafts.to_vec();
    let released_items = released_items.to_vec();
    let record = record.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let mut ids = Vec::with_capacity(drafts.len());
            for draft in &drafts {
                ids.push(insert_draft_row(&tx, draft)?);
            }
            for item in &released_items {
                tx.execute("DELETE FROM source_items WHERE id = ?1", params![item])?;
            }
            upsert_record(&tx, &record)?;
            tx.commit()?;
            Ok(ids)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queries::{publications, schedules, source_items};
    use chrono::Utc;
    use pressroom_core::{PublicationState, SourceKind, SourceMetadata};

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.db");
        let db = Database::open(path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn draft(body: &str) -> Draft {
        Draft::new(SourceMetadata::new(SourceKind::Youtube, body))
    }

    fn record() -> SourceScheduleRecord {
        let mut record = SourceScheduleRecord::new(SourceKind::Youtube, 1);
        record.last_run_time = Some(Utc::now());
        record.request_count = 3;
        record
    }

    #[tokio::test]
    async fn drafts_releases_and_record_commit_together() {
        let (db, _dir) = setup_db().await;
        source_items::add_item(&db, SourceKind::Youtube, "https://youtu.be/a").await.unwrap();
        source_items::add_item(&db, SourceKind::Youtube, "https://youtu.be/b").await.unwrap();
        let items = source_items::list_items(&db, SourceKind::Youtube).await.unwrap();

        let ids = commit_source_run(&db, &[draft("one"), draft("two")], &[items[0].id], &record())
            .await
            .unwrap();
        assert_eq!(ids.len(), 2);

        let stored = publications::list_by_state(&db, PublicationState::Draft).await.unwrap();
        assert_eq!(stored.len(), 2);
        let left = source_items::list_items(&db, SourceKind::Youtube).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].reference, "https://youtu.be/b");
        let saved = schedules::get_schedule(&db, SourceKind::Youtube).await.unwrap().unwrap();
        assert_eq!(saved.request_count, 3);
        assert!(saved.last_run_time.is_some());
    }

    #[tokio::test]
    async fn failed_insert_rolls_back_the_whole_run() {
        let (db, _dir) = setup_db().await;
        source_items::add_item(&db, SourceKind::Youtube, "https://youtu.be/a").await.unwrap();
        let items = source_items::list_items(&db, SourceKind::Youtube).await.unwrap();

        // The second insert of the run hits a full disk.
        db.connection()
            .call(|conn| {
                conn.execute_batch(
                    "CREATE TRIGGER second_insert_fails BEFORE INSERT ON publications
                     WHEN (SELECT COUNT(*) FROM publications) >= 1
                     BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
                )
            })
            .await
            .unwrap();

        let result = commit_source_run(
            &db,
            &[draft("one"), draft("two"), draft("three")],
            &[items[0].id],
            &record(),
        )
        .await;
        assert!(matches!(result, Err(PressroomError::Storage { .. })));

        assert!(publications::list_by_state(&db, PublicationState::Draft).await.unwrap().is_empty());
        assert_eq!(source_items::list_items(&db, SourceKind::Youtube).await.unwrap().len(), 1);
        assert!(schedules::get_schedule(&db, SourceKind::Youtube).await.unwrap().is_none());
    }
}
