// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests over the whole lifecycle: source cycle, producer,
//! suggestion delivery, operator commands and publishing.
//!
//! Each test builds an isolated TestHarness with temp SQLite and mock
//! adapters. Tests are independent and order-insensitive.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use pressroom_agent::Evaluation;
use pressroom_core::{
    Command, CommandReply, PublicationState, SourceAdapter, SourceKind, StorageAdapter,
};
use pressroom_sources::SourcesScheduler;
use pressroom_test_utils::{MockSource, OPERATOR, TestHarness};
use tokio_util::sync::CancellationToken;

const ARTICLE: &str = "Researchers describe a retrieval method that keeps long documents useful.\n\nThe second paragraph adds enough detail to pass every content filter.";

fn scheduler(h: &TestHarness, source: &MockSource) -> SourcesScheduler {
    let sources: Vec<Arc<dyn SourceAdapter>> = vec![Arc::new(source.clone())];
    SourcesScheduler::new(h.storage.clone(), sources, h.config.sources.clone())
}

#[tokio::test]
async fn source_item_travels_to_a_published_post() {
    let h = TestHarness::builder()
        .with_responses(["First draft of the post", "Shorter draft"])
        .build()
        .await
        .unwrap();
    h.start().await;

    let arxiv = MockSource::with_contents(SourceKind::Arxiv, [ARTICLE]);
    let report = scheduler(&h, &arxiv).run_cycle(Utc::now()).await;
    assert_eq!(report.drafts_saved(), 1);
    assert_eq!(
        h.storage
            .list_publications(PublicationState::Draft)
            .await
            .unwrap()
            .len(),
        1
    );

    let produced = h.produce().await.unwrap();
    assert_eq!(produced.advanced, 1);

    let id = match h.controller.evaluate(Utc::now()).await.unwrap() {
        Evaluation::Delivered(id) => id,
        other => panic!("expected a delivery, got {other:?}"),
    };
    let deliveries = h.channel.deliveries().await;
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].0, OPERATOR);
    assert_eq!(deliveries[0].1.content, "First draft of the post");
    assert_eq!(deliveries[0].1.title.as_deref(), Some("arxiv item 1"));

    match h.command(Command::Revise("make it shorter".into())).await {
        CommandReply::Summary(summary) => assert_eq!(summary.content, "Shorter draft"),
        other => panic!("expected a summary, got {other:?}"),
    }

    assert!(matches!(h.command(Command::Publish).await, CommandReply::Text(_)));
    let stored = h.storage.get_publication(&id).await.unwrap().unwrap();
    assert_eq!(stored.state, PublicationState::Published);
    assert_eq!(h.publisher.published().await[0].0, "Shorter draft");
    assert!(h.storage.load_checkpoint(&id).await.unwrap().is_empty());

    assert_eq!(
        h.controller.evaluate(Utc::now()).await.unwrap(),
        Evaluation::CoolingOff
    );
}

#[tokio::test]
async fn repeated_cycles_do_not_duplicate_work() {
    let h = TestHarness::builder().build().await.unwrap();
    let arxiv = MockSource::with_contents(SourceKind::Arxiv, [ARTICLE]);
    let sched = scheduler(&h, &arxiv);

    let now = Utc::now();
    sched.run_cycle(now).await;
    h.produce().await.unwrap();
    let calls = h.model.call_count().await;

    // Not due again within its period, and nothing left to produce.
    sched.run_cycle(now + chrono::Duration::hours(1)).await;
    h.produce().await.unwrap();
    assert_eq!(arxiv.fetch_count(), 1);
    assert_eq!(h.model.call_count().await, calls);
    assert_eq!(h.storage.pending_publication_ids().await.unwrap().len(), 1);
}

#[tokio::test]
async fn command_loop_answers_through_the_channel() {
    let h = TestHarness::builder().build().await.unwrap();
    h.add_pending(&["Alpha", "Beta"]).await.unwrap();

    let cancel = CancellationToken::new();
    let run = h.controller.run_commands(cancel.clone());
    let drive = async {
        h.channel.inject(OPERATOR, Command::Start).await;
        h.channel.inject(OPERATOR, Command::List).await;
        h.channel.inject("intruder", Command::Publish).await;
        for _ in 0..200 {
            if h.channel.replies().await.len() >= 3 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        cancel.cancel();
    };
    tokio::join!(run, drive);

    let replies = h.channel.replies().await;
    assert_eq!(replies.len(), 3);
    assert!(matches!(replies[0].1, CommandReply::Text(_)));
    match &replies[1].1 {
        CommandReply::List(entries) => {
            let labels: Vec<&str> = entries.iter().map(|(_, l)| l.as_str()).collect();
            assert_eq!(labels, vec!["Alpha", "Beta"]);
        }
        other => panic!("expected a list, got {other:?}"),
    }
    assert_eq!(replies[2].0, "intruder");
    assert!(
        matches!(&replies[2].1, CommandReply::Error { code, .. } if code == "identity_mismatch")
    );
    assert!(h.publisher.published().await.is_empty());
}
