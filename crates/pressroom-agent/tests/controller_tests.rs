// SPDX-FileCopyrightText: 2026 Pressroom Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Suggestion controller behaviour against real storage and mock adapters.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use pressroom_agent::{ControllerSettings, Evaluation, SuggestionController};
use pressroom_core::{
    Command, CommandReply, ControllerPhase, PublicationState, SourceKind, StorageAdapter,
    TurnRole,
};
use pressroom_test_utils::{MockPublish, OPERATOR, TestHarness};
use tokio_util::sync::CancellationToken;

async fn harness() -> TestHarness {
    TestHarness::builder().build().await.unwrap()
}

fn error_code(reply: &CommandReply) -> &str {
    match reply {
        CommandReply::Error { code, .. } => code,
        other => panic!("expected an error reply, got {other:?}"),
    }
}

fn summary_position(reply: &CommandReply) -> usize {
    match reply {
        CommandReply::Summary(summary) => summary.position,
        other => panic!("expected a summary, got {other:?}"),
    }
}

#[tokio::test]
async fn first_start_binds_the_operator() {
    let h = harness().await;
    assert_eq!(error_code(&h.command(Command::List).await), "invalid_command");

    assert!(matches!(h.start().await, CommandReply::Text(_)));
    assert_eq!(
        h.controller.state().await.operator_identity.as_deref(),
        Some(OPERATOR)
    );

    let reply = h.command_from("intruder", Command::Start).await;
    assert_eq!(error_code(&reply), "identity_mismatch");
    let reply = h.command_from("intruder", Command::Stop).await;
    assert_eq!(error_code(&reply), "identity_mismatch");
    assert!(!h.controller.state().await.suggestions_blocked);

    // Survives a reload from storage.
    let stored = h.storage.load_controller_state().await.unwrap();
    assert_eq!(stored.operator_identity.as_deref(), Some(OPERATOR));
}

#[tokio::test]
async fn evaluation_waits_for_operator_and_queue() {
    let h = harness().await;
    h.add_pending(&["A"]).await.unwrap();
    assert_eq!(h.controller.evaluate(Utc::now()).await.unwrap(), Evaluation::NoOperator);

    let h = harness().await;
    h.start().await;
    assert_eq!(h.controller.evaluate(Utc::now()).await.unwrap(), Evaluation::EmptyQueue);
}

#[tokio::test]
async fn idle_controller_delivers_once_and_blocks() {
    let h = harness().await;
    h.start().await;
    let ids = h.add_pending(&["A", "B"]).await.unwrap();

    let outcome = h.controller.evaluate(Utc::now()).await.unwrap();
    assert_eq!(outcome, Evaluation::Delivered(ids[0].clone()));
    let state = h.controller.state().await;
    assert_eq!(state.phase, ControllerPhase::AwaitingInteraction);
    assert!(state.suggestions_blocked);

    assert_eq!(
        h.controller.evaluate(Utc::now()).await.unwrap(),
        Evaluation::AwaitingInteraction
    );
    let deliveries = h.channel.deliveries().await;
    assert_eq!(deliveries.len(), 1);
    assert_eq!(deliveries[0].0, OPERATOR);
    assert_eq!(deliveries[0].1.total, 2);
    assert_eq!(deliveries[0].1.title.as_deref(), Some("A"));
}

#[tokio::test]
async fn delivery_failure_blocks_until_allow() {
    let h = harness().await;
    h.start().await;
    let ids = h.add_pending(&["A", "B"]).await.unwrap();

    h.channel.set_delivery_failure(true);
    assert_eq!(
        h.controller.evaluate(Utc::now()).await.unwrap(),
        Evaluation::DeliveryFailed(ids[0].clone())
    );
    h.channel.set_delivery_failure(false);

    for _ in 0..3 {
        h.controller.evaluate(Utc::now()).await.unwrap();
    }
    let state = h.controller.state().await;
    assert!(state.delivery_failed);
    assert!(state.suggestions_blocked);
    assert_eq!(h.channel.delivery_count().await, 0);

    // Discarding does not lift a delivery block.
    h.command(Command::Discard).await;
    assert_eq!(h.controller.evaluate(Utc::now()).await.unwrap(), Evaluation::Blocked);

    h.command(Command::Allow).await;
    assert_eq!(
        h.controller.evaluate(Utc::now()).await.unwrap(),
        Evaluation::Delivered(ids[1].clone())
    );
    assert!(!h.controller.state().await.delivery_failed);
}

#[tokio::test]
async fn navigation_wraps_without_touching_block_state() {
    let h = harness().await;
    h.start().await;
    h.add_pending(&["A", "B", "C"]).await.unwrap();
    h.controller.evaluate(Utc::now()).await.unwrap();

    assert_eq!(summary_position(&h.command(Command::Next).await), 1);
    assert_eq!(summary_position(&h.command(Command::Previous).await), 0);
    assert_eq!(summary_position(&h.command(Command::Previous).await), 2);
    assert_eq!(summary_position(&h.command(Command::Select(1)).await), 1);
    assert_eq!(summary_position(&h.command(Command::Current).await), 1);
    assert_eq!(error_code(&h.command(Command::Select(3)).await), "invalid_command");

    let state = h.controller.state().await;
    assert_eq!(state.phase, ControllerPhase::AwaitingInteraction);
    assert!(state.suggestions_blocked);
    // Navigation replies are not suggestion deliveries.
    assert_eq!(h.channel.delivery_count().await, 1);
}

#[tokio::test]
async fn list_shows_titles_in_queue_order() {
    let h = harness().await;
    h.start().await;
    h.add_pending(&["First", "Second"]).await.unwrap();
    match h.command(Command::List).await {
        CommandReply::List(entries) => assert_eq!(
            entries,
            vec![(0, "First".to_string()), (1, "Second".to_string())]
        ),
        other => panic!("unexpected reply {other:?}"),
    }
}

#[tokio::test]
async fn discard_returns_to_idle_and_moves_on() {
    let h = harness().await;
    h.start().await;
    let ids = h.add_pending(&["A", "B"]).await.unwrap();
    h.controller.evaluate(Utc::now()).await.unwrap();

    assert!(matches!(h.command(Command::Discard).await, CommandReply::Text(_)));
    let discarded = h.storage.get_publication(&ids[0]).await.unwrap().unwrap();
    assert_eq!(discarded.state, PublicationState::Discarded);
    assert!(h.storage.load_checkpoint(&ids[0]).await.unwrap().is_empty());

    let state = h.controller.state().await;
    assert_eq!(state.phase, ControllerPhase::Idle);
    assert!(!state.suggestions_blocked);
    assert_eq!(
        h.controller.evaluate(Utc::now()).await.unwrap(),
        Evaluation::Delivered(ids[1].clone())
    );
}

#[tokio::test]
async fn publish_starts_cool_off() {
    let h = harness().await;
    h.start().await;
    let ids = h.add_pending(&["A", "B"]).await.unwrap();
    h.controller.evaluate(Utc::now()).await.unwrap();

    assert!(matches!(h.command(Command::Publish).await, CommandReply::Text(_)));
    let published = h.storage.get_publication(&ids[0]).await.unwrap().unwrap();
    assert_eq!(published.state, PublicationState::Published);
    assert!(h.storage.load_checkpoint(&ids[0]).await.unwrap().is_empty());

    let state = h.controller.state().await;
    assert_eq!(state.phase, ControllerPhase::CoolingOff);
    let until = state.cool_off_until.unwrap();
    let period = until - state.last_published_at.unwrap();
    assert_eq!(period, chrono::Duration::days(1));

    // The queue still holds B, but nothing is suggested before the period ends.
    assert_eq!(
        h.controller.evaluate(until - chrono::Duration::seconds(1)).await.unwrap(),
        Evaluation::CoolingOff
    );
    assert_eq!(h.channel.delivery_count().await, 1);

    assert_eq!(
        h.controller.evaluate(until).await.unwrap(),
        Evaluation::Delivered(ids[1].clone())
    );
}

#[tokio::test]
async fn stop_outlasts_cool_off() {
    let h = harness().await;
    h.start().await;
    h.add_pending(&["A", "B"]).await.unwrap();
    h.controller.evaluate(Utc::now()).await.unwrap();
    h.command(Command::Publish).await;
    h.command(Command::Stop).await;

    let until = h.controller.state().await.cool_off_until.unwrap();
    assert_eq!(h.controller.evaluate(until).await.unwrap(), Evaluation::Blocked);
    assert_eq!(h.controller.state().await.phase, ControllerPhase::Idle);

    h.command(Command::Allow).await;
    assert!(matches!(
        h.controller.evaluate(until).await.unwrap(),
        Evaluation::Delivered(_)
    ));
}

#[tokio::test]
async fn allow_cuts_cool_off_short() {
    let h = harness().await;
    h.start().await;
    h.add_pending(&["A", "B"]).await.unwrap();
    h.controller.evaluate(Utc::now()).await.unwrap();
    h.command(Command::Publish).await;

    h.command(Command::Allow).await;
    let state = h.controller.state().await;
    assert_eq!(state.phase, ControllerPhase::Idle);
    assert!(state.cool_off_until.is_none());
    assert!(matches!(
        h.controller.evaluate(Utc::now()).await.unwrap(),
        Evaluation::Delivered(_)
    ));
}

#[tokio::test]
async fn reauth_is_surfaced_and_publication_kept() {
    let h = harness().await;
    h.start().await;
    let ids = h.add_pending(&["A"]).await.unwrap();
    h.controller.evaluate(Utc::now()).await.unwrap();
    h.publisher
        .push(MockPublish::NeedsReauth("https://auth.example/login".into()))
        .await;

    let reply = h.command(Command::Publish).await;
    match &reply {
        CommandReply::Error { code, message } => {
            assert_eq!(code, "reauth_required");
            assert!(message.contains("https://auth.example/login"));
        }
        other => panic!("unexpected reply {other:?}"),
    }
    let p = h.storage.get_publication(&ids[0]).await.unwrap().unwrap();
    assert_eq!(p.state, PublicationState::PendingApproval);
    assert_eq!(
        h.controller.state().await.phase,
        ControllerPhase::AwaitingInteraction
    );
}

#[tokio::test]
async fn revise_feeds_the_checkpoint_back_to_the_model() {
    let h = TestHarness::builder()
        .with_responses(["initial post", "revised **post**"])
        .build()
        .await
        .unwrap();
    h.start().await;
    let ids = h.add_pending(&["A"]).await.unwrap();

    let reply = h.command(Command::Revise("make it shorter".into())).await;
    let CommandReply::Summary(summary) = reply else {
        panic!("expected a summary");
    };
    assert!(summary.content.starts_with("revised "));
    assert!(!summary.content.contains("**"));

    let calls = h.model.calls().await;
    assert_eq!(calls[1].prompt, "make it shorter");
    let roles: Vec<TurnRole> = calls[1].history.iter().map(|t| t.role).collect();
    assert_eq!(roles, vec![TurnRole::System, TurnRole::Agent]);
    assert_eq!(calls[1].history[1].content, "initial post");

    let turns = h.storage.load_checkpoint(&ids[0]).await.unwrap();
    let roles: Vec<TurnRole> = turns.iter().map(|t| t.role).collect();
    assert_eq!(
        roles,
        vec![TurnRole::System, TurnRole::Agent, TurnRole::Operator, TurnRole::Agent]
    );
    let stored = h.storage.get_publication(&ids[0]).await.unwrap().unwrap();
    assert_eq!(stored.content.as_deref(), Some(summary.content.as_str()));
}

#[tokio::test]
async fn update_replaces_body_and_records_turn() {
    let h = harness().await;
    h.start().await;
    let ids = h.add_pending(&["A"]).await.unwrap();

    let reply = h.command(Command::Update("hand written".into())).await;
    let CommandReply::Summary(summary) = reply else {
        panic!("expected a summary");
    };
    assert_eq!(summary.content, "hand written");
    let turns = h.storage.load_checkpoint(&ids[0]).await.unwrap();
    assert_eq!(turns.last().unwrap().content, "hand written");

    assert_eq!(error_code(&h.command(Command::Update("  ".into())).await), "invalid_command");
}

#[tokio::test]
async fn images_can_be_set_and_cleared() {
    let h = harness().await;
    h.start().await;
    h.add_pending(&["A"]).await.unwrap();

    let CommandReply::Summary(summary) = h.command(Command::SetImage(vec![1, 2, 3])).await else {
        panic!("expected a summary");
    };
    assert_eq!(summary.image, Some(vec![1, 2, 3]));
    let CommandReply::Summary(summary) = h.command(Command::ClearImage).await else {
        panic!("expected a summary");
    };
    assert!(summary.image.is_none());
}

#[tokio::test]
async fn commands_on_empty_queue_fail_cleanly() {
    let h = harness().await;
    h.start().await;
    for command in [Command::Next, Command::Current, Command::Publish, Command::Discard] {
        assert_eq!(error_code(&h.command(command).await), "invalid_command");
    }
    match h.command(Command::Health).await {
        CommandReply::Text(text) => assert!(text.starts_with("ok: 0 pending")),
        other => panic!("unexpected reply {other:?}"),
    }
}

#[tokio::test]
async fn source_items_are_classified_and_deduplicated() {
    let h = harness().await;
    h.start().await;
    let url = "https://youtu.be/dQw4w9WgXcQ";
    let CommandReply::Text(text) = h.command(Command::AddSourceItem(url.into())).await else {
        panic!("expected text");
    };
    assert!(text.starts_with("Queued for the youtube"));
    let CommandReply::Text(text) = h.command(Command::AddSourceItem(url.into())).await else {
        panic!("expected text");
    };
    assert!(text.starts_with("Already queued"));
    h.command(Command::AddSourceItem("https://example.com/post".into()))
        .await;

    assert_eq!(
        h.storage.list_source_items(SourceKind::Youtube).await.unwrap().len(),
        1
    );
    assert_eq!(
        h.storage.list_source_items(SourceKind::Manual).await.unwrap().len(),
        1
    );
}

#[tokio::test]
async fn state_survives_controller_restart() {
    let h = harness().await;
    h.start().await;
    h.add_pending(&["A", "B", "C"]).await.unwrap();
    h.command(Command::Select(2)).await;
    h.command(Command::Stop).await;

    let restarted = SuggestionController::new(
        h.storage.clone(),
        h.channel.clone(),
        h.model.clone(),
        h.checkpoints.clone(),
        h.workflow.clone(),
        ControllerSettings::default(),
    )
    .await
    .unwrap();
    let state = restarted.state().await;
    assert!(state.operator_paused);
    assert!(state.suggestions_blocked);

    let reply = restarted
        .handle_command(pressroom_core::InboundCommand {
            sender: OPERATOR.into(),
            command: Command::Current,
        })
        .await;
    assert_eq!(summary_position(&reply), 2);
}

#[tokio::test]
async fn command_loop_replies_to_sender() {
    let h = Arc::new(harness().await);
    h.channel.inject(OPERATOR, Command::Start).await;
    h.channel.inject("intruder", Command::Health).await;

    let cancel = CancellationToken::new();
    let runner = {
        let h = h.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move { h.controller.run_commands(cancel).await })
    };

    tokio::time::timeout(Duration::from_secs(5), async {
        while h.channel.replies().await.len() < 2 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
    cancel.cancel();
    runner.await.unwrap();

    let replies = h.channel.replies().await;
    assert_eq!(replies[0].0, OPERATOR);
    assert!(matches!(replies[0].1, CommandReply::Text(_)));
    assert_eq!(replies[1].0, "intruder");
    assert_eq!(error_code(&replies[1].1), "identity_mismatch");
}

#[tokio::test]
async fn slow_revision_does_not_stall_evaluation() {
    let h = harness().await;
    h.start().await;
    let ids = h.add_pending(&["A"]).await.unwrap();
    h.model.set_delay(Duration::from_secs(1));

    let (reply, evaluated) = tokio::join!(h.command(Command::Revise("tighten it".into())), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        tokio::time::timeout(Duration::from_millis(300), h.controller.evaluate(Utc::now())).await
    });

    let evaluated = evaluated.expect("evaluation waited for the model");
    assert_eq!(evaluated.unwrap(), Evaluation::Delivered(ids[0].clone()));
    let CommandReply::Summary(summary) = reply else {
        panic!("expected a summary, got {reply:?}");
    };
    assert_eq!(summary.id, ids[0]);
}

#[tokio::test]
async fn revision_of_a_post_that_left_the_queue_is_dropped() {
    let h = TestHarness::builder()
        .with_responses(["initial post", "late revision"])
        .build()
        .await
        .unwrap();
    h.start().await;
    let ids = h.add_pending(&["A"]).await.unwrap();
    h.model.set_delay(Duration::from_millis(500));

    let (reply, discarded) = tokio::join!(h.command(Command::Revise("tighten it".into())), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        h.workflow.discard(&ids[0]).await
    });
    discarded.unwrap();
    assert_eq!(error_code(&reply), "invalid_command");

    let stored = h.storage.get_publication(&ids[0]).await.unwrap().unwrap();
    assert_eq!(stored.state, PublicationState::Discarded);
    assert_ne!(stored.content.as_deref(), Some("late revision"));
}
