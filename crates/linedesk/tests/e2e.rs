// SPDX-FileCopyrightText: 2026 Linedesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests over the wired desk: webhook-shaped ingestion,
//! assignment, history, realtime notification, and failure behavior.

use linedesk_bus::DeskEvent;
use linedesk_core::LinedeskError;
use linedesk_core::types::{CaseId, CaseStatus, DeliveryState, SenderRole};
use linedesk_test_utils::TestDesk;

/// N concurrent first contacts from one customer produce exactly one
/// case, and every message attaches to it.
#[tokio::test]
async fn concurrent_first_contacts_create_exactly_one_case() {
    let harness = TestDesk::new().await;

    let mut handles = Vec::new();
    for i in 0..16 {
        let desk = harness.desk.clone();
        handles.push(tokio::spawn(async move {
            desk.ingest(&TestDesk::inbound("U1", "OA-A", &format!("burst {i}")))
                .await
                .unwrap()
        }));
    }

    let mut case_ids: Vec<CaseId> = Vec::new();
    for handle in handles {
        let (case, _) = handle.await.unwrap();
        case_ids.push(case.id);
    }
    case_ids.sort();
    case_ids.dedup();
    assert_eq!(case_ids.len(), 1, "burst must not create duplicate cases");

    let history = harness.desk.log().history(case_ids[0], None).await.unwrap();
    assert_eq!(history.len(), 16, "every burst message attaches to the case");

    let cases = harness
        .desk
        .registry()
        .list(&Default::default())
        .await
        .unwrap();
    assert_eq!(cases.len(), 1);
}

/// History is strictly ordered by persistence and reads are idempotent.
#[tokio::test]
async fn history_is_ordered_and_idempotent() {
    let harness = TestDesk::new().await;

    let (case, _) = harness
        .desk
        .ingest(&TestDesk::inbound("U1", "OA-A", "first"))
        .await
        .unwrap();
    for body in ["second", "third", "fourth"] {
        harness
            .desk
            .ingest(&TestDesk::inbound("U1", "OA-A", body))
            .await
            .unwrap();
    }

    let first_read = harness.desk.log().history(case.id, None).await.unwrap();
    assert!(
        first_read.windows(2).all(|w| w[0].id < w[1].id),
        "ids must be strictly increasing in persistence order"
    );
    let bodies: Vec<_> = first_read.iter().map(|m| m.body.as_str()).collect();
    assert_eq!(bodies, vec!["first", "second", "third", "fourth"]);

    let second_read = harness.desk.log().history(case.id, None).await.unwrap();
    assert_eq!(first_read, second_read, "repeat read must be identical");

    // The recent view is the distinct, newest-first operation.
    let recent = harness.desk.log().recent(case.id, 2).await.unwrap();
    assert_eq!(recent[0].body, "fourth");
    assert_eq!(recent[1].body, "third");
}

/// Assigning a nonexistent case is a typed NotFound with no state change.
#[tokio::test]
async fn assigning_nonexistent_case_is_not_found() {
    let harness = TestDesk::new().await;

    let err = harness
        .desk
        .registry()
        .assign(CaseId(999), "Bob")
        .await
        .unwrap_err();
    assert!(matches!(err, LinedeskError::CaseNotFound { case_id: 999 }));

    let cases = harness
        .desk
        .registry()
        .list(&Default::default())
        .await
        .unwrap();
    assert!(cases.is_empty(), "failed assign must not create state");
}

/// An append whose persistence fails produces no realtime notification.
#[tokio::test]
async fn failed_persistence_produces_no_notification() {
    let harness = TestDesk::new().await;

    // Seed a case while writes work, then subscribe to its stream.
    let (case, _) = harness
        .desk
        .ingest(&TestDesk::inbound("U1", "OA-A", "hello"))
        .await
        .unwrap();
    let mut case_rx = harness.bus.subscribe_case(case.id);
    let mut desk_rx = harness.bus.subscribe_desk();

    harness.store.set_fail_writes(true);

    let err = harness
        .desk
        .ingest(&TestDesk::inbound("U1", "OA-A", "lost?"))
        .await
        .unwrap_err();
    assert!(matches!(err, LinedeskError::Storage { .. }));

    // Same through the log directly: a failed insert publishes nothing.
    let err = harness
        .desk
        .log()
        .append(case.id, SenderRole::Customer, "also lost?")
        .await
        .unwrap_err();
    assert!(matches!(err, LinedeskError::Storage { .. }));

    assert!(
        case_rx.try_recv().is_err(),
        "no phantom message event after failed persist"
    );
    assert!(
        desk_rx.try_recv().is_err(),
        "no lifecycle event after failed persist"
    );

    // After the storage recovers, the conversation continues.
    harness.store.set_fail_writes(false);
    harness
        .desk
        .ingest(&TestDesk::inbound("U1", "OA-A", "retried"))
        .await
        .unwrap();
    let history = harness.desk.log().history(case.id, None).await.unwrap();
    let bodies: Vec<_> = history.iter().map(|m| m.body.as_str()).collect();
    assert_eq!(bodies, vec!["hello", "retried"]);
}

/// The full support scenario: hello -> assign -> follow-up -> history.
#[tokio::test]
async fn support_conversation_scenario() {
    let harness = TestDesk::new().await;
    let mut desk_rx = harness.bus.subscribe_desk();

    // Customer "U1" on channel "OA-A" says hello; a case opens as `new`.
    let (case, _) = harness
        .desk
        .ingest(&TestDesk::inbound("U1", "OA-A", "hello"))
        .await
        .unwrap();
    assert_eq!(case.status, CaseStatus::New);
    assert!(matches!(
        desk_rx.recv().await.unwrap(),
        DeskEvent::CaseOpened { .. }
    ));

    // Admin Alice takes the case.
    let assigned = harness
        .desk
        .registry()
        .assign(case.id, "Alice")
        .await
        .unwrap();
    assert_eq!(assigned.status, CaseStatus::Assigned);
    assert_eq!(assigned.assignee.as_deref(), Some("Alice"));
    match desk_rx.recv().await.unwrap() {
        DeskEvent::CaseAssigned { case: c } => {
            assert_eq!(c.assignee.as_deref(), Some("Alice"));
        }
        other => panic!("expected CaseAssigned, got {other:?}"),
    }

    // The follow-up attaches to the same case -- no second case.
    let (followup_case, _) = harness
        .desk
        .ingest(&TestDesk::inbound("U1", "OA-A", "are you there?"))
        .await
        .unwrap();
    assert_eq!(followup_case.id, case.id);
    assert!(
        desk_rx.try_recv().is_err(),
        "no second CaseOpened for the follow-up"
    );

    // History shows both customer messages in order.
    let history = harness.desk.log().history(case.id, None).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(
        (history[0].sender, history[0].body.as_str()),
        (SenderRole::Customer, "hello")
    );
    assert_eq!(
        (history[1].sender, history[1].body.as_str()),
        (SenderRole::Customer, "are you there?")
    );
}

/// Admin replies are persisted before pushing; a push failure is
/// surfaced as a delivery flag and a distinct realtime event.
#[tokio::test]
async fn reply_failure_is_flagged_not_dropped() {
    let harness = TestDesk::new().await;

    let (case, _) = harness
        .desk
        .ingest(&TestDesk::inbound("U1", "OA-A", "hello"))
        .await
        .unwrap();
    let mut case_rx = harness.bus.subscribe_case(case.id);

    // Successful reply round trip.
    let sent = harness.desk.reply(case.id, "hi, checking now").await.unwrap();
    assert_eq!(sent.delivery, Some(DeliveryState::Sent));
    assert_eq!(harness.reply.sent_count(), 1);
    assert_eq!(harness.reply.sent()[0].customer_id, "U1");

    // Failing push: message persists with the failed flag.
    harness.reply.set_fail(true);
    let failed = harness.desk.reply(case.id, "still there?").await.unwrap();
    assert_eq!(failed.delivery, Some(DeliveryState::Failed));

    let history = harness.desk.log().history(case.id, None).await.unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[2].delivery, Some(DeliveryState::Failed));

    // Subscribers saw both appends, then the delivery failure signal.
    assert!(matches!(
        case_rx.recv().await.unwrap(),
        DeskEvent::MessageAppended { .. }
    ));
    assert!(matches!(
        case_rx.recv().await.unwrap(),
        DeskEvent::MessageAppended { .. }
    ));
    match case_rx.recv().await.unwrap() {
        DeskEvent::DeliveryFailed { message_id, .. } => assert_eq!(message_id, failed.id),
        other => panic!("expected DeliveryFailed, got {other:?}"),
    }
}

/// Closing ends the open conversation; the next contact opens a fresh
/// case, and reopening is explicit.
#[tokio::test]
async fn closed_cases_stay_queryable_and_do_not_capture_new_contacts() {
    let harness = TestDesk::new().await;

    let (first, _) = harness
        .desk
        .ingest(&TestDesk::inbound("U1", "OA-A", "old thread"))
        .await
        .unwrap();
    harness.desk.registry().close(first.id).await.unwrap();

    // New contact after closure opens a fresh case.
    let (second, _) = harness
        .desk
        .ingest(&TestDesk::inbound("U1", "OA-A", "new thread"))
        .await
        .unwrap();
    assert_ne!(second.id, first.id);

    // The closed case's history is still queryable.
    let old_history = harness.desk.log().history(first.id, None).await.unwrap();
    assert_eq!(old_history.len(), 1);
    assert_eq!(old_history[0].body, "old thread");

    // Both cases are listed; filtering by status separates them.
    let closed = harness
        .desk
        .registry()
        .list(&linedesk_core::types::CaseFilter {
            status: Some(CaseStatus::Closed),
            channel_id: None,
        })
        .await
        .unwrap();
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].id, first.id);
}
