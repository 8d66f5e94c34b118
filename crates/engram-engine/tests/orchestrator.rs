use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use engram_engine::error::Error;
use engram_engine::orchestrator::Orchestrator;
use engram_store::SessionStore;
use engram_testing::{FailMode, MemoryGraph};
use engram_types::{
    FilteredMessage, IndexOutcome, LifecycleState, ProjectNamespace, SessionContent,
    SessionRecord, TriggerKind,
};

fn content(messages: &[(&str, &str)]) -> SessionContent {
    SessionContent::new(
        "/logs/session.jsonl",
        ProjectNamespace::new("ns-test"),
        messages
            .iter()
            .map(|(role, text)| FilteredMessage::new(*role, *text))
            .collect(),
    )
}

fn orchestrator_with_graph() -> (Orchestrator, Arc<MemoryGraph>) {
    let store = Arc::new(SessionStore::open_in_memory().unwrap());
    let graph = Arc::new(MemoryGraph::new());
    (Orchestrator::new(store, graph.clone()), graph)
}

#[test]
fn test_first_index_creates_record_and_episode() {
    let (orchestrator, graph) = orchestrator_with_graph();
    let content = content(&[("user", "fix bug"), ("agent", "fixed")]);

    let outcome = orchestrator
        .attempt_index("session-001", &content, TriggerKind::Explicit)
        .unwrap();

    let IndexOutcome::FirstIndexed { episode_id } = outcome else {
        panic!("expected first-indexed, got {:?}", outcome);
    };
    assert!(!episode_id.as_str().is_empty());

    let record = orchestrator.store().get("session-001").unwrap().unwrap();
    assert_eq!(record.lifecycle_state, LifecycleState::Indexed);
    assert_eq!(record.episode_id, Some(episode_id.clone()));
    assert!(record.content_hash.is_some());
    assert!(record.last_indexed_at.is_some());
    assert_eq!(record.message_count, 2);

    assert_eq!(
        graph.episode_content(&episode_id).unwrap(),
        "[user]: fix bug\n[agent]: fixed"
    );
}

#[test]
fn test_second_attempt_with_same_content_is_skipped() {
    let (orchestrator, graph) = orchestrator_with_graph();
    let content = content(&[("user", "fix bug"), ("agent", "fixed")]);

    let first = orchestrator
        .attempt_index("session-001", &content, TriggerKind::Explicit)
        .unwrap();
    let second = orchestrator
        .attempt_index("session-001", &content, TriggerKind::Explicit)
        .unwrap();

    assert_eq!(second, IndexOutcome::Skipped);
    assert_eq!(graph.insert_count(), 1);

    // Episode unchanged
    let record = orchestrator.store().get("session-001").unwrap().unwrap();
    assert_eq!(record.episode_id.as_ref(), first.episode_id());
}

#[test]
fn test_changed_content_replaces_old_episode() {
    let (orchestrator, graph) = orchestrator_with_graph();

    let first = orchestrator
        .attempt_index(
            "session-001",
            &content(&[("user", "fix bug"), ("agent", "fixed")]),
            TriggerKind::Explicit,
        )
        .unwrap();
    let old_episode = first.episode_id().unwrap().clone();

    let second = orchestrator
        .attempt_index(
            "session-001",
            &content(&[
                ("user", "fix bug"),
                ("agent", "fixed"),
                ("user", "thanks"),
            ]),
            TriggerKind::Lazy,
        )
        .unwrap();

    let IndexOutcome::Replaced { episode_id } = second else {
        panic!("expected replaced, got {:?}", second);
    };
    assert_ne!(episode_id, old_episode);
    assert!(graph.episode_content(&old_episode).is_none());
    assert!(graph.episode_content(&episode_id).is_some());
    assert_eq!(graph.delete_count(), 1);
}

#[test]
fn test_busy_when_record_marked_indexing() {
    let (orchestrator, graph) = orchestrator_with_graph();
    let content = content(&[("user", "hello")]);

    let mut record = SessionRecord::new(
        "session-001",
        "/logs/session.jsonl",
        ProjectNamespace::new("ns-test"),
        Utc::now(),
    );
    record.lifecycle_state = LifecycleState::Indexing;
    orchestrator.store().upsert(record).unwrap();

    let outcome = orchestrator
        .attempt_index("session-001", &content, TriggerKind::Lazy)
        .unwrap();
    assert_eq!(outcome, IndexOutcome::Busy);
    assert_eq!(graph.insert_count(), 0);
}

#[test]
fn test_write_failure_reverts_state_and_allows_retry() {
    let (orchestrator, graph) = orchestrator_with_graph();
    let content = content(&[("user", "fix bug")]);

    graph.set_fail_mode(FailMode::InsertFails);
    let err = orchestrator
        .attempt_index("session-001", &content, TriggerKind::Explicit)
        .unwrap_err();
    assert!(matches!(err, Error::Write(_)));

    let record = orchestrator.store().get("session-001").unwrap().unwrap();
    assert_eq!(record.lifecycle_state, LifecycleState::Active);
    assert!(record.content_hash.is_none());
    assert!(record.episode_id.is_none());

    // Same content retries the write instead of skipping
    graph.set_fail_mode(FailMode::None);
    let outcome = orchestrator
        .attempt_index("session-001", &content, TriggerKind::Explicit)
        .unwrap();
    assert!(matches!(outcome, IndexOutcome::FirstIndexed { .. }));
}

#[test]
fn test_delete_failure_keeps_previous_episode_state() {
    let (orchestrator, graph) = orchestrator_with_graph();

    orchestrator
        .attempt_index(
            "session-001",
            &content(&[("user", "v1")]),
            TriggerKind::Explicit,
        )
        .unwrap();

    graph.set_fail_mode(FailMode::DeleteFails);
    let err = orchestrator
        .attempt_index(
            "session-001",
            &content(&[("user", "v2")]),
            TriggerKind::Explicit,
        )
        .unwrap_err();
    assert!(matches!(err, Error::Write(_)));

    // Reverts to Indexed with the old hash, so the next trigger retries
    let record = orchestrator.store().get("session-001").unwrap().unwrap();
    assert_eq!(record.lifecycle_state, LifecycleState::Indexed);
    assert!(record.episode_id.is_some());

    graph.set_fail_mode(FailMode::None);
    let outcome = orchestrator
        .attempt_index(
            "session-001",
            &content(&[("user", "v2")]),
            TriggerKind::Explicit,
        )
        .unwrap();
    assert!(matches!(outcome, IndexOutcome::Replaced { .. }));
}

#[test]
fn test_mark_activity_reactivates_inactive_session() {
    let (orchestrator, _graph) = orchestrator_with_graph();
    let content = content(&[("user", "hello")]);

    let mut record = SessionRecord::new(
        "session-001",
        "/logs/session.jsonl",
        ProjectNamespace::new("ns-test"),
        Utc::now() - chrono::Duration::hours(2),
    );
    record.lifecycle_state = LifecycleState::Inactive;
    orchestrator.store().upsert(record).unwrap();

    orchestrator.mark_activity("session-001", &content).unwrap();

    let updated = orchestrator.store().get("session-001").unwrap().unwrap();
    assert_eq!(updated.lifecycle_state, LifecycleState::Active);
    assert!(Utc::now() - updated.last_activity_at < chrono::Duration::seconds(5));
}

#[test]
fn test_mark_activity_creates_record_on_first_observation() {
    let (orchestrator, _graph) = orchestrator_with_graph();
    let content = content(&[("user", "hello")]);

    orchestrator.mark_activity("session-001", &content).unwrap();

    let record = orchestrator.store().get("session-001").unwrap().unwrap();
    assert_eq!(record.lifecycle_state, LifecycleState::Active);
    assert!(record.episode_id.is_none());
}

#[test]
fn test_sweep_timeout_indexes_stale_active_session() {
    let (orchestrator, _graph) = orchestrator_with_graph();
    let content = content(&[("user", "fix bug"), ("agent", "fixed")]);

    let mut record = SessionRecord::new(
        "session-001",
        "/logs/session.jsonl",
        ProjectNamespace::new("ns-test"),
        Utc::now() - chrono::Duration::hours(1),
    );
    record.lifecycle_state = LifecycleState::Active;
    orchestrator.store().upsert(record).unwrap();

    let outcome = orchestrator
        .sweep_timeout("session-001", Duration::from_secs(1800), &content)
        .unwrap();

    assert!(matches!(outcome, Some(IndexOutcome::FirstIndexed { .. })));
    let updated = orchestrator.store().get("session-001").unwrap().unwrap();
    assert_eq!(updated.lifecycle_state, LifecycleState::Indexed);
}

#[test]
fn test_sweep_timeout_ignores_recent_activity() {
    let (orchestrator, graph) = orchestrator_with_graph();
    let content = content(&[("user", "hello")]);

    orchestrator.mark_activity("session-001", &content).unwrap();

    let outcome = orchestrator
        .sweep_timeout("session-001", Duration::from_secs(1800), &content)
        .unwrap();
    assert!(outcome.is_none());
    assert_eq!(graph.insert_count(), 0);
}

#[test]
fn test_sweep_timeout_ignores_indexed_sessions() {
    let (orchestrator, graph) = orchestrator_with_graph();
    let content = content(&[("user", "hello")]);

    orchestrator
        .attempt_index("session-001", &content, TriggerKind::Explicit)
        .unwrap();

    // Make the record look old without touching its state
    let mut record = orchestrator.store().get("session-001").unwrap().unwrap();
    record.last_activity_at = Utc::now() - chrono::Duration::hours(2);
    orchestrator.store().upsert(record).unwrap();

    let outcome = orchestrator
        .sweep_timeout("session-001", Duration::from_secs(1800), &content)
        .unwrap();
    assert!(outcome.is_none());
    assert_eq!(graph.insert_count(), 1);
}

#[test]
fn test_concurrent_attempts_write_exactly_once() {
    let (orchestrator, graph) = orchestrator_with_graph();
    let orchestrator = Arc::new(orchestrator);
    graph.set_insert_delay(Duration::from_millis(50));

    let content = content(&[("user", "fix bug"), ("agent", "fixed")]);

    let handles: Vec<_> = [TriggerKind::Explicit, TriggerKind::Lazy, TriggerKind::Lazy]
        .into_iter()
        .map(|trigger| {
            let orchestrator = orchestrator.clone();
            let content = content.clone();
            std::thread::spawn(move || {
                orchestrator.attempt_index("session-001", &content, trigger)
            })
        })
        .collect();

    let outcomes: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().unwrap().unwrap())
        .collect();

    // Exactly one attempt wrote; the others were busy or skipped
    assert_eq!(graph.insert_count(), 1);
    assert_eq!(outcomes.iter().filter(|o| o.wrote()).count(), 1);
    assert!(
        outcomes
            .iter()
            .all(|o| o.wrote() || matches!(o, IndexOutcome::Busy | IndexOutcome::Skipped))
    );
}

#[test]
fn test_different_sessions_index_independently() {
    let (orchestrator, graph) = orchestrator_with_graph();
    let orchestrator = Arc::new(orchestrator);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let orchestrator = orchestrator.clone();
            std::thread::spawn(move || {
                let content = SessionContent::new(
                    format!("/logs/session-{}.jsonl", i),
                    ProjectNamespace::new("ns-test"),
                    vec![FilteredMessage::new("user", format!("message {}", i))],
                );
                orchestrator.attempt_index(
                    &format!("session-{:03}", i),
                    &content,
                    TriggerKind::Lazy,
                )
            })
        })
        .collect();

    for handle in handles {
        let outcome = handle.join().unwrap().unwrap();
        assert!(matches!(outcome, IndexOutcome::FirstIndexed { .. }));
    }
    assert_eq!(graph.insert_count(), 4);
}
