//! End-to-end flow: save → diff → resolve → debounce → digest → mailer.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;
use serde_json::json;
use tokio::time::sleep;

use tasknotify_core::app::{DeliveryPolicy, Directory};
use tasknotify_core::impls::{InMemoryTaskStore, RecordingMailer};
use tasknotify_core::ports::FixedClock;
use tasknotify_core::{ChangeNotifier, Editor, NotifierBuilder, Task};

const D: Duration = Duration::from_secs(300);

fn build(mailer: Arc<RecordingMailer>, policy: DeliveryPolicy) -> ChangeNotifier {
    let at = Utc.with_ymd_and_hms(2026, 10, 17, 9, 30, 0).unwrap();
    NotifierBuilder::new()
        .directory(Directory::from_json(
            r#"{"Alice": "alice@x.com", "Bob": "bob@x.com", "Cara": "cara@x.com"}"#,
        ))
        .mailer(mailer)
        .clock(Arc::new(FixedClock::new(at)))
        .debounce_window(D)
        .delivery_policy(policy)
        .subject_prefix("[Board]")
        .build()
        .unwrap()
}

fn tasks(value: serde_json::Value) -> Vec<Task> {
    Task::list_from_json(&value)
}

#[tokio::test(start_paused = true)]
async fn status_change_produces_one_digest() {
    let mailer = Arc::new(RecordingMailer::new());
    let notifier = build(mailer.clone(), DeliveryPolicy::SingleAttempt);

    let old = tasks(json!([{"id": 1, "title": "Write docs", "status": "todo", "assignedTo": ["Alice"]}]));
    let new = tasks(json!([{"id": 1, "title": "Write docs", "status": "done", "assignedTo": ["Alice"]}]));
    notifier.on_saved(&old, &new, Some(Editor::new("Dana", "dana@x.com")));

    sleep(D + Duration::from_secs(1)).await;

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "alice@x.com");
    assert_eq!(sent[0].subject, "[Board] 1 task change");
    assert_eq!(
        sent[0].body,
        "Hi Alice,\n\
         \n\
         Changed by: Dana <dana@x.com>\n\
         Rendered at: 2026-10-17T09:30:00+00:00\n\
         \n\
         [updated] Write docs (#1)\n  \
         status: todo -> done\n"
    );
}

#[tokio::test(start_paused = true)]
async fn rapid_saves_coalesce_per_recipient() {
    let mailer = Arc::new(RecordingMailer::new());
    let notifier = build(mailer.clone(), DeliveryPolicy::SingleAttempt);

    let v1 = tasks(json!([]));
    let v2 = tasks(json!([{"id": 2, "title": "Ship it", "assignedTo": ["Bob", "Cara"]}]));
    let v3 = tasks(json!([{"id": 2, "title": "Ship it", "status": "doing", "assignedTo": ["Bob", "Cara"]}]));
    let v4 = tasks(json!([{"id": 2, "title": "Ship it", "status": "doing", "assignedTo": ["Bob"]}]));

    notifier.on_saved(&v1, &v2, Some(Editor::new("Bob", "bob@x.com")));
    sleep(Duration::from_secs(60)).await;
    notifier.on_saved(&v2, &v3, Some(Editor::new("Cara", "cara@x.com")));
    sleep(Duration::from_secs(60)).await;
    notifier.on_saved(&v3, &v4, Some(Editor::new("Bob", "bob@x.com")));

    assert_eq!(notifier.aggregator().pending_event_count("bob@x.com"), Some(3));
    assert_eq!(notifier.aggregator().pending_event_count("cara@x.com"), Some(3));

    sleep(D - Duration::from_secs(1)).await;
    assert!(mailer.sent().is_empty());

    sleep(Duration::from_secs(2)).await;
    let mut sent = mailer.sent();
    sent.sort_by(|a, b| a.to.cmp(&b.to));
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].to, "bob@x.com");
    assert_eq!(sent[1].to, "cara@x.com");
    for mail in &sent {
        assert_eq!(mail.subject, "[Board] 3 task changes");
        assert!(mail.body.contains("Changed by: Bob <bob@x.com>\n"));
        assert!(mail.body.contains("  assignedTo: Bob, Cara -> Bob\n"));
    }

    let stats = notifier.stats();
    assert_eq!(stats.events_emitted, 3);
    assert_eq!(stats.digests_sent, 2);
    assert_eq!(stats.pending_recipients, 0);
}

#[tokio::test(start_paused = true)]
async fn reordered_links_do_not_notify() {
    let mailer = Arc::new(RecordingMailer::new());
    let notifier = build(mailer.clone(), DeliveryPolicy::SingleAttempt);

    let old = tasks(json!([{"id": 1, "links": ["https://a", "https://b"], "assignedTo": "Alice"}]));
    let new = tasks(json!([{"id": "1", "links": "https://b, https://a", "assignedTo": ["Alice"]}]));
    let summary = notifier.on_saved(&old, &new, None);

    assert_eq!(summary.events, 0);
    sleep(D * 2).await;
    assert_eq!(mailer.attempts(), 0);
}

#[tokio::test(start_paused = true)]
async fn failed_delivery_is_counted_and_not_requeued() {
    let mailer = Arc::new(RecordingMailer::new());
    mailer.fail_for("alice@x.com");
    let notifier = build(mailer.clone(), DeliveryPolicy::SingleAttempt);

    let new = tasks(json!([{"id": 1, "title": "A", "assignedTo": ["Alice", "Bob"]}]));
    notifier.on_saved(&[], &new, None);
    sleep(D + Duration::from_secs(1)).await;

    let stats = notifier.stats();
    assert_eq!(stats.digests_sent, 1);
    assert_eq!(stats.digests_failed, 1);
    assert_eq!(stats.pending_recipients, 0);

    sleep(D * 3).await;
    assert_eq!(mailer.attempts(), 2);
}

#[tokio::test(start_paused = true)]
async fn retry_policy_recovers_from_one_failure() {
    let mailer = Arc::new(RecordingMailer::new());
    mailer.fail_next(1);
    let notifier = build(
        mailer.clone(),
        DeliveryPolicy::RetryOnce {
            delay: Duration::from_secs(10),
        },
    );

    let new = tasks(json!([{"id": 1, "title": "A", "assignedTo": ["Alice"]}]));
    notifier.on_saved(&[], &new, None);
    sleep(D + Duration::from_secs(11)).await;

    assert_eq!(mailer.attempts(), 2);
    assert_eq!(mailer.sent().len(), 1);
    assert_eq!(notifier.stats().digests_failed, 0);
}

#[tokio::test(start_paused = true)]
async fn saves_through_the_store_follow_each_snapshot() {
    let mailer = Arc::new(RecordingMailer::new());
    let notifier = build(mailer.clone(), DeliveryPolicy::SingleAttempt);
    let store = InMemoryTaskStore::new();

    // まだ何も保存されていない: 直前の一覧は空として扱う
    let first = tasks(json!([{"id": 1, "title": "A", "assignedTo": ["Alice"]}]));
    let summary = notifier.on_saved_with_store(&store, &first, None).await;
    assert_eq!(summary.events, 1);
    store.replace(first.clone());

    let second = tasks(json!([]));
    let summary = notifier.on_saved_with_store(&store, &second, None).await;
    assert_eq!(summary.events, 1);
    store.replace(second);

    sleep(D + Duration::from_secs(1)).await;
    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].body.contains("[created] A (#1)"));
    assert!(sent[0].body.contains("[deleted] A (#1)"));
}

#[tokio::test(start_paused = true)]
async fn case_insensitive_names_resolve() {
    let mailer = Arc::new(RecordingMailer::new());
    let notifier = build(mailer.clone(), DeliveryPolicy::SingleAttempt);

    let new = tasks(json!([{"id": 1, "assignedTo": "alice; BOB; nobody"}]));
    let summary = notifier.on_saved(&[], &new, None);

    assert_eq!(summary.recipients, 2);
    assert_eq!(summary.unresolved, 1);
    assert_eq!(
        notifier.aggregator().pending_recipients(),
        vec!["alice@x.com".to_string(), "bob@x.com".to_string()]
    );
}
