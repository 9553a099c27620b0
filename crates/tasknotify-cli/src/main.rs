use std::sync::Arc;

use serde_json::json;
use tokio::time::{Duration, sleep};
use tracing_subscriber::EnvFilter;

use tasknotify_core::impls::{InMemoryTaskStore, LogMailer};
use tasknotify_core::{Editor, NotifierBuilder, NotifierConfig, Task};

/// デモ: 保存を数回再生し、debounce 後にダイジェストが 1 通ずつ出ることを確認する
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // (A) 設定を読む（壊れていれば既定値で続行）
    let mut config = NotifierConfig::load().unwrap_or_else(|error| {
        tracing::warn!(%error, "invalid configuration; using defaults");
        NotifierConfig::default()
    });
    if config.directory().is_empty() {
        config.directory = json!({"Alice": "alice@example.com", "Bob": "bob@example.com"});
    }

    // (B) 通知サブシステムを組み立てる
    let notifier = match NotifierBuilder::from_config(&config)
        .mailer(Arc::new(LogMailer))
        .build()
    {
        Ok(notifier) => notifier,
        Err(error) => {
            tracing::error!(%error, "could not build notifier");
            return;
        }
    };
    let store = InMemoryTaskStore::new();
    let editor = Some(Editor::new("Demo", "demo@example.com"));

    // (C) 保存を 3 回再生する（store が保存処理の役）
    let saves = [
        json!([{"id": 1, "title": "Write docs", "status": "todo", "assignedTo": ["Alice"]}]),
        json!([
            {"id": 1, "title": "Write docs", "status": "doing", "assignedTo": ["Alice"]},
            {"id": 2, "title": "Ship it", "links": "https://example.com/pr/7", "assignedTo": "bob"}
        ]),
        json!([{"id": 2, "title": "Ship it", "status": "done", "assignedTo": ["Bob", "Alice"]}]),
    ];
    for snapshot in &saves {
        let next = Task::list_from_json(snapshot);
        let summary = notifier
            .on_saved_with_store(&store, &next, editor.clone())
            .await;
        store.replace(next);
        tracing::info!(
            events = summary.events,
            recipients = summary.recipients,
            unresolved = summary.unresolved,
            "saved"
        );
    }

    // (D) 最後の保存から debounce 幅だけ待つ
    let window = notifier.aggregator().window();
    tracing::info!(
        pending = ?notifier.aggregator().pending_recipients(),
        wait_secs = window.as_secs(),
        "waiting for digests"
    );
    sleep(window + Duration::from_millis(200)).await;

    match serde_json::to_string(&notifier.stats()) {
        Ok(stats) => println!("{stats}"),
        Err(error) => tracing::error!(%error, "could not serialize stats"),
    }
}
