//! Debounce Aggregator - 宛先ごとに変更をまとめて 1 通にする
//!
//! # 状態遷移（宛先アドレスごと）
//! - Idle: テーブルに存在しない（初期状態）
//! - Buffering: 最初の enqueue で作成。以後の enqueue はイベントを追記し、タイマーを張り直す
//! - flush で Idle に戻る（配信の成否に関係なく）
//!
//! # 学習ポイント
//! - スライディングウィンドウ: enqueue のたびに送信時刻が「今から D 後」に延びる
//! - タイマーは tokio のタスク。`JoinHandle::abort` で取り消し、張り直す
//! - 世代番号（generation）: 取り消しが間に合わずに起きたタイマーは、自分の世代と
//!   テーブルの世代が一致しなければ何もしない
//! - flush は「テーブルから取り外す」ところまでをロック内で行う。
//!   取り外した後に来た enqueue は新しいバッファを作るので、送信中のスナップショットは壊れない
//! - Mailer の await はロックの外。ある宛先の配信が遅くても他の宛先には影響しない

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use super::digest::{Digest, DigestFormatter};
use super::retry::DeliveryPolicy;
use super::status::Counters;
use crate::domain::{ChangeEvent, Editor};
use crate::ports::Mailer;

/// 既定の debounce 幅（5 分）
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(5 * 60);

/// Buffering 状態の宛先 1 件分
struct PendingDigest {
    recipient_name: String,
    events: Vec<ChangeEvent>,
    last_editor: Option<Editor>,
    generation: u64,
    flush_handle: JoinHandle<()>,
}

struct Shared {
    table: Mutex<HashMap<String, PendingDigest>>,
    formatter: DigestFormatter,
    mailer: Arc<dyn Mailer>,
    window: Duration,
    policy: DeliveryPolicy,
    runtime: Handle,
    next_generation: AtomicU64,
    counters: Arc<Counters>,
}

/// 宛先アドレスをキーにした PendingDigest のテーブルを所有する
///
/// `Clone` は同じテーブルを共有するハンドルを作ります。
#[derive(Clone)]
pub struct DebounceAggregator {
    shared: Arc<Shared>,
}

impl DebounceAggregator {
    /// `runtime` はタイマータスクを spawn する先
    pub fn new(
        formatter: DigestFormatter,
        mailer: Arc<dyn Mailer>,
        window: Duration,
        policy: DeliveryPolicy,
        runtime: Handle,
    ) -> Self {
        Self::with_counters(formatter, mailer, window, policy, runtime, Arc::default())
    }

    pub(crate) fn with_counters(
        formatter: DigestFormatter,
        mailer: Arc<dyn Mailer>,
        window: Duration,
        policy: DeliveryPolicy,
        runtime: Handle,
        counters: Arc<Counters>,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                table: Mutex::new(HashMap::new()),
                formatter,
                mailer,
                window,
                policy,
                runtime,
                next_generation: AtomicU64::new(1),
                counters,
            }),
        }
    }

    pub fn window(&self) -> Duration {
        self.shared.window
    }

    /// 宛先のバッファにイベントを追加し、送信を D 後に（再）予約する
    ///
    /// - Idle なら新しいバッファを作る
    /// - Buffering なら末尾に追記し、既存のタイマーを取り消して張り直す
    /// - `editor` が空でなければ lastEditor を上書きする
    ///
    /// 空のイベント列は何もしない（状態も変えない）。
    pub fn enqueue(
        &self,
        address: &str,
        recipient_name: &str,
        events: Vec<ChangeEvent>,
        editor: Option<Editor>,
    ) {
        if events.is_empty() {
            return;
        }
        let editor = editor.filter(|e| !e.is_empty());
        let added = events.len();

        let mut table = self.shared.lock_table();
        let generation = self.shared.next_generation.fetch_add(1, Ordering::Relaxed);
        let flush_handle = self.schedule(address, generation);

        match table.entry(address.to_string()) {
            Entry::Occupied(mut entry) => {
                let pending = entry.get_mut();
                pending.flush_handle.abort();
                pending.flush_handle = flush_handle;
                pending.generation = generation;
                pending.events.extend(events);
                if editor.is_some() {
                    pending.last_editor = editor;
                }
                tracing::debug!(
                    recipient = %address,
                    added,
                    buffered = pending.events.len(),
                    generation,
                    "extended pending digest and rescheduled flush"
                );
            }
            Entry::Vacant(entry) => {
                entry.insert(PendingDigest {
                    recipient_name: recipient_name.to_string(),
                    events,
                    last_editor: editor,
                    generation,
                    flush_handle,
                });
                tracing::debug!(
                    recipient = %address,
                    added,
                    generation,
                    window_secs = self.shared.window.as_secs_f64(),
                    "started pending digest"
                );
            }
        }
    }

    /// Buffering 状態の宛先（アドレス昇順）
    pub fn pending_recipients(&self) -> Vec<String> {
        let table = self.shared.lock_table();
        let mut addresses: Vec<String> = table.keys().cloned().collect();
        addresses.sort();
        addresses
    }

    /// 宛先にバッファされているイベント数（Idle なら `None`）
    pub fn pending_event_count(&self, address: &str) -> Option<usize> {
        self.shared
            .lock_table()
            .get(address)
            .map(|pending| pending.events.len())
    }

    fn schedule(&self, address: &str, generation: u64) -> JoinHandle<()> {
        let shared: Weak<Shared> = Arc::downgrade(&self.shared);
        let address = address.to_string();
        let window = self.shared.window;
        self.shared.runtime.spawn(async move {
            tokio::time::sleep(window).await;
            // Aggregator が破棄されていたら何もしない（バッファは失われる）
            if let Some(shared) = shared.upgrade() {
                shared.flush(&address, generation).await;
            }
        })
    }
}

impl Shared {
    fn lock_table(&self) -> MutexGuard<'_, HashMap<String, PendingDigest>> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// タイマーから呼ばれる。世代が一致する PendingDigest を取り外して配信する
    async fn flush(&self, address: &str, generation: u64) {
        let pending = {
            let mut table = self.lock_table();
            let current = table
                .get(address)
                .is_some_and(|pending| pending.generation == generation);
            if current { table.remove(address) } else { None }
        };
        let Some(pending) = pending else {
            tracing::debug!(recipient = %address, generation, "stale flush timer; nothing to send");
            return;
        };

        let digest = self.formatter.format(
            &pending.recipient_name,
            &pending.events,
            pending.last_editor.as_ref(),
        );
        self.deliver(address, pending.events.len(), &digest).await;
    }

    async fn deliver(&self, address: &str, events: usize, digest: &Digest) {
        let mut attempt = 1;
        loop {
            match self.mailer.send(address, &digest.subject, &digest.body).await {
                Ok(()) => {
                    self.counters.digest_sent();
                    tracing::info!(recipient = %address, events, attempt, "sent change digest");
                    return;
                }
                Err(error) => match self.policy.next_delay(attempt) {
                    Some(delay) => {
                        tracing::warn!(
                            recipient = %address,
                            events,
                            attempt,
                            %error,
                            retry_in_secs = delay.as_secs_f64(),
                            "change digest delivery failed; retrying once"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    None => {
                        self.counters.digest_failed();
                        tracing::error!(
                            recipient = %address,
                            events,
                            attempt,
                            %error,
                            "change digest delivery failed; dropping buffered events"
                        );
                        return;
                    }
                },
            }
        }
    }
}
