//! Status - 通知処理のカウンタ
//!
//! 解決できなかった宛先や配信失敗は「エラー」ではなく「数えるもの」なので、
//! ここに集計してスナップショットとして公開します。

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// ある時点のカウンタ値
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotifierStats {
    /// Differ が生成したイベント数
    pub events_emitted: u64,
    /// Directory で解決できなかった宛先（人名）の数
    pub unresolved_recipients: u64,
    /// 配信に成功したダイジェスト数
    pub digests_sent: u64,
    /// 配信に失敗して破棄されたダイジェスト数
    pub digests_failed: u64,
    /// いま Buffering 状態の宛先数
    pub pending_recipients: usize,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
    events_emitted: AtomicU64,
    unresolved_recipients: AtomicU64,
    digests_sent: AtomicU64,
    digests_failed: AtomicU64,
}

impl Counters {
    pub(crate) fn add_events(&self, n: usize) {
        self.events_emitted.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub(crate) fn add_unresolved(&self, n: usize) {
        self.unresolved_recipients.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub(crate) fn digest_sent(&self) {
        self.digests_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn digest_failed(&self) {
        self.digests_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, pending_recipients: usize) -> NotifierStats {
        NotifierStats {
            events_emitted: self.events_emitted.load(Ordering::Relaxed),
            unresolved_recipients: self.unresolved_recipients.load(Ordering::Relaxed),
            digests_sent: self.digests_sent.load(Ordering::Relaxed),
            digests_failed: self.digests_failed.load(Ordering::Relaxed),
            pending_recipients,
        }
    }
}
