//! ChangeNotifier - 保存処理から呼ばれる唯一の入口
//!
//! # フロー
//! 1. Differ で変更イベントを作る
//! 2. 各イベントの通知先（人名）を Directory でアドレスに解決する
//! 3. アドレスごとにイベントをまとめて Aggregator に enqueue する
//!
//! どの段階の失敗も保存処理には伝播しません（戻り値は `Result` ではなく集計）。

use std::collections::BTreeMap;
use std::sync::Arc;

use super::aggregator::DebounceAggregator;
use super::differ::diff;
use super::directory::Directory;
use super::status::{Counters, NotifierStats};
use crate::domain::{ChangeEvent, Editor, Task};
use crate::ports::TaskStore;

/// 1 回の保存で何が起きたか
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// 生成された変更イベント数
    pub events: usize,
    /// enqueue した宛先アドレス数
    pub recipients: usize,
    /// 解決できなかった人名の数（イベントごとに数える）
    pub unresolved: usize,
}

/// アドレス 1 件分の振り分け結果
struct Routed {
    recipient_name: String,
    events: Vec<ChangeEvent>,
    last_event: usize,
}

pub struct ChangeNotifier {
    directory: Arc<Directory>,
    aggregator: DebounceAggregator,
    counters: Arc<Counters>,
}

impl ChangeNotifier {
    pub(crate) fn new(
        directory: Arc<Directory>,
        aggregator: DebounceAggregator,
        counters: Arc<Counters>,
    ) -> Self {
        Self {
            directory,
            aggregator,
            counters,
        }
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn aggregator(&self) -> &DebounceAggregator {
        &self.aggregator
    }

    /// 保存が成功した後に呼ぶ
    pub fn on_saved(&self, old: &[Task], new: &[Task], editor: Option<Editor>) -> DispatchSummary {
        let events = diff(old, new);
        let mut summary = DispatchSummary {
            events: events.len(),
            ..DispatchSummary::default()
        };
        self.counters.add_events(events.len());

        let mut routes: BTreeMap<String, Routed> = BTreeMap::new();
        for (index, event) in events.iter().enumerate() {
            for person in &event.recipients {
                let Some(address) = self.directory.resolve(person) else {
                    summary.unresolved += 1;
                    tracing::debug!(%person, task = %event.task_id, "no address for recipient; dropping");
                    continue;
                };
                let route = routes.entry(address.to_string()).or_insert_with(|| Routed {
                    recipient_name: person.clone(),
                    events: Vec::new(),
                    last_event: usize::MAX,
                });
                // 別名（"Alice" と "alice" など）で同じアドレスに届く場合も 1 回だけ
                if route.last_event != index {
                    route.events.push(event.clone());
                    route.last_event = index;
                }
            }
        }
        self.counters.add_unresolved(summary.unresolved);

        summary.recipients = routes.len();
        for (address, route) in routes {
            self.aggregator
                .enqueue(&address, &route.recipient_name, route.events, editor.clone());
        }

        tracing::debug!(
            events = summary.events,
            recipients = summary.recipients,
            unresolved = summary.unresolved,
            "dispatched task changes"
        );
        summary
    }

    /// TaskStore から直前の一覧を読んでから `on_saved` する
    ///
    /// 読み込みに失敗した場合は直前の一覧を空として扱います
    /// （すべてのタスクが Created になるが、保存処理は止めない）。
    pub async fn on_saved_with_store(
        &self,
        store: &dyn TaskStore,
        new: &[Task],
        editor: Option<Editor>,
    ) -> DispatchSummary {
        let old = match store.load_previous().await {
            Ok(tasks) => tasks,
            Err(error) => {
                tracing::warn!(%error, "could not load previous tasks; diffing against an empty list");
                Vec::new()
            }
        };
        self.on_saved(&old, new, editor)
    }

    pub fn stats(&self) -> NotifierStats {
        self.counters
            .snapshot(self.aggregator.pending_recipients().len())
    }
}
