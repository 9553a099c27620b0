//! Differ - 2 つのスナップショットから変更イベントを作る
//!
//! # アルゴリズム
//! 1. 新旧それぞれ TaskId → Task の索引を作る（HashMap、O(n)）
//! 2. どちらかに存在する TaskId を昇順に走査する（出力順を決定的にするため BTreeSet）
//! 3. 片側にしかないものは Created / Deleted、両側にあるものは正規形で比較して Updated
//!
//! 同じスナップショット内で TaskId が重複した場合は、後に出てきたレコードが勝ちます。
//! TaskId が空のレコードは比較できないので無視します。
//!
//! # 計算量
//! 索引づくりと比較は O(n) ですが、出力を TaskId 順に並べるための BTreeSet で
//! 全体は O(n log n) になります。ダイジェストの行順を保存ごとに安定させる代わりに、
//! この対数分を払っています。順序が不要なら `ids` を HashSet にすれば O(n) に戻ります。

use std::collections::{BTreeSet, HashMap};

use crate::domain::normalize::assignees;
use crate::domain::{ChangeEvent, Task, TaskId, normalize};

/// `old` → `new` の変更イベントを TaskId の昇順で返す
pub fn diff(old: &[Task], new: &[Task]) -> Vec<ChangeEvent> {
    let before = index(old);
    let after = index(new);

    let ids: BTreeSet<&TaskId> = before.keys().chain(after.keys()).copied().collect();

    let mut events = Vec::new();
    for id in ids {
        match (before.get(id), after.get(id)) {
            (None, Some(created)) => {
                events.push(ChangeEvent::created((*created).clone(), assignees(created)));
            }
            (Some(deleted), None) => {
                events.push(ChangeEvent::deleted((*deleted).clone(), assignees(deleted)));
            }
            (Some(prev), Some(next)) => {
                let deltas = normalize(Some(prev)).deltas(&normalize(Some(next)));
                if deltas.is_empty() {
                    continue;
                }
                // 担当から外れた人にも通知するため、新旧の和集合にする
                let recipients = assignees(prev).into_iter().chain(assignees(next)).collect();
                events.push(ChangeEvent::updated(
                    (*prev).clone(),
                    (*next).clone(),
                    deltas,
                    recipients,
                ));
            }
            (None, None) => {}
        }
    }

    tracing::debug!(
        old = old.len(),
        new = new.len(),
        events = events.len(),
        "diffed task snapshots"
    );
    events
}

fn index(tasks: &[Task]) -> HashMap<&TaskId, &Task> {
    let mut by_id = HashMap::with_capacity(tasks.len());
    for task in tasks {
        if task.id.is_blank() {
            tracing::debug!("ignoring task without an identifier");
            continue;
        }
        // last-seen-wins
        by_id.insert(&task.id, task);
    }
    by_id
}
