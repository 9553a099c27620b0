//! Change - Differ が生成する変更イベント
//!
//! ChangeEvent は diff のたびに作られ、そのまま Aggregator に渡されます（永続化しない）。

use std::collections::BTreeSet;

use super::normalize::{FieldValue, WatchedField, normalize};
use super::{Task, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Created,
    Updated,
    Deleted,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Created => "created",
            ChangeKind::Updated => "updated",
            ChangeKind::Deleted => "deleted",
        }
    }
}

/// 1 フィールド分の差分（正規化後の値）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDelta {
    pub field: WatchedField,
    pub old: FieldValue,
    pub new: FieldValue,
}

/// 変更イベント
///
/// - Created: `after` のみ、recipients = 新しい担当者
/// - Deleted: `before` のみ、recipients = 元の担当者
/// - Updated: 両方あり、`field_deltas` は空でない、recipients = 新旧担当者の和集合
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub task_id: TaskId,
    pub before: Option<Task>,
    pub after: Option<Task>,
    pub field_deltas: Vec<FieldDelta>,
    pub recipients: BTreeSet<String>,
}

impl ChangeEvent {
    pub fn created(after: Task, recipients: BTreeSet<String>) -> Self {
        Self {
            kind: ChangeKind::Created,
            task_id: after.id.clone(),
            before: None,
            after: Some(after),
            field_deltas: Vec::new(),
            recipients,
        }
    }

    pub fn deleted(before: Task, recipients: BTreeSet<String>) -> Self {
        Self {
            kind: ChangeKind::Deleted,
            task_id: before.id.clone(),
            before: Some(before),
            after: None,
            field_deltas: Vec::new(),
            recipients,
        }
    }

    pub fn updated(
        before: Task,
        after: Task,
        field_deltas: Vec<FieldDelta>,
        recipients: BTreeSet<String>,
    ) -> Self {
        Self {
            kind: ChangeKind::Updated,
            task_id: after.id.clone(),
            before: Some(before),
            after: Some(after),
            field_deltas,
            recipients,
        }
    }

    /// 表示用のタイトル（新しい状態を優先し、なければ古い状態）
    pub fn title(&self) -> String {
        let after = normalize(self.after.as_ref()).title;
        if !after.is_empty() {
            return after;
        }
        normalize(self.before.as_ref()).title
    }
}

/// 保存操作を行った人
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Editor {
    pub name: String,
    pub address: String,
}

impl Editor {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            address: address.into().trim().to_string(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.address.is_empty()
    }
}
