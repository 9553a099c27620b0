//! Field Normalizer - 監視対象フィールドの正規形
//!
//! # 学習ポイント
//! - 比較は「正規化したレコードの構造的等価性」で行う（JSON 文字列化して比べない）
//! - 複数値フィールドは trim → 空要素除去 → 重複除去 → 辞書順ソート
//! - 区切り文字列と配列は同じ正規形になる
//!
//! `normalize(None)` は全フィールドが空のレコードを返すので、
//! 作成・削除されたタスクも同じ仕組みで比較できます。

use std::collections::BTreeSet;
use std::fmt;

use super::change::FieldDelta;
use super::task::{MultiValue, Task};

/// 通知のきっかけになるフィールド
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WatchedField {
    Status,
    Title,
    Description,
    Deadline,
    Links,
    AssignedTo,
}

impl WatchedField {
    /// 比較・表示の順序
    pub const ALL: [WatchedField; 6] = [
        WatchedField::Status,
        WatchedField::Title,
        WatchedField::Description,
        WatchedField::Deadline,
        WatchedField::Links,
        WatchedField::AssignedTo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WatchedField::Status => "status",
            WatchedField::Title => "title",
            WatchedField::Description => "description",
            WatchedField::Deadline => "deadline",
            WatchedField::Links => "links",
            WatchedField::AssignedTo => "assignedTo",
        }
    }
}

impl fmt::Display for WatchedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 正規化済みのフィールド値
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Set(Vec<String>),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Set(items) => items.is_empty(),
        }
    }
}

/// 複数値はソート済みの要素をカンマ区切りで表示する（同じ入力なら常に同じ文字列）
impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Set(items) => f.write_str(&items.join(", ")),
        }
    }
}

/// 監視対象フィールドだけを持つ正規形
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedTask {
    pub status: String,
    pub title: String,
    pub description: String,
    pub deadline: String,
    pub links: Vec<String>,
    pub assigned_to: Vec<String>,
}

impl NormalizedTask {
    pub fn value(&self, field: WatchedField) -> FieldValue {
        match field {
            WatchedField::Status => FieldValue::Text(self.status.clone()),
            WatchedField::Title => FieldValue::Text(self.title.clone()),
            WatchedField::Description => FieldValue::Text(self.description.clone()),
            WatchedField::Deadline => FieldValue::Text(self.deadline.clone()),
            WatchedField::Links => FieldValue::Set(self.links.clone()),
            WatchedField::AssignedTo => FieldValue::Set(self.assigned_to.clone()),
        }
    }

    /// フィールド単位で比較し、値が異なるものだけを返す
    pub fn deltas(&self, next: &NormalizedTask) -> Vec<FieldDelta> {
        WatchedField::ALL
            .into_iter()
            .filter_map(|field| {
                let old = self.value(field);
                let new = next.value(field);
                (old != new).then(|| FieldDelta { field, old, new })
            })
            .collect()
    }
}

/// タスクを正規形に射影する。`None` は空のレコードになる。
pub fn normalize(task: Option<&Task>) -> NormalizedTask {
    let Some(task) = task else {
        return NormalizedTask::default();
    };
    NormalizedTask {
        status: trimmed(task.status.as_deref()),
        title: trimmed(task.title.as_deref()),
        description: trimmed(task.description.as_deref()),
        deadline: trimmed(task.deadline.as_deref()),
        links: normalize_links(&task.links),
        assigned_to: normalize_assignees(&task.assigned_to),
    }
}

/// 担当者の正規化済み集合（通知先の名前）
pub fn assignees(task: &Task) -> BTreeSet<String> {
    normalize_assignees(&task.assigned_to).into_iter().collect()
}

fn trimmed(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}

// URL は空白を含まないので、links は空白でも区切る
fn is_link_separator(c: char) -> bool {
    c == ',' || c == ';' || c.is_whitespace()
}

// 人名は空白を含むので、assignedTo は空白では区切らない
fn is_assignee_separator(c: char) -> bool {
    c == ',' || c == ';' || c == '\n' || c == '\r'
}

fn normalize_links(links: &MultiValue) -> Vec<String> {
    canonical_set(links, is_link_separator)
}

fn normalize_assignees(people: &MultiValue) -> Vec<String> {
    canonical_set(people, is_assignee_separator)
}

fn canonical_set(value: &MultiValue, separator: fn(char) -> bool) -> Vec<String> {
    let items: BTreeSet<String> = match value {
        MultiValue::Delimited(raw) => raw
            .split(separator)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        MultiValue::List(items) => items
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
    };
    items.into_iter().collect()
}
