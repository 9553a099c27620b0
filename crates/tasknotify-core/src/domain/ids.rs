//! Domain identifiers.
//!
//! # TaskId
//! タスクの識別子は外部の TaskStore が採番するため、この crate では生成しません。
//! 保存されている JSON では文字列の場合も数値の場合もあるので、
//! どちらも同じ `TaskId` に正規化します（`1` と `"1"` は同一タスク）。

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

/// タスクの安定した一意キー
///
/// 空文字列の TaskId は「識別子なし」を意味し、Differ はそのレコードを無視します。
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 識別子が空かどうか
    pub fn is_blank(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for TaskId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<u64> for TaskId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // 文字列・数値以外（null, object など）は「識別子なし」として扱う
        let id = match Value::deserialize(deserializer)? {
            Value::String(s) => TaskId::new(s),
            Value::Number(n) => TaskId::new(n.to_string()),
            _ => TaskId::default(),
        };
        Ok(id)
    }
}
