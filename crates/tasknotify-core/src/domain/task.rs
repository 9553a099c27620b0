//! Task - TaskStore が保持するタスクレコードの一時コピー
//!
//! 保存データは画面側から自由に書き込まれる JSON なので、型が揃っている保証がありません。
//! ここでは「壊れたフィールドで失敗しない」ことを優先し、どんな形でも
//! デコードできるようにしています。
//!
//! - スカラー項目: 文字列・数値・真偽値を文字列として受け取り、それ以外は `None`
//! - `links` / `assignedTo`: 配列でも区切り文字列でも受け取る（[`MultiValue`]）
//! - 監視対象外のキーは読み捨てる

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::TaskId;

/// 複数値フィールド（links, assignedTo）の生の表現
///
/// 正規化（分割・trim・重複除去・ソート）は [`crate::domain::normalize`] が担当します。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MultiValue {
    /// `"a, b c"` のような区切り文字列
    Delimited(String),
    /// `["a", "b"]` のような配列
    List(Vec<String>),
}

impl MultiValue {
    pub fn empty() -> Self {
        MultiValue::List(Vec::new())
    }
}

impl Default for MultiValue {
    fn default() -> Self {
        Self::empty()
    }
}

impl<S: Into<String>> FromIterator<S> for MultiValue {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        MultiValue::List(iter.into_iter().map(Into::into).collect())
    }
}

/// タスクレコード
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(default)]
    pub id: TaskId,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub deadline: Option<String>,
    #[serde(default, deserialize_with = "lenient_multi")]
    pub links: MultiValue,
    #[serde(default, deserialize_with = "lenient_multi")]
    pub assigned_to: MultiValue,
}

impl Task {
    pub fn new(id: impl Into<TaskId>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_deadline(mut self, deadline: impl Into<String>) -> Self {
        self.deadline = Some(deadline.into());
        self
    }

    pub fn with_links(mut self, links: MultiValue) -> Self {
        self.links = links;
        self
    }

    pub fn with_assigned_to<S: Into<String>>(mut self, people: impl IntoIterator<Item = S>) -> Self {
        self.assigned_to = people.into_iter().collect();
        self
    }

    /// スナップショット全体（JSON 配列）をデコード
    ///
    /// 配列でない値は空リストとして扱います。配列の要素のうち object でないものは
    /// タスクとして解釈できないので読み飛ばします。
    pub fn list_from_json(value: &Value) -> Vec<Task> {
        let Value::Array(items) = value else {
            tracing::debug!("task snapshot is not an array; treating it as empty");
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| match Task::deserialize(item) {
                Ok(task) => Some(task),
                Err(error) => {
                    tracing::debug!(%error, "skipping undecodable task record");
                    None
                }
            })
            .collect()
    }

    /// JSON 文字列からスナップショットをデコード（壊れた JSON は空リスト）
    pub fn list_from_json_str(raw: &str) -> Vec<Task> {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::list_from_json(&value),
            Err(error) => {
                tracing::debug!(%error, "task snapshot is not valid JSON; treating it as empty");
                Vec::new()
            }
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(scalar_to_string(&Value::deserialize(deserializer)?))
}

fn lenient_multi<'de, D: Deserializer<'de>>(deserializer: D) -> Result<MultiValue, D::Error> {
    let multi = match Value::deserialize(deserializer)? {
        Value::Array(items) => MultiValue::List(items.iter().filter_map(scalar_to_string).collect()),
        other => match scalar_to_string(&other) {
            Some(s) => MultiValue::Delimited(s),
            None => MultiValue::empty(),
        },
    };
    Ok(multi)
}
