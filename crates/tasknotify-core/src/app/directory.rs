//! Directory - 人名 → メールアドレスの静的な対応表（Recipient Resolver）
//!
//! 起動時に設定値（テーブルまたは JSON object）から一度だけ読み込み、以後は読み取り専用です。
//! 設定が壊れていても起動は止めず、空の Directory として扱います。

use serde_json::Value;
use std::collections::HashMap;

/// 宛先の対応表
///
/// # 解決順
/// 1. 完全一致
/// 2. 大文字小文字を無視した一致
///
/// 不変なので `Arc<Directory>` で共有すれば並行に呼び出せます。
#[derive(Debug, Clone, Default)]
pub struct Directory {
    exact: HashMap<String, String>,
    folded: HashMap<String, String>,
}

impl Directory {
    pub fn new<N, A>(entries: impl IntoIterator<Item = (N, A)>) -> Self
    where
        N: Into<String>,
        A: Into<String>,
    {
        let mut exact = HashMap::new();
        let mut folded = HashMap::new();
        for (name, address) in entries {
            let name = name.into().trim().to_string();
            let address = address.into().trim().to_string();
            if name.is_empty() || address.is_empty() {
                continue;
            }
            // 大文字小文字だけが違う名前が複数ある場合は最初のものを使う
            folded
                .entry(name.to_lowercase())
                .or_insert_with(|| address.clone());
            exact.insert(name, address);
        }
        Self { exact, folded }
    }

    /// `{"Alice": "alice@x.com", ...}` 形式の JSON 文字列から読み込む
    ///
    /// 壊れた JSON は空の Directory になります。
    pub fn from_json(raw: &str) -> Self {
        match serde_json::from_str::<Value>(raw) {
            Ok(value) => Self::from_value(value),
            Err(error) => {
                tracing::warn!(%error, "recipient directory is not valid JSON; no recipients will resolve");
                Self::default()
            }
        }
    }

    /// 読み込み済みの値（TOML テーブルや env の dict 由来）から作る
    ///
    /// object でない値は空の Directory になります。
    /// 値が文字列でないエントリは読み飛ばします。
    pub fn from_value(value: Value) -> Self {
        let Value::Object(map) = value else {
            tracing::warn!("recipient directory is not a JSON object; no recipients will resolve");
            return Self::default();
        };
        let entries = map
            .into_iter()
            .filter_map(|(name, address)| match address {
                Value::String(address) => Some((name, address)),
                _ => {
                    tracing::debug!(%name, "skipping directory entry without a string address");
                    None
                }
            });
        let directory = Self::new(entries);
        tracing::debug!(entries = directory.len(), "loaded recipient directory");
        directory
    }

    /// 人名からアドレスを引く（見つからなければ `None`）
    pub fn resolve(&self, person: &str) -> Option<&str> {
        let person = person.trim();
        self.exact
            .get(person)
            .or_else(|| self.folded.get(&person.to_lowercase()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.exact.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }
}
