//! TaskStore port - タスク一覧の正本（source of truth）
//!
//! 実際の保存先（リモートの JSON blob など）はこの crate の外にあります。
//! ここで必要なのは「保存直前の一覧」を読むことだけです。

use async_trait::async_trait;

use crate::domain::{StoreError, Task};

/// TaskStore は保存前後のタスク一覧を提供する
///
/// # 設計原則
/// - この crate はタスクを書き換えない（読むだけ）
/// - 読み込み失敗は呼び出し側で空リストに縮退させる
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// 保存前のタスク一覧を取得
    async fn load_previous(&self) -> Result<Vec<Task>, StoreError>;
}
