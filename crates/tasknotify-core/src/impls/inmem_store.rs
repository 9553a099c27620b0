//! InMemoryTaskStore - 開発用のタスク一覧の保存先
//!
//! # 学習ポイント
//! - `replace()` が保存操作に相当し、直前の一覧を返す
//! - `set_unavailable(true)` で読み込み失敗を再現できる（縮退動作の検証用）

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::{StoreError, Task};
use crate::ports::TaskStore;

#[derive(Debug, Default)]
struct StoreState {
    tasks: Option<Vec<Task>>,
    unavailable: bool,
}

/// InMemoryTaskStore は最新のタスク一覧を 1 つだけ保持する
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    state: Mutex<StoreState>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        Self {
            state: Mutex::new(StoreState {
                tasks: Some(tasks),
                unavailable: false,
            }),
        }
    }

    /// 一覧を置き換え、置き換え前の一覧を返す（まだ何も保存されていなければ `None`）
    pub fn replace(&self, tasks: Vec<Task>) -> Option<Vec<Task>> {
        self.lock().tasks.replace(tasks)
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn load_previous(&self) -> Result<Vec<Task>, StoreError> {
        let state = self.lock();
        if state.unavailable {
            return Err(StoreError::Unavailable("store marked unavailable".to_string()));
        }
        state.tasks.clone().ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_store_has_no_previous_snapshot() {
        let store = InMemoryTaskStore::new();
        assert_eq!(store.load_previous().await, Err(StoreError::NotFound));
    }

    #[tokio::test]
    async fn replace_returns_the_previous_list() {
        let store = InMemoryTaskStore::with_tasks(vec![Task::new("1")]);
        let previous = store.replace(vec![Task::new("2")]);
        assert_eq!(previous, Some(vec![Task::new("1")]));
        assert_eq!(store.load_previous().await, Ok(vec![Task::new("2")]));
    }

    #[tokio::test]
    async fn unavailable_store_fails_to_load() {
        let store = InMemoryTaskStore::with_tasks(vec![Task::new("1")]);
        store.set_unavailable(true);
        assert!(matches!(
            store.load_previous().await,
            Err(StoreError::Unavailable(_))
        ));
    }
}
