//! tasknotify-core
//!
//! タスク一覧の保存をきっかけに、変更を担当者へメールで知らせる通知サブシステム。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（TaskId, Task, 正規形, ChangeEvent, エラー）
//! - **ports**: 抽象化レイヤー（TaskStore, Mailer, Clock）
//! - **app**: アプリケーションロジック（differ, directory, digest, aggregator, notifier, builder）
//! - **impls**: 実装（InMemoryTaskStore, RecordingMailer, LogMailer）
//! - **config**: figment による設定の読み込み
//!
//! # 流れ
//! 保存が成功したら `ChangeNotifier::on_saved(old, new, editor)` を呼ぶ。
//! Differ → Directory → DebounceAggregator と進み、宛先ごとに最後の変更から
//! debounce 幅が過ぎたところで 1 通だけ送信される。

pub mod domain;
pub mod ports;
pub mod app;
pub mod impls;
pub mod config;

pub use app::{ChangeNotifier, DispatchSummary, NotifierBuilder};
pub use config::NotifierConfig;
pub use domain::{ChangeEvent, ChangeKind, Editor, Task, TaskId};
