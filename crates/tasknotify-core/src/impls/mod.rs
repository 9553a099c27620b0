//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports の実装を含めます。
//!
//! # 含まれる実装
//! - **InMemoryTaskStore**: 開発用のタスク一覧
//! - **RecordingMailer**: 送信内容を記録する Mailer（失敗の注入つき）
//! - **LogMailer**: tracing に書き出すだけの Mailer
//!
//! # 本番用実装
//! 本番用の実装（リモートの JSON blob、SMTP など）はこの crate の外に置きます。

pub mod inmem_store;
pub mod recording_mailer;
pub mod log_mailer;

// 主要な型を再エクスポート
pub use self::inmem_store::InMemoryTaskStore;
pub use self::recording_mailer::{RecordingMailer, SentMail};
pub use self::log_mailer::LogMailer;
