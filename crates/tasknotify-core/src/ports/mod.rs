//! Ports - 抽象化レイヤー
//!
//! このモジュールは Hexagonal Architecture の「ポート」を定義します。
//! 各 trait は外部コラボレータ（タスクの保存先、メール配信、時計）への
//! インターフェースを提供し、実装の詳細を隠蔽します。
//!
//! # 設計原則
//! - TaskStore が正本（この crate は読むだけ）
//! - Mailer は best-effort（1 回だけ試す。ポリシーで再送 1 回まで）
//! - Clock は差し替え可能（テストでは FixedClock）

pub mod task_store;
pub mod mailer;
pub mod clock;

// 主要な trait を再エクスポート
pub use self::task_store::TaskStore;
pub use self::mailer::Mailer;
pub use self::clock::{Clock, FixedClock, SystemClock};
