//! Errors - 外部コラボレータの失敗
//!
//! この crate の中で発生するエラーは、保存処理には決して伝播しません。
//! - 宛先の解決失敗: エラーではない（呼び出し側で数えて捨てる）
//! - フィールドの型崩れ: 正規化で既定値になる（エラーにしない）
//! - 配信失敗: [`MailError`] としてログに残し、バッファは破棄する
//! - 直前スナップショットの取得失敗: [`StoreError`] を空リストに縮退させる

use thiserror::Error;

/// Mailer の配信失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MailError {
    #[error("mail transport rejected message to {to}: {reason}")]
    Rejected { to: String, reason: String },

    #[error("mail transport unavailable: {0}")]
    Unavailable(String),
}

/// TaskStore の読み込み失敗
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("previous snapshot not found")]
    NotFound,

    #[error("task store unavailable: {0}")]
    Unavailable(String),
}
