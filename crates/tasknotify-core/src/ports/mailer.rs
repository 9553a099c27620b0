//! Mailer port - メール配信の抽象化
//!
//! 呼び出されるのは Aggregator の flush の中だけです。
//! タイムアウトはかけず、失敗はログに残して終わり（再送キューには戻さない）。

use async_trait::async_trait;

use crate::domain::MailError;

/// Mailer は 1 通のメールを配信する
///
/// # Thread Safety
/// - `Send + Sync` を要求（受信者ごとの flush タスクから並行に呼ばれる）
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError>;
}
