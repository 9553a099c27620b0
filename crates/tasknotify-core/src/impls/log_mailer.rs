//! LogMailer - 実際には送らず、tracing に書き出す Mailer
//!
//! メール送信の実装を持たない環境（開発・デモ）での既定の Mailer です。

use async_trait::async_trait;

use crate::domain::MailError;
use crate::ports::Mailer;

#[derive(Debug, Clone, Copy, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        tracing::info!(%to, %subject, lines = body.lines().count(), "mail (log only)");
        tracing::debug!(%to, "mail body:\n{body}");
        Ok(())
    }
}
