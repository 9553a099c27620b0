//! RecordingMailer - 送信内容を記録するだけの Mailer（テスト・デモ用）
//!
//! # 学習ポイント
//! - 失敗の注入（次の N 回 / 特定の宛先）で配信失敗の扱いを検証できる
//! - `attempts()` は失敗も含めた呼び出し回数、`sent()` は成功したものだけ

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::MailError;
use crate::ports::Mailer;

/// 記録された 1 通
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Default)]
struct RecorderState {
    sent: Vec<SentMail>,
    attempts: usize,
    fail_next: usize,
    failing_addresses: HashSet<String>,
}

#[derive(Debug, Default)]
pub struct RecordingMailer {
    state: Mutex<RecorderState>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 次の `n` 回の送信を失敗させる
    pub fn fail_next(&self, n: usize) {
        self.lock().fail_next = n;
    }

    /// この宛先への送信を常に失敗させる
    pub fn fail_for(&self, address: &str) {
        self.lock().failing_addresses.insert(address.to_string());
    }

    /// 成功した送信
    pub fn sent(&self) -> Vec<SentMail> {
        self.lock().sent.clone()
    }

    /// 失敗を含めた送信の試行回数
    pub fn attempts(&self) -> usize {
        self.lock().attempts
    }

    fn lock(&self) -> MutexGuard<'_, RecorderState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        let mut state = self.lock();
        state.attempts += 1;
        if state.failing_addresses.contains(to) {
            return Err(MailError::Rejected {
                to: to.to_string(),
                reason: "address configured to fail".to_string(),
            });
        }
        if state.fail_next > 0 {
            state.fail_next -= 1;
            return Err(MailError::Unavailable("injected failure".to_string()));
        }
        state.sent.push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_successful_sends() {
        let mailer = RecordingMailer::new();
        mailer.send("a@x.com", "subject", "body").await.unwrap();

        assert_eq!(mailer.attempts(), 1);
        assert_eq!(
            mailer.sent(),
            vec![SentMail {
                to: "a@x.com".into(),
                subject: "subject".into(),
                body: "body".into(),
            }]
        );
    }

    #[tokio::test]
    async fn injected_failures_are_consumed() {
        let mailer = RecordingMailer::new();
        mailer.fail_next(1);

        assert!(mailer.send("a@x.com", "s", "b").await.is_err());
        assert!(mailer.send("a@x.com", "s", "b").await.is_ok());
        assert_eq!(mailer.attempts(), 2);
        assert_eq!(mailer.sent().len(), 1);
    }

    #[tokio::test]
    async fn failing_address_always_fails() {
        let mailer = RecordingMailer::new();
        mailer.fail_for("bad@x.com");

        let err = mailer.send("bad@x.com", "s", "b").await.unwrap_err();
        assert!(matches!(err, MailError::Rejected { ref to, .. } if to == "bad@x.com"));
        assert!(mailer.send("good@x.com", "s", "b").await.is_ok());
    }
}
