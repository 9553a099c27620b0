//! NotifierBuilder - 通知サブシステムの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターンの実装
//! - 起動時検証（Fail-fast 設計）
//! - グローバル変数を使わず、Aggregator をサービスの寿命に合わせて所有させる

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;

use super::aggregator::{DEFAULT_DEBOUNCE, DebounceAggregator};
use super::digest::DigestFormatter;
use super::directory::Directory;
use super::notifier::ChangeNotifier;
use super::retry::DeliveryPolicy;
use super::status::Counters;
use crate::config::NotifierConfig;
use crate::ports::{Clock, Mailer, SystemClock};

const DEFAULT_SUBJECT_PREFIX: &str = "[Tasks]";

/// NotifierBuilder は ChangeNotifier を構築
///
/// # 使用例
/// ```ignore
/// let notifier = NotifierBuilder::from_config(&config)
///     .mailer(Arc::new(LogMailer))
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - Mailer が未設定なら BuildError::MissingMailer
/// - debounce 幅が 0 なら BuildError::ZeroWindow
/// - Tokio runtime の外で build() すると BuildError::NoRuntime
pub struct NotifierBuilder {
    directory: Directory,
    mailer: Option<Arc<dyn Mailer>>,
    clock: Arc<dyn Clock>,
    window: Duration,
    policy: DeliveryPolicy,
    subject_prefix: String,
}

/// BuildError は構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("no mailer configured; call .mailer(..) before build()")]
    MissingMailer,

    #[error("debounce window must be greater than zero")]
    ZeroWindow,

    #[error("build() must be called from within a Tokio runtime")]
    NoRuntime,
}

impl NotifierBuilder {
    pub fn new() -> Self {
        Self {
            directory: Directory::default(),
            mailer: None,
            clock: Arc::new(SystemClock),
            window: DEFAULT_DEBOUNCE,
            policy: DeliveryPolicy::default(),
            subject_prefix: DEFAULT_SUBJECT_PREFIX.to_string(),
        }
    }

    /// 設定値から directory, 幅, 件名, 配信ポリシーを取り込む
    pub fn from_config(config: &NotifierConfig) -> Self {
        Self::new()
            .directory(config.directory())
            .debounce_window(config.debounce_window())
            .delivery_policy(config.delivery_policy())
            .subject_prefix(config.subject_prefix.clone())
    }

    pub fn directory(mut self, directory: Directory) -> Self {
        self.directory = directory;
        self
    }

    pub fn mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn debounce_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn delivery_policy(mut self, policy: DeliveryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn subject_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.subject_prefix = prefix.into();
        self
    }

    pub fn build(self) -> Result<ChangeNotifier, BuildError> {
        let mailer = self.mailer.ok_or(BuildError::MissingMailer)?;
        if self.window.is_zero() {
            return Err(BuildError::ZeroWindow);
        }
        let runtime = Handle::try_current().map_err(|_| BuildError::NoRuntime)?;

        let counters = Arc::new(Counters::default());
        let formatter = DigestFormatter::new(self.subject_prefix, self.clock);
        let aggregator = DebounceAggregator::with_counters(
            formatter,
            mailer,
            self.window,
            self.policy,
            runtime,
            Arc::clone(&counters),
        );
        tracing::debug!(
            recipients = self.directory.len(),
            window_secs = self.window.as_secs_f64(),
            policy = ?self.policy,
            "built change notifier"
        );
        Ok(ChangeNotifier::new(Arc::new(self.directory), aggregator, counters))
    }
}

impl Default for NotifierBuilder {
    fn default() -> Self {
        Self::new()
    }
}
