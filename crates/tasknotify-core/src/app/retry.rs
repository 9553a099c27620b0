//! Delivery policy: decides whether a failed digest gets one more try.

use std::time::Duration;

/// Delivery policy for flushed digests.
///
/// 再送は同じスナップショットに対して最大 1 回だけ。
/// バッファに戻すことはないので、再送待ちの間に届いたイベントは新しいバッファに入る。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeliveryPolicy {
    /// Best-effort: one attempt, failures are logged and dropped.
    #[default]
    SingleAttempt,

    /// Retry exactly once after `delay`.
    RetryOnce { delay: Duration },
}

impl DeliveryPolicy {
    pub fn from_settings(retry_on_failure: bool, retry_delay: Duration) -> Self {
        if retry_on_failure {
            DeliveryPolicy::RetryOnce { delay: retry_delay }
        } else {
            DeliveryPolicy::SingleAttempt
        }
    }

    /// Total number of send attempts for one digest.
    pub fn max_attempts(&self) -> u32 {
        match self {
            DeliveryPolicy::SingleAttempt => 1,
            DeliveryPolicy::RetryOnce { .. } => 2,
        }
    }

    /// Delay before the next attempt, or `None` when `attempts` already used the budget.
    ///
    /// # Arguments
    /// * `attempts` - Number of attempts already made (1-indexed).
    pub fn next_delay(&self, attempts: u32) -> Option<Duration> {
        match self {
            DeliveryPolicy::RetryOnce { delay } if attempts < self.max_attempts() => Some(*delay),
            _ => None,
        }
    }
}
