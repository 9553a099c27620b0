//! ConfigError - 設定読み込みの失敗

use thiserror::Error;

/// 起動を止める設定エラー
///
/// 宛先の対応表の形崩れはここに含まれない（空の Directory に縮退する）。
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load notifier settings: {0}")]
    Load(#[from] figment::Error),

    #[error("notifier setting `{field}` rejected: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
