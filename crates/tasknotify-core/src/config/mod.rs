//! Layered configuration for the notifier, loaded with figment.
//!
//! Sources (in priority order, highest wins):
//! 1. Environment variables (`TASKNOTIFY_*` prefix)
//! 2. `tasknotify.toml` in the working directory
//! 3. Built-in defaults
//!
//! 宛先の対応表（`directory`）は TOML のテーブル、env の dict、JSON 文字列の
//! どの形でも受け取ります。形が壊れていても起動は止めず（他の設定も捨てず）、
//! 空の Directory になります。

mod error;

pub use error::ConfigError;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;

use crate::app::{DeliveryPolicy, Directory};

const CONFIG_FILE: &str = "tasknotify.toml";
const ENV_PREFIX: &str = "TASKNOTIFY_";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Debounce window D, in seconds.
    pub debounce_secs: u64,
    /// Prefix of every digest subject.
    pub subject_prefix: String,
    /// Person name to address: a table, or a JSON object encoded as a string.
    pub directory: Value,
    /// Retry a failed delivery once.
    pub retry_on_failure: bool,
    /// Delay before that retry, in seconds.
    pub retry_delay_secs: u64,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            debounce_secs: 300,
            subject_prefix: "[Tasks]".to_string(),
            directory: Value::Object(Default::default()),
            retry_on_failure: false,
            retry_delay_secs: 30,
        }
    }
}

impl NotifierConfig {
    /// Load configuration from defaults, `tasknotify.toml`, and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(Self::figment())
    }

    /// Extract and validate from an arbitrary provider chain.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can add providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if Path::new(CONFIG_FILE).exists() {
            figment = figment.merge(Toml::file(CONFIG_FILE));
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.debounce_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "debounce_secs",
                reason: "debounce window must be at least one second".to_string(),
            });
        }
        Ok(())
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_secs(self.debounce_secs)
    }

    pub fn delivery_policy(&self) -> DeliveryPolicy {
        DeliveryPolicy::from_settings(
            self.retry_on_failure,
            Duration::from_secs(self.retry_delay_secs),
        )
    }

    /// Build the recipient directory from whichever form was configured.
    ///
    /// Anything other than a table or a JSON-object string yields an empty directory.
    pub fn directory(&self) -> Directory {
        match &self.directory {
            Value::String(raw) => Directory::from_json(raw),
            Value::Object(_) => Directory::from_value(self.directory.clone()),
            other => {
                tracing::warn!(kind = value_kind(other), "recipient directory is not a table; no recipients will resolve");
                Directory::default()
            }
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_are_sensible() {
        let config = NotifierConfig::default();
        assert_eq!(config.debounce_window(), Duration::from_secs(300));
        assert_eq!(config.subject_prefix, "[Tasks]");
        assert_eq!(config.delivery_policy(), DeliveryPolicy::SingleAttempt);
        assert!(config.directory().is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn environment_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("TASKNOTIFY_DEBOUNCE_SECS", "60");
            jail.set_env("TASKNOTIFY_RETRY_ON_FAILURE", "true");

            let config = NotifierConfig::load().expect("config loads");
            assert_eq!(config.debounce_window(), Duration::from_secs(60));
            assert_eq!(
                config.delivery_policy(),
                DeliveryPolicy::RetryOnce {
                    delay: Duration::from_secs(30)
                }
            );
            Ok(())
        });
    }

    #[test]
    fn toml_file_is_layered_under_environment() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "tasknotify.toml",
                r#"
                debounce_secs = 120
                subject_prefix = "[Board]"
                directory = '{"Alice": "alice@x.com"}'
                "#,
            )?;
            jail.set_env("TASKNOTIFY_DEBOUNCE_SECS", "90");

            let config = NotifierConfig::load().expect("config loads");
            assert_eq!(config.debounce_secs, 90);
            assert_eq!(config.subject_prefix, "[Board]");
            assert_eq!(config.directory().resolve("alice"), Some("alice@x.com"));
            Ok(())
        });
    }

    #[test]
    fn zero_window_is_rejected() {
        let figment = Figment::from(Serialized::defaults(NotifierConfig {
            debounce_secs: 0,
            ..NotifierConfig::default()
        }));
        let err = NotifierConfig::from_figment(figment).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "debounce_secs", .. }));
    }

    #[test]
    fn malformed_directory_degrades_to_empty() {
        let config = NotifierConfig {
            directory: Value::String("Alice=alice@x.com".to_string()),
            ..NotifierConfig::default()
        };
        assert!(config.directory().is_empty());
    }

    #[test]
    fn toml_table_directory_loads() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "tasknotify.toml",
                r#"
                debounce_secs = 60

                [directory]
                Alice = "alice@x.com"
                "#,
            )?;

            let config = NotifierConfig::load().expect("config loads");
            assert_eq!(config.debounce_secs, 60);
            assert_eq!(config.directory().resolve("alice"), Some("alice@x.com"));
            Ok(())
        });
    }

    #[test]
    fn environment_dict_directory_loads() {
        Jail::expect_with(|jail| {
            jail.set_env("TASKNOTIFY_DIRECTORY", r#"{Alice="alice@x.com"}"#);
            jail.set_env("TASKNOTIFY_DEBOUNCE_SECS", "60");

            let config = NotifierConfig::load().expect("config loads");
            assert_eq!(config.debounce_secs, 60);
            assert_eq!(config.directory().resolve("Alice"), Some("alice@x.com"));
            Ok(())
        });
    }

    #[test]
    fn non_table_directory_keeps_other_settings() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "tasknotify.toml",
                r#"
                debounce_secs = 45
                subject_prefix = "[Board]"
                directory = 5
                "#,
            )?;

            let config = NotifierConfig::load().expect("config loads");
            assert_eq!(config.debounce_secs, 45);
            assert_eq!(config.subject_prefix, "[Board]");
            assert!(config.directory().is_empty());
            Ok(())
        });
    }
}
