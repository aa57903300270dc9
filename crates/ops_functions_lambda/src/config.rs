//! Environment-driven configuration, loaded once per process before the
//! runtime loop starts. Required values have no defaults.

use std::fmt;

use ops_functions_core::log_subscription::{AlertMatcher, DEFAULT_LEVEL_PATTERN};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be configured")]
    Missing(&'static str),
    #[error("LEVEL_REGEX is not a valid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

fn required(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<String, ConfigError> {
    lookup(name)
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupConfig {
    pub backup_bucket: String,
    pub topic_arn: String,
}

impl BackupConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            backup_bucket: required(&lookup, "BACKUP_BUCKET")?,
            topic_arn: required(&lookup, "TOPIC_ARN")?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct LogAlertConfig {
    pub table_name: String,
    pub topic_arn: String,
    pub matcher: AlertMatcher,
}

impl LogAlertConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let pattern = lookup("LEVEL_REGEX")
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LEVEL_PATTERN.to_string());

        Ok(Self {
            table_name: required(&lookup, "TABLE_NAME")?,
            topic_arn: required(&lookup, "TOPIC_ARN")?,
            matcher: AlertMatcher::new(&pattern)?,
        })
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct FeedDigestConfig {
    pub feed_url: String,
    pub api_key: String,
    pub table_name: String,
    pub topic_arn: String,
}

impl FeedDigestConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Ok(Self {
            feed_url: required(&lookup, "RSS_FEED_URL")?,
            api_key: required(&lookup, "OPENROUTER_API_KEY")?,
            table_name: required(&lookup, "DYNAMODB_TABLE_NAME")?,
            topic_arn: required(&lookup, "SNS_TOPIC_ARN")?,
        })
    }
}

impl fmt::Debug for FeedDigestConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedDigestConfig")
            .field("feed_url", &self.feed_url)
            .field("api_key", &"<redacted>")
            .field("table_name", &self.table_name)
            .field("topic_arn", &self.topic_arn)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        move |name: &str| values.get(name).cloned()
    }

    #[test]
    fn backup_config_reads_both_required_values() {
        let config = BackupConfig::from_lookup(lookup_from(&[
            ("BACKUP_BUCKET", "backups"),
            ("TOPIC_ARN", "arn:aws:sns:eu-west-2:123:backups"),
        ]))
        .expect("config should load");

        assert_eq!(config.backup_bucket, "backups");
        assert_eq!(config.topic_arn, "arn:aws:sns:eu-west-2:123:backups");
    }

    #[test]
    fn backup_config_names_missing_variable() {
        let error = BackupConfig::from_lookup(lookup_from(&[("BACKUP_BUCKET", "backups")]))
            .expect_err("missing topic should fail");
        assert_eq!(error.to_string(), "TOPIC_ARN must be configured");
    }

    #[test]
    fn blank_values_count_as_missing() {
        let error = BackupConfig::from_lookup(lookup_from(&[
            ("BACKUP_BUCKET", "  "),
            ("TOPIC_ARN", "arn"),
        ]))
        .expect_err("blank bucket should fail");
        assert!(matches!(error, ConfigError::Missing("BACKUP_BUCKET")));
    }

    #[test]
    fn log_alert_config_defaults_level_pattern() {
        let config = LogAlertConfig::from_lookup(lookup_from(&[
            ("TABLE_NAME", "alerts"),
            ("TOPIC_ARN", "arn"),
        ]))
        .expect("config should load");

        assert!(config.matcher.is_match("Traceback (most recent call last)"));
        assert!(!config.matcher.is_match("all good"));
    }

    #[test]
    fn log_alert_config_rejects_invalid_pattern() {
        let error = LogAlertConfig::from_lookup(lookup_from(&[
            ("TABLE_NAME", "alerts"),
            ("TOPIC_ARN", "arn"),
            ("LEVEL_REGEX", "(unclosed"),
        ]))
        .expect_err("invalid pattern should fail");
        assert!(matches!(error, ConfigError::InvalidPattern(_)));
    }

    #[test]
    fn feed_digest_debug_redacts_api_key() {
        let config = FeedDigestConfig::from_lookup(lookup_from(&[
            ("RSS_FEED_URL", "https://example.substack.com/feed"),
            ("OPENROUTER_API_KEY", "sk-secret"),
            ("DYNAMODB_TABLE_NAME", "digests"),
            ("SNS_TOPIC_ARN", "arn"),
        ]))
        .expect("config should load");

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn feed_digest_requires_api_key() {
        let error = FeedDigestConfig::from_lookup(lookup_from(&[
            ("RSS_FEED_URL", "https://example.substack.com/feed"),
            ("DYNAMODB_TABLE_NAME", "digests"),
            ("SNS_TOPIC_ARN", "arn"),
        ]))
        .expect_err("missing api key should fail");
        assert!(matches!(error, ConfigError::Missing("OPENROUTER_API_KEY")));
    }
}
