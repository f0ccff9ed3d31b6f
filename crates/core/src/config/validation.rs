//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::{AppConfig, SourceMode};
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

/// Bounds for every upstream deadline.
const MIN_TIMEOUT_MS: u64 = 100;
const MAX_TIMEOUT_MS: u64 = 120_000;

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `cache_ttl_secs` is 0
    /// - `cache_sweep_interval_secs` does not exceed `cache_ttl_secs`
    /// - `cache_max_entries` is `Some(0)`
    /// - any upstream timeout is outside 100ms..=120s
    /// - `min_query_chars` is 0
    /// - `user_agent` is empty
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::Invalid { field: "cache_ttl_secs".into(), reason: "must be greater than 0".into() });
        }

        // Every expired entry must be caught within one sweep cycle.
        if self.cache_sweep_interval_secs <= self.cache_ttl_secs {
            return Err(ConfigError::Invalid {
                field: "cache_sweep_interval_secs".into(),
                reason: format!("must exceed cache_ttl_secs ({})", self.cache_ttl_secs),
            });
        }

        if self.cache_max_entries == Some(0) {
            return Err(ConfigError::Invalid {
                field: "cache_max_entries".into(),
                reason: "must be greater than 0 when set".into(),
            });
        }

        for (field, value) in [
            ("primary_timeout_ms", self.primary_timeout_ms),
            ("secondary_timeout_ms", self.secondary_timeout_ms),
            ("fallback_timeout_ms", self.fallback_timeout_ms),
            ("single_timeout_ms", self.single_timeout_ms),
            ("kakao_timeout_ms", self.kakao_timeout_ms),
        ] {
            if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&value) {
                return Err(ConfigError::Invalid {
                    field: field.into(),
                    reason: format!("must be between {MIN_TIMEOUT_MS}ms and {MAX_TIMEOUT_MS}ms"),
                });
            }
        }

        if self.min_query_chars == 0 {
            return Err(ConfigError::Invalid { field: "min_query_chars".into(), reason: "must be at least 1".into() });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.source_mode == SourceMode::Race && self.fallback_timeout_ms < self.secondary_timeout_ms {
            tracing::warn!(
                fallback_timeout_ms = self.fallback_timeout_ms,
                secondary_timeout_ms = self.secondary_timeout_ms,
                "fallback deadline is shorter than the secondary race deadline"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_ttl_zero() {
        let config = AppConfig { cache_ttl_secs: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cache_ttl_secs"));
    }

    #[test]
    fn test_validate_sweep_must_exceed_ttl() {
        let config = AppConfig { cache_ttl_secs: 300, cache_sweep_interval_secs: 300, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cache_sweep_interval_secs"));
    }

    #[test]
    fn test_validate_max_entries_zero() {
        let config = AppConfig { cache_max_entries: Some(0), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "cache_max_entries"));
    }

    #[test]
    fn test_validate_timeout_too_small() {
        let config = AppConfig { primary_timeout_ms: 50, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "primary_timeout_ms"));
    }

    #[test]
    fn test_validate_timeout_exceeds_limit() {
        let config = AppConfig { fallback_timeout_ms: 120_001, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "fallback_timeout_ms"));
    }

    #[test]
    fn test_validate_min_query_chars_zero() {
        let config = AppConfig { min_query_chars: 0, ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "min_query_chars"));
    }

    #[test]
    fn test_validate_empty_user_agent() {
        let config = AppConfig { user_agent: String::new(), ..Default::default() };
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Invalid { field, .. }) if field == "user_agent"));
    }

    #[test]
    fn test_validate_edge_case_values() {
        let config = AppConfig {
            cache_ttl_secs: 1,
            cache_sweep_interval_secs: 2,
            primary_timeout_ms: 100,
            fallback_timeout_ms: 120_000,
            min_query_chars: 1,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
