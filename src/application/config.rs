use crate::domain::{
    errors::ConfigurationError,
    logging::LogLevel,
    telemetry::{DEFAULT_CHART_DATA_KEY, DEFAULT_LAST_TIMESTAMP_KEY, RetentionWindow},
};
use crate::infrastructure::http::HttpUtils;
use serde::{Deserialize, Deserializer, Serialize};

/// Runtime settings of the sync engine. Every field has a default, so a
/// partial JS object is enough to build one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncConfig {
    /// Device origin prepended to every API path; empty means same origin
    #[serde(deserialize_with = "deserialize_base_uri")]
    pub base_uri: String,
    pub poll_interval_ms: u32,
    pub retention_window_ms: u64,
    pub chart_data_key: String,
    pub last_timestamp_key: String,
    pub log_level: LogLevel,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_uri: String::new(),
            poll_interval_ms: 5_000,
            retention_window_ms: RetentionWindow::ONE_HOUR.duration_ms(),
            chart_data_key: DEFAULT_CHART_DATA_KEY.to_string(),
            last_timestamp_key: DEFAULT_LAST_TIMESTAMP_KEY.to_string(),
            log_level: LogLevel::Info,
        }
    }
}

impl SyncConfig {
    pub fn with_base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = HttpUtils::normalize_base_uri(&base_uri.into());
        self
    }

    pub fn with_poll_interval_ms(mut self, poll_interval_ms: u32) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    pub fn with_retention_window_ms(mut self, retention_window_ms: u64) -> Self {
        self.retention_window_ms = retention_window_ms;
        self
    }

    pub fn with_storage_keys(mut self, chart_data_key: impl Into<String>, last_timestamp_key: impl Into<String>) -> Self {
        self.chart_data_key = chart_data_key.into();
        self.last_timestamp_key = last_timestamp_key.into();
        self
    }

    pub fn with_log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }

    pub fn retention(&self) -> RetentionWindow {
        RetentionWindow::from_millis(self.retention_window_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.poll_interval_ms == 0 {
            return Err(ConfigurationError::InvalidParameter("pollIntervalMs must be greater than zero".to_string()));
        }
        if self.retention_window_ms == 0 {
            return Err(ConfigurationError::InvalidParameter("retentionWindowMs must be greater than zero".to_string()));
        }
        if self.chart_data_key.trim().is_empty() {
            return Err(ConfigurationError::InvalidParameter("chartDataKey must not be blank".to_string()));
        }
        if self.last_timestamp_key.trim().is_empty() {
            return Err(ConfigurationError::InvalidParameter("lastTimestampKey must not be blank".to_string()));
        }
        if self.chart_data_key == self.last_timestamp_key {
            return Err(ConfigurationError::InvalidParameter("storage keys must differ".to_string()));
        }
        Ok(())
    }
}

fn deserialize_base_uri<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    String::deserialize(deserializer).map(|raw| HttpUtils::normalize_base_uri(&raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: SyncConfig = serde_json::from_str(r#"{"baseUri":"http://10.0.0.5","logLevel":"debug"}"#).unwrap();
        assert_eq!(config.base_uri, "http://10.0.0.5");
        assert_eq!(config.poll_interval_ms, 5_000);
        assert_eq!(config.retention_window_ms, 3_600_000);
        assert_eq!(config.chart_data_key, "chartData");
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn zero_interval_is_invalid() {
        let err = SyncConfig::default().with_poll_interval_ms(0).validate().unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidParameter(_)));
    }

    #[test]
    fn same_keys_are_invalid() {
        let config = SyncConfig::default().with_storage_keys("data", "data");
        assert!(config.validate().is_err());
    }

    #[test]
    fn base_uri_trailing_slash_is_trimmed() {
        assert_eq!(SyncConfig::default().with_base_uri("http://bitaxe/").base_uri, "http://bitaxe");
    }

    #[test]
    fn deserialized_base_uri_is_trimmed() {
        let config: SyncConfig = serde_json::from_str(r#"{"baseUri":"http://bitaxe.local//"}"#).unwrap();
        assert_eq!(config.base_uri, "http://bitaxe.local");
    }
}
