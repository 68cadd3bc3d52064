use super::entities::HashrateSeries;
use super::repositories::KeyValueStore;
use super::value_objects::Timestamp;
use crate::domain::errors::{InfrastructureResult, StorageError};
use crate::domain::logging::{LogComponent, get_logger};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CHART_DATA_KEY: &str = "chartData";
pub const DEFAULT_LAST_TIMESTAMP_KEY: &str = "lastTimestamp";

/// Stored layout of the `chartData` entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredChartData {
    #[serde(default)]
    pub labels: Vec<u64>,
    #[serde(rename = "dataData10m", default)]
    pub data_10m: Vec<f64>,
    #[serde(rename = "dataData1h", default)]
    pub data_1h: Vec<f64>,
    #[serde(rename = "dataData1d", default)]
    pub data_1d: Vec<f64>,
}

impl From<&HashrateSeries> for StoredChartData {
    fn from(series: &HashrateSeries) -> Self {
        let snapshot = series.snapshot();
        Self {
            labels: snapshot.labels,
            data_10m: snapshot.hashrate_10m,
            data_1h: snapshot.hashrate_1h,
            data_1d: snapshot.hashrate_1d,
        }
    }
}

/// Reads and writes a series plus its cursor under two string keys
#[derive(Debug, Clone)]
pub struct SeriesStore<S: KeyValueStore> {
    store: S,
    chart_data_key: String,
    last_timestamp_key: String,
}

impl<S: KeyValueStore> SeriesStore<S> {
    pub fn new(store: S) -> Self {
        Self::with_keys(store, DEFAULT_CHART_DATA_KEY, DEFAULT_LAST_TIMESTAMP_KEY)
    }

    pub fn with_keys(store: S, chart_data_key: impl Into<String>, last_timestamp_key: impl Into<String>) -> Self {
        Self { store, chart_data_key: chart_data_key.into(), last_timestamp_key: last_timestamp_key.into() }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Restore the series. Missing or unreadable entries yield an empty
    /// series and/or no cursor; this never fails.
    pub fn load(&self) -> HashrateSeries {
        let cursor = self.load_cursor();

        let Some(raw) = self.store.get_item(&self.chart_data_key) else {
            return empty_with_cursor(cursor);
        };

        let stored = match serde_json::from_str::<StoredChartData>(&raw) {
            Ok(stored) => stored,
            Err(err) => {
                get_logger().warn(
                    LogComponent::Domain("SeriesStore"),
                    &format!("⚠️ Ignoring unreadable '{}': {}", self.chart_data_key, err),
                );
                StoredChartData::default()
            }
        };

        match HashrateSeries::from_parts(stored.labels, stored.data_10m, stored.data_1h, stored.data_1d, cursor) {
            Ok(series) => {
                get_logger().info(
                    LogComponent::Domain("SeriesStore"),
                    &format!("💾 Restored {} points, cursor {:?}", series.len(), cursor.map(|c| c.value())),
                );
                series
            }
            Err(err) => {
                get_logger().warn(
                    LogComponent::Domain("SeriesStore"),
                    &format!("⚠️ Discarding malformed '{}': {}", self.chart_data_key, err),
                );
                empty_with_cursor(cursor)
            }
        }
    }

    fn load_cursor(&self) -> Option<Timestamp> {
        let raw = self.store.get_item(&self.last_timestamp_key)?;
        let parsed = parse_cursor(&raw);
        if parsed.is_none() {
            get_logger().warn(
                LogComponent::Domain("SeriesStore"),
                &format!("⚠️ Ignoring unreadable '{}': {:?}", self.last_timestamp_key, raw),
            );
        }
        parsed
    }

    /// Write both entries. The cursor entry is removed when there is no cursor.
    pub fn save(&mut self, series: &HashrateSeries) -> InfrastructureResult<()> {
        let payload = serde_json::to_string(&StoredChartData::from(series))
            .map_err(|e| StorageError::SerializationFailed(e.to_string()))?;
        self.store.set_item(&self.chart_data_key, &payload)?;

        match series.cursor() {
            Some(cursor) => self.store.set_item(&self.last_timestamp_key, &cursor.value().to_string())?,
            None => self.store.remove_item(&self.last_timestamp_key),
        }

        Ok(())
    }

    pub fn clear(&mut self) {
        self.store.remove_item(&self.chart_data_key);
        self.store.remove_item(&self.last_timestamp_key);
    }
}

fn empty_with_cursor(cursor: Option<Timestamp>) -> HashrateSeries {
    let mut series = HashrateSeries::new();
    if let Some(cursor) = cursor {
        series.advance_cursor(cursor);
    }
    series
}

/// Decimal integer, or a float that is truncated like `parseInt` would
fn parse_cursor(raw: &str) -> Option<Timestamp> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<u64>() {
        return Some(Timestamp::new(value));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite() && *value >= 0.0)
        .map(|value| Timestamp::new(value.trunc() as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_parsing() {
        assert_eq!(parse_cursor("1010"), Some(Timestamp::new(1010)));
        assert_eq!(parse_cursor(" 1010.9 "), Some(Timestamp::new(1010)));
        assert_eq!(parse_cursor("-5"), None);
        assert_eq!(parse_cursor("soon"), None);
    }

    #[test]
    fn stored_layout_defaults_missing_arrays() {
        let stored: StoredChartData = serde_json::from_str(r#"{"labels":[]}"#).unwrap();
        assert_eq!(stored, StoredChartData::default());
    }
}
