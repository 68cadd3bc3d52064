use super::entities::SeriesPoint;
use super::value_objects::{Timestamp, scale_raw_hashrate};
use crate::domain::errors::ValidationError;
use serde::{Deserialize, Serialize};

/// One batch of device history: offsets relative to `timestamp_base` plus
/// the three raw hashrate arrays.
///
/// Every field defaults, because the device answers with `{}` while its
/// history buffer is not ready yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryFragment {
    #[serde(rename = "timestampBase", default)]
    pub timestamp_base: u64,
    #[serde(default)]
    pub timestamps: Vec<u64>,
    #[serde(default)]
    pub hashrate_10m: Vec<f64>,
    #[serde(default)]
    pub hashrate_1h: Vec<f64>,
    #[serde(default)]
    pub hashrate_1d: Vec<f64>,
}

impl HistoryFragment {
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    /// All four arrays must be index-aligned and every hashrate must stay
    /// finite once scaled, since stored JSON has no encoding for NaN or inf.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let len = self.timestamps.len();
        if self.hashrate_10m.len() != len || self.hashrate_1h.len() != len || self.hashrate_1d.len() != len {
            return Err(ValidationError::FragmentLengthMismatch {
                timestamps: len,
                hashrate_10m: self.hashrate_10m.len(),
                hashrate_1h: self.hashrate_1h.len(),
                hashrate_1d: self.hashrate_1d.len(),
            });
        }

        if let Some(&offset) = self.timestamps.iter().find(|&&offset| self.timestamp_base.checked_add(offset).is_none()) {
            return Err(ValidationError::TimestampOverflow { base: self.timestamp_base, offset });
        }

        let samples = self.hashrate_10m.iter().zip(&self.hashrate_1h).zip(&self.hashrate_1d).enumerate();
        for (index, ((&h10m, &h1h), &h1d)) in samples {
            if let Some(raw) = [h10m, h1h, h1d].into_iter().find(|raw| !scale_raw_hashrate(*raw).is_finite()) {
                return Err(ValidationError::NonFiniteHashrate { index, raw });
            }
        }

        Ok(())
    }

    /// Newest absolute timestamp carried by the fragment
    pub fn latest_absolute(&self) -> Option<Timestamp> {
        self.timestamps
            .iter()
            .max()
            .and_then(|&offset| self.timestamp_base.checked_add(offset))
            .map(Timestamp::new)
    }

    /// Absolute, scaled points in fragment order. Call `validate` first:
    /// extra entries in longer arrays are ignored.
    pub fn to_points(&self) -> Vec<SeriesPoint> {
        self.timestamps
            .iter()
            .zip(&self.hashrate_10m)
            .zip(&self.hashrate_1h)
            .zip(&self.hashrate_1d)
            .map(|(((&offset, &h10m), &h1h), &h1d)| SeriesPoint {
                timestamp: Timestamp::new(self.timestamp_base.saturating_add(offset)),
                hashrate_10m: scale_raw_hashrate(h10m),
                hashrate_1h: scale_raw_hashrate(h1h),
                hashrate_1d: scale_raw_hashrate(h1d),
            })
            .collect()
    }
}
