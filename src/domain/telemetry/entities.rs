pub use super::value_objects::Timestamp;
use crate::domain::errors::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Domain entity - one sample of the three hashrate averages, in H/s
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub timestamp: Timestamp,
    pub hashrate_10m: f64,
    pub hashrate_1h: f64,
    pub hashrate_1d: f64,
}

impl SeriesPoint {
    pub fn new(timestamp: Timestamp, hashrate_10m: f64, hashrate_1h: f64, hashrate_1d: f64) -> Self {
        Self { timestamp, hashrate_10m, hashrate_1h, hashrate_1d }
    }
}

/// Result of a single `append` call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AppendSummary {
    pub accepted: usize,
    /// Points dropped because they were not newer than the newest label
    pub rejected: usize,
}

/// Read-only copy of the buffer, one sequence per chart dataset
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartProjection {
    pub labels: Vec<u64>,
    pub hashrate_10m: Vec<f64>,
    pub hashrate_1h: Vec<f64>,
    pub hashrate_1d: Vec<f64>,
    pub len: usize,
}

/// Domain entity - windowed hashrate series.
///
/// Four parallel sequences that always share one length, with non-decreasing
/// labels. Appends only ever add strictly newer points; repeated labels can
/// only come from stored data. The cursor is the resume point for the next fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HashrateSeries {
    labels: VecDeque<Timestamp>,
    hashrate_10m: VecDeque<f64>,
    hashrate_1h: VecDeque<f64>,
    hashrate_1d: VecDeque<f64>,
    cursor: Option<Timestamp>,
}

impl HashrateSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a series from stored sequences. Fails when lengths differ or
    /// a label is older than the one before it.
    pub fn from_parts(
        labels: Vec<u64>,
        hashrate_10m: Vec<f64>,
        hashrate_1h: Vec<f64>,
        hashrate_1d: Vec<f64>,
        cursor: Option<Timestamp>,
    ) -> Result<Self, ValidationError> {
        let len = labels.len();
        if hashrate_10m.len() != len || hashrate_1h.len() != len || hashrate_1d.len() != len {
            return Err(ValidationError::FragmentLengthMismatch {
                timestamps: len,
                hashrate_10m: hashrate_10m.len(),
                hashrate_1h: hashrate_1h.len(),
                hashrate_1d: hashrate_1d.len(),
            });
        }

        if let Some(index) = labels.windows(2).position(|pair| pair[1] < pair[0]) {
            return Err(ValidationError::NonMonotonicLabels {
                index: index + 1,
                previous: labels[index],
                actual: labels[index + 1],
            });
        }

        Ok(Self {
            labels: labels.into_iter().map(Timestamp::new).collect(),
            hashrate_10m: hashrate_10m.into(),
            hashrate_1h: hashrate_1h.into(),
            hashrate_1d: hashrate_1d.into(),
            cursor,
        })
    }

    /// Append points in the given order. A point whose timestamp is not
    /// strictly greater than the current newest label is dropped.
    pub fn append<I>(&mut self, points: I) -> AppendSummary
    where
        I: IntoIterator<Item = SeriesPoint>,
    {
        let mut summary = AppendSummary::default();
        let mut last_accepted = None;

        for point in points {
            if self.newest().is_some_and(|newest| point.timestamp <= newest) {
                summary.rejected += 1;
                continue;
            }

            self.labels.push_back(point.timestamp);
            self.hashrate_10m.push_back(point.hashrate_10m);
            self.hashrate_1h.push_back(point.hashrate_1h);
            self.hashrate_1d.push_back(point.hashrate_1d);
            summary.accepted += 1;
            last_accepted = Some(point.timestamp);
        }

        if last_accepted.is_some() {
            self.cursor = last_accepted;
        }

        summary
    }

    /// Drop every point older than `cutoff`. Returns how many were removed.
    ///
    /// When points remain the cursor moves to the oldest of them.
    pub fn evict_before(&mut self, cutoff: Timestamp) -> usize {
        let removed = self.labels.partition_point(|label| *label < cutoff);

        self.labels.drain(..removed);
        self.hashrate_10m.drain(..removed);
        self.hashrate_1h.drain(..removed);
        self.hashrate_1d.drain(..removed);

        if let Some(oldest) = self.oldest() {
            self.cursor = Some(oldest);
        }

        removed
    }

    pub fn cursor(&self) -> Option<Timestamp> {
        self.cursor
    }

    /// Move the cursor forward; never moves it back.
    pub fn advance_cursor(&mut self, timestamp: Timestamp) {
        self.cursor = Some(self.cursor.map_or(timestamp, |current| current.max(timestamp)));
    }

    pub fn oldest(&self) -> Option<Timestamp> {
        self.labels.front().copied()
    }

    pub fn newest(&self) -> Option<Timestamp> {
        self.labels.back().copied()
    }

    pub fn latest_point(&self) -> Option<SeriesPoint> {
        let index = self.labels.len().checked_sub(1)?;
        self.point_at(index)
    }

    pub fn point_at(&self, index: usize) -> Option<SeriesPoint> {
        Some(SeriesPoint {
            timestamp: *self.labels.get(index)?,
            hashrate_10m: *self.hashrate_10m.get(index)?,
            hashrate_1h: *self.hashrate_1h.get(index)?,
            hashrate_1d: *self.hashrate_1d.get(index)?,
        })
    }

    pub fn points(&self) -> impl Iterator<Item = SeriesPoint> + '_ {
        (0..self.len()).filter_map(move |index| self.point_at(index))
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Forget every point and the cursor
    pub fn clear(&mut self) {
        self.labels.clear();
        self.hashrate_10m.clear();
        self.hashrate_1h.clear();
        self.hashrate_1d.clear();
        self.cursor = None;
    }

    pub fn snapshot(&self) -> ChartProjection {
        ChartProjection {
            labels: self.labels.iter().map(Timestamp::value).collect(),
            hashrate_10m: self.hashrate_10m.iter().copied().collect(),
            hashrate_1h: self.hashrate_1h.iter().copied().collect(),
            hashrate_1d: self.hashrate_1d.iter().copied().collect(),
            len: self.labels.len(),
        }
    }
}
