use super::entities::HashrateSeries;
use super::fragment::HistoryFragment;
use super::value_objects::{RetentionWindow, Timestamp};
use crate::domain::errors::DomainResult;
use crate::domain::logging::{LogComponent, get_logger};

/// What a single import did to the series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImportReport {
    pub appended: usize,
    pub rejected_duplicates: usize,
    pub evicted: usize,
    pub cursor: Option<Timestamp>,
    /// The fragment carried no timestamps and nothing was touched
    pub skipped: bool,
}

/// Domain service merging device history fragments into the series
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryImporter {
    retention: RetentionWindow,
}

impl HistoryImporter {
    pub fn new(retention: RetentionWindow) -> Self {
        Self { retention }
    }

    pub fn retention(&self) -> RetentionWindow {
        self.retention
    }

    /// Merge `fragment` into `series`, then trim everything that fell out of
    /// the retention window ending at `now`.
    ///
    /// A fragment with misaligned arrays is rejected whole and the series is
    /// left untouched.
    pub fn import(&self, series: &mut HashrateSeries, fragment: &HistoryFragment, now: Timestamp) -> DomainResult<ImportReport> {
        if fragment.is_empty() {
            return Ok(ImportReport { cursor: series.cursor(), skipped: true, ..ImportReport::default() });
        }

        if let Err(err) = fragment.validate() {
            get_logger().warn(LogComponent::Domain("HistoryImporter"), &format!("⚠️ Rejecting history fragment: {}", err));
            return Err(err.into());
        }

        let previous_cursor = series.cursor();
        let summary = series.append(fragment.to_points());
        if summary.rejected > 0 {
            get_logger().debug(
                LogComponent::Domain("HistoryImporter"),
                &format!("🔁 Dropped {} overlapping points (kept {})", summary.rejected, summary.accepted),
            );
        }

        let evicted = series.evict_before(self.retention.floor(now));

        // Eviction rewinds the buffer's cursor to its oldest label. The resume
        // point is whichever is newer: the cursor before this import or the
        // newest timestamp the device sent.
        if let Some(resume) = previous_cursor.max(fragment.latest_absolute()) {
            series.advance_cursor(resume);
        }

        Ok(ImportReport {
            appended: summary.accepted,
            rejected_duplicates: summary.rejected,
            evicted,
            cursor: series.cursor(),
            skipped: false,
        })
    }

    /// Start of the next request: right after the cursor, but never further
    /// back than one retention window.
    pub fn next_fetch_start(&self, cursor: Option<Timestamp>, now: Timestamp) -> Timestamp {
        next_fetch_start(cursor, now, self.retention)
    }
}

/// `max(cursor + 1, now - window)`, or `now - window` without a cursor
pub fn next_fetch_start(cursor: Option<Timestamp>, now: Timestamp, retention: RetentionWindow) -> Timestamp {
    let floor = retention.floor(now);
    cursor.map_or(floor, |cursor| cursor.next().max(floor))
}
