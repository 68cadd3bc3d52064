use crate::application::config::SyncConfig;
use crate::domain::{
    device::SystemInfo,
    errors::{ConfigurationError, DomainError, DomainResult, InfrastructureError},
    logging::{LogComponent, get_logger},
    telemetry::{
        ChartProjection, HashrateSeries, HistoryFragment, HistoryImporter, ImportReport, KeyValueStore, SeriesPoint,
        SeriesStore, Timestamp,
    },
};

/// Identifies one issued request. Only the most recent ticket is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTicket {
    pub id: u64,
    pub start: Timestamp,
    pub issued_at: Timestamp,
}

/// What happened to one poll response
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Info forwarded; `report` is set when the response carried history
    Updated { info: SystemInfo, report: Option<ImportReport> },
    /// Info forwarded, but the history fragment was malformed and dropped
    FragmentRejected { info: SystemInfo, error: DomainError },
    /// A newer request was issued before this one finished
    Superseded { request_id: u64 },
    Failed { error: InfrastructureError },
}

impl PollOutcome {
    pub fn info(&self) -> Option<&SystemInfo> {
        match self {
            PollOutcome::Updated { info, .. } | PollOutcome::FragmentRejected { info, .. } => Some(info),
            PollOutcome::Superseded { .. } | PollOutcome::Failed { .. } => None,
        }
    }
}

/// Application service owning the series, its store and the request counter.
///
/// Lifecycle: `hydrate` once, mutate on every merge, persist after each merge.
#[derive(Debug)]
pub struct TelemetrySync<S: KeyValueStore> {
    series: HashrateSeries,
    store: SeriesStore<S>,
    importer: HistoryImporter,
    config: SyncConfig,
    next_request_id: u64,
    latest_request: Option<u64>,
    latest_info: Option<SystemInfo>,
}

impl<S: KeyValueStore> TelemetrySync<S> {
    /// Restore state from `store`. Unreadable entries start an empty series.
    pub fn hydrate(store: S, config: SyncConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;

        let store = SeriesStore::with_keys(store, config.chart_data_key.clone(), config.last_timestamp_key.clone());
        let series = store.load();

        get_logger().info(
            LogComponent::Application("TelemetrySync"),
            &format!("🚀 Hydrated {} points, cursor {:?}", series.len(), series.cursor().map(|c| c.value())),
        );

        Ok(Self {
            series,
            store,
            importer: HistoryImporter::new(config.retention()),
            config,
            next_request_id: 0,
            latest_request: None,
            latest_info: None,
        })
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn series(&self) -> &HashrateSeries {
        &self.series
    }

    pub fn store(&self) -> &S {
        self.store.store()
    }

    pub fn cursor(&self) -> Option<Timestamp> {
        self.series.cursor()
    }

    pub fn next_fetch_start(&self, now: Timestamp) -> Timestamp {
        self.importer.next_fetch_start(self.series.cursor(), now)
    }

    /// Issue a new request id; any earlier outstanding ticket becomes stale.
    pub fn begin_poll(&mut self, now: Timestamp) -> PollTicket {
        self.next_request_id += 1;
        self.latest_request = Some(self.next_request_id);

        let ticket = PollTicket { id: self.next_request_id, start: self.next_fetch_start(now), issued_at: now };
        crate::log_debug!(LogComponent::Application("TelemetrySync"), "📡 Poll #{} from {}", ticket.id, ticket.start);
        ticket
    }

    pub fn is_current(&self, ticket: &PollTicket) -> bool {
        self.latest_request == Some(ticket.id)
    }

    /// Apply the response for `ticket`. Stale tickets are ignored.
    pub fn complete_poll(
        &mut self,
        ticket: PollTicket,
        response: Result<SystemInfo, InfrastructureError>,
        now: Timestamp,
    ) -> PollOutcome {
        if !self.is_current(&ticket) {
            crate::log_debug!(LogComponent::Application("TelemetrySync"), "⏭️ Ignoring response of superseded poll #{}", ticket.id);
            return PollOutcome::Superseded { request_id: ticket.id };
        }
        self.latest_request = None;

        let mut info = match response {
            Ok(info) => info,
            Err(error) => {
                get_logger().warn(
                    LogComponent::Application("TelemetrySync"),
                    &format!("❌ Poll #{} failed: {}", ticket.id, error),
                );
                return PollOutcome::Failed { error };
            }
        };

        let history = info.history.take();
        let info = info.normalized();
        self.latest_info = Some(info.clone());

        match history.map(|fragment| self.import_fragment(&fragment, now)).transpose() {
            Ok(report) => PollOutcome::Updated { info, report },
            Err(error) => PollOutcome::FragmentRejected { info, error },
        }
    }

    /// Merge one fragment and persist the result
    pub fn import_fragment(&mut self, fragment: &HistoryFragment, now: Timestamp) -> DomainResult<ImportReport> {
        let report = self.importer.import(&mut self.series, fragment, now)?;
        if report.skipped {
            return Ok(report);
        }

        get_logger().debug(
            LogComponent::Application("TelemetrySync"),
            &format!(
                "📊 Imported {} points, evicted {}, cursor {:?}",
                report.appended,
                report.evicted,
                report.cursor.map(|c| c.value())
            ),
        );

        self.persist();
        Ok(report)
    }

    fn persist(&mut self) {
        if let Err(err) = self.store.save(&self.series) {
            get_logger().error(LogComponent::Application("TelemetrySync"), &format!("💾 Failed to persist series: {}", err));
        }
    }

    pub fn projection(&self) -> ChartProjection {
        self.series.snapshot()
    }

    pub fn latest_point(&self) -> Option<SeriesPoint> {
        self.series.latest_point()
    }

    pub fn latest_info(&self) -> Option<&SystemInfo> {
        self.latest_info.as_ref()
    }

    /// Drop every point, the cursor and both stored entries
    pub fn clear(&mut self) {
        self.series.clear();
        self.store.clear();
        get_logger().info(LogComponent::Application("TelemetrySync"), "🧹 Cleared series and storage");
    }
}
