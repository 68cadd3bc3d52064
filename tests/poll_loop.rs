use futures::executor::block_on;
use futures::stream;
use hashrate_chart_wasm::application::{PollLoopStats, PollOutcome, SyncConfig, TelemetrySync, run_poll_loop};
use hashrate_chart_wasm::domain::device::SystemInfo;
use hashrate_chart_wasm::domain::errors::{InfrastructureError, NetworkError};
use hashrate_chart_wasm::domain::logging::{ManualTimeProvider, TimeProvider};
use hashrate_chart_wasm::domain::telemetry::{HistoryFragment, HistorySource, Timestamp};
use hashrate_chart_wasm::infrastructure::MemoryStore;
use std::{cell::RefCell, collections::VecDeque, rc::Rc};

/// `None` entries never resolve, like a request that hangs until aborted.
#[derive(Default)]
struct ScriptedDevice {
    responses: RefCell<VecDeque<Option<Result<SystemInfo, InfrastructureError>>>>,
    starts: RefCell<Vec<Timestamp>>,
}

impl ScriptedDevice {
    fn new(responses: Vec<Option<Result<SystemInfo, InfrastructureError>>>) -> Rc<Self> {
        Rc::new(Self { responses: RefCell::new(responses.into()), starts: RefCell::default() })
    }
}

impl HistorySource for ScriptedDevice {
    async fn fetch_info(&self, start: Timestamp) -> Result<SystemInfo, InfrastructureError> {
        self.starts.borrow_mut().push(start);
        let next = self.responses.borrow_mut().pop_front().flatten();
        match next {
            Some(response) => response,
            None => futures::future::pending().await,
        }
    }
}

fn info_with(history: HistoryFragment) -> SystemInfo {
    SystemInfo { history: Some(history), ..SystemInfo::default_info() }
}

fn fragment(base: u64, offsets: Vec<u64>) -> HistoryFragment {
    let len = offsets.len();
    HistoryFragment {
        timestamp_base: base,
        timestamps: offsets,
        hashrate_10m: vec![1.0; len],
        hashrate_1h: vec![1.0; len],
        hashrate_1d: vec![1.0; len],
    }
}

fn new_sync() -> Rc<RefCell<TelemetrySync<MemoryStore>>> {
    Rc::new(RefCell::new(TelemetrySync::hydrate(MemoryStore::new(), SyncConfig::default()).unwrap()))
}

fn ticks(count: usize) -> impl futures::Stream<Item = ()> {
    stream::iter(std::iter::repeat_n((), count))
}

#[test]
fn second_poll_resumes_after_cursor() {
    let sync = new_sync();
    let device = ScriptedDevice::new(vec![
        Some(Ok(info_with(fragment(1000, vec![0, 5, 10])))),
        Some(Ok(info_with(HistoryFragment::default()))),
    ]);
    let clock = ManualTimeProvider::new(1010 + 3_000_000);
    let mut outcomes = Vec::new();

    let stats = block_on(run_poll_loop(sync.clone(), device.clone(), &clock, ticks(2), |outcome| {
        outcomes.push(outcome.clone())
    }));

    assert_eq!(stats, PollLoopStats { issued: 2, applied: 2, superseded: 0, failed: 0 });
    assert_eq!(*device.starts.borrow(), vec![Timestamp::new(0), Timestamp::new(1011)]);
    assert_eq!(sync.borrow().projection().labels, vec![1000, 1005, 1010]);
    assert!(matches!(&outcomes[1], PollOutcome::Updated { report: Some(report), .. } if report.skipped));
}

#[test]
fn info_is_forwarded_normalized() {
    let sync = new_sync();
    let device = ScriptedDevice::new(vec![Some(Ok(SystemInfo::default_info()))]);
    let clock = ManualTimeProvider::new(5_000_000);
    let mut forwarded = None;

    block_on(run_poll_loop(sync.clone(), device, &clock, ticks(1), |outcome| {
        forwarded = outcome.info().cloned();
    }));

    let info = forwarded.unwrap();
    assert_eq!(info.voltage, 5.2);
    assert_eq!(info.current, 2.2);
    assert!(info.history.is_none());
    assert_eq!(sync.borrow().latest_info(), Some(&info));
}

#[test]
fn newer_tick_supersedes_hanging_request() {
    let sync = new_sync();
    let device = ScriptedDevice::new(vec![None, Some(Ok(info_with(fragment(4_000_000, vec![0, 10]))))]);
    let clock = ManualTimeProvider::new(4_000_010);
    let mut applied = 0;

    let stats = block_on(run_poll_loop(sync.clone(), device.clone(), &clock, ticks(2), |outcome| {
        if matches!(outcome, PollOutcome::Updated { .. }) {
            applied += 1;
        }
    }));

    assert_eq!(stats.issued, 2);
    assert_eq!(stats.superseded, 1);
    assert_eq!(applied, 1);
    assert_eq!(sync.borrow().cursor(), Some(Timestamp::new(4_000_010)));
}

#[test]
fn transport_failure_is_reported_and_retried_next_tick() {
    let sync = new_sync();
    let failure = InfrastructureError::Network(NetworkError::HttpRequestFailed("connection refused".into()));
    let device = ScriptedDevice::new(vec![Some(Err(failure.clone())), Some(Ok(info_with(fragment(10, vec![0]))))]);
    let clock = ManualTimeProvider::new(100);
    let mut errors = Vec::new();

    let stats = block_on(run_poll_loop(sync.clone(), device.clone(), &clock, ticks(2), |outcome| {
        if let PollOutcome::Failed { error } = outcome {
            errors.push(error.clone());
        }
    }));

    assert_eq!(errors, vec![failure]);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.applied, 1);
    assert_eq!(*device.starts.borrow(), vec![Timestamp::new(0), Timestamp::new(0)]);
    assert_eq!(sync.borrow().cursor(), Some(Timestamp::new(10)));
}

#[test]
fn malformed_fragment_still_forwards_info() {
    let sync = new_sync();
    let mut bad = fragment(1000, vec![0, 5]);
    bad.hashrate_1d.clear();
    let device = ScriptedDevice::new(vec![Some(Ok(info_with(bad)))]);
    let clock = ManualTimeProvider::new(2000);
    let mut outcome = None;

    block_on(run_poll_loop(sync.clone(), device, &clock, ticks(1), |o| outcome = Some(o.clone())));

    match outcome {
        Some(PollOutcome::FragmentRejected { info, .. }) => assert_eq!(info.hostname, "Bitaxe"),
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(sync.borrow().series().is_empty());
}

#[test]
fn observer_can_read_state_without_conflict() {
    let sync = new_sync();
    let device = ScriptedDevice::new(vec![Some(Ok(info_with(fragment(1000, vec![0, 5]))))]);
    let clock = ManualTimeProvider::new(2000);
    let observed = sync.clone();
    let mut seen = 0;

    block_on(run_poll_loop(sync, device, &clock, ticks(1), |_| {
        seen = observed.borrow().series().len();
        clock.advance(5_000);
    }));

    assert_eq!(seen, 2);
    assert_eq!(clock.current_timestamp(), 7_000);
}

#[test]
fn stale_ticket_is_ignored() {
    let mut sync = TelemetrySync::hydrate(MemoryStore::new(), SyncConfig::default()).unwrap();
    let first = sync.begin_poll(Timestamp::new(1_000));
    let second = sync.begin_poll(Timestamp::new(2_000));
    assert!(second.id > first.id);

    let outcome = sync.complete_poll(first, Ok(info_with(fragment(0, vec![0]))), Timestamp::new(2_000));

    assert_eq!(outcome, PollOutcome::Superseded { request_id: first.id });
    assert!(sync.series().is_empty());
    assert!(sync.latest_info().is_none());
}
