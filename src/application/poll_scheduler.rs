use crate::application::telemetry_sync::{PollOutcome, PollTicket, TelemetrySync};
use crate::domain::{
    device::SystemInfo,
    errors::InfrastructureError,
    logging::{LogComponent, TimeProvider, get_logger},
    telemetry::{HistorySource, KeyValueStore, Timestamp},
};
use futures::{
    FutureExt, Stream, StreamExt,
    future::{AbortHandle, Abortable, Aborted, LocalBoxFuture},
    stream::FuturesUnordered,
};
use std::{cell::RefCell, rc::Rc};

type PollResponse = (PollTicket, Result<SystemInfo, InfrastructureError>);

/// Counters for one run of the poll loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollLoopStats {
    pub issued: usize,
    pub applied: usize,
    pub superseded: usize,
    pub failed: usize,
}

/// One immediate tick, then one every `period_ms`
pub fn browser_ticks(period_ms: u32) -> impl Stream<Item = ()> {
    futures::stream::once(futures::future::ready(())).chain(gloo_timers::future::IntervalStream::new(period_ms))
}

/// Poll `source` on every tick until `ticks` ends.
///
/// Each tick aborts the previous request and issues a new one starting at
/// the cursor. Only the newest response is applied; every response that
/// reaches the sync engine is handed to `observer`. The shared state is never
/// borrowed across an await point. When `ticks` ends the loop waits for the
/// outstanding request and returns.
pub async fn run_poll_loop<K, H, T, F>(
    sync: Rc<RefCell<TelemetrySync<K>>>,
    source: H,
    clock: &dyn TimeProvider,
    ticks: T,
    mut observer: F,
) -> PollLoopStats
where
    K: KeyValueStore,
    H: HistorySource + Clone + 'static,
    T: Stream<Item = ()>,
    F: FnMut(&PollOutcome),
{
    let mut stats = PollLoopStats::default();
    let mut ticks = Box::pin(ticks.fuse());
    let mut in_flight: FuturesUnordered<Abortable<LocalBoxFuture<'static, PollResponse>>> = FuturesUnordered::new();
    let mut current: Option<AbortHandle> = None;

    get_logger().info(LogComponent::Application("PollScheduler"), "🔄 Poll loop started");

    loop {
        // Responses first, so a request that already finished is applied
        // before the next tick can abort it.
        futures::select_biased! {
            done = in_flight.select_next_some() => {
                apply_response(&sync, clock, done, &mut stats, &mut observer);
            }
            tick = ticks.next() => match tick {
                Some(()) => {
                    if let Some(previous) = current.take() {
                        previous.abort();
                    }

                    let now = Timestamp::new(clock.current_timestamp());
                    let ticket = sync.borrow_mut().begin_poll(now);
                    let (handle, registration) = AbortHandle::new_pair();
                    current = Some(handle);

                    let source = source.clone();
                    let request = async move {
                        let response = source.fetch_info(ticket.start).await;
                        (ticket, response)
                    }
                    .boxed_local();
                    in_flight.push(Abortable::new(request, registration));
                    stats.issued += 1;
                }
                None => break,
            },
            complete => break,
        }
    }

    while let Some(done) = in_flight.next().await {
        apply_response(&sync, clock, done, &mut stats, &mut observer);
    }

    get_logger().info(
        LogComponent::Application("PollScheduler"),
        &format!(
            "⏹️ Poll loop stopped: {} issued, {} applied, {} superseded, {} failed",
            stats.issued, stats.applied, stats.superseded, stats.failed
        ),
    );

    stats
}

fn apply_response<K, F>(
    sync: &Rc<RefCell<TelemetrySync<K>>>,
    clock: &dyn TimeProvider,
    done: Result<PollResponse, Aborted>,
    stats: &mut PollLoopStats,
    observer: &mut F,
) where
    K: KeyValueStore,
    F: FnMut(&PollOutcome),
{
    let Ok((ticket, response)) = done else {
        stats.superseded += 1;
        return;
    };

    let now = Timestamp::new(clock.current_timestamp());
    let outcome = sync.borrow_mut().complete_poll(ticket, response, now);

    match &outcome {
        PollOutcome::Updated { .. } | PollOutcome::FragmentRejected { .. } => stats.applied += 1,
        PollOutcome::Superseded { .. } => stats.superseded += 1,
        PollOutcome::Failed { .. } => stats.failed += 1,
    }

    observer(&outcome);
}
