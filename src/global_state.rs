use crate::application::PollOutcome;
use crate::domain::{device::SystemInfo, telemetry::SeriesPoint};
use leptos::*;
use once_cell::sync::OnceCell;
use std::sync::atomic::{AtomicU64, Ordering};

/// Reactive dashboard status, fed by the poll observer
pub struct Globals {
    pub point_count: RwSignal<usize>,
    pub latest_hashrate_10m: RwSignal<f64>,
    pub is_polling: RwSignal<bool>,
    pub last_error: RwSignal<Option<String>>,
    pub device_info: RwSignal<Option<SystemInfo>>,
    pub expected_hashrate: RwSignal<u64>,
    pub pool_stats_link: RwSignal<Option<String>>,
}

static GLOBALS: OnceCell<Globals> = OnceCell::new();
static POLL_GENERATION: AtomicU64 = AtomicU64::new(0);

pub fn globals() -> &'static Globals {
    GLOBALS.get_or_init(|| Globals {
        point_count: create_rw_signal(0),
        latest_hashrate_10m: create_rw_signal(0.0),
        is_polling: create_rw_signal(false),
        last_error: create_rw_signal(None),
        device_info: create_rw_signal(None),
        expected_hashrate: create_rw_signal(0),
        pool_stats_link: create_rw_signal(None),
    })
}

crate::global_signals! {
    pub point_count => point_count: usize,
    pub latest_hashrate_10m => latest_hashrate_10m: f64,
    pub is_polling => is_polling: bool,
    pub last_error => last_error: Option<String>,
    pub device_info => device_info: Option<SystemInfo>,
    pub expected_hashrate => expected_hashrate: u64,
    pub pool_stats_link => pool_stats_link: Option<String>,
}

/// Mark a new poll run as active and return its generation
pub fn begin_polling() -> u64 {
    let generation = POLL_GENERATION.fetch_add(1, Ordering::SeqCst) + 1;
    is_polling().set(true);
    generation
}

/// Clear `is_polling` unless a newer run started after `generation`
pub fn end_polling(generation: u64) {
    if POLL_GENERATION.load(Ordering::SeqCst) == generation {
        is_polling().set(false);
    }
}

/// Push one poll result into the status signals
pub fn publish_outcome(outcome: &PollOutcome, point_count_now: usize, latest: Option<SeriesPoint>) {
    match outcome {
        PollOutcome::Updated { info, .. } => {
            last_error().set(None);
            publish_info(info);
        }
        PollOutcome::FragmentRejected { info, error } => {
            last_error().set(Some(error.to_string()));
            publish_info(info);
        }
        PollOutcome::Failed { error } => last_error().set(Some(error.to_string())),
        PollOutcome::Superseded { .. } => {}
    }

    point_count().set(point_count_now);
    if let Some(point) = latest {
        latest_hashrate_10m().set(point.hashrate_10m);
    }
}

fn publish_info(info: &SystemInfo) {
    expected_hashrate().set(info.expected_hashrate());
    pool_stats_link().set(info.pool_stats_link());
    device_info().set(Some(info.clone()));
}
