use crate::application::{SyncConfig, TelemetrySync, browser_ticks, run_poll_loop};
use crate::domain::{
    logging::{LogComponent, get_logger, get_time_provider, init_logger},
    telemetry::Timestamp,
};
use crate::global_state::{begin_polling, end_polling, point_count, publish_outcome};
use crate::infrastructure::{BrowserLocalStorage, ConsoleLogger, DeviceHttpClient};
use futures::future::{AbortHandle, Abortable};
use gloo::utils::format::JsValueSerdeExt;
use js_sys::Promise;
use leptos::SignalSet;
use std::{cell::RefCell, fmt::Display, rc::Rc};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

fn to_js_error(err: impl Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn now() -> Timestamp {
    Timestamp::new(get_time_provider().current_timestamp())
}

/// Hashrate dashboard handle for JavaScript.
///
/// Owns the sync engine, polls the device while started and exposes the
/// chart projection.
#[wasm_bindgen]
pub struct HashrateDashboard {
    sync: Rc<RefCell<TelemetrySync<BrowserLocalStorage>>>,
    client: Rc<DeviceHttpClient>,
    config: SyncConfig,
    stop: Option<AbortHandle>,
    generation: u64,
}

#[wasm_bindgen]
impl HashrateDashboard {
    /// `config` is an optional object with camelCase `SyncConfig` fields.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<HashrateDashboard, JsValue> {
        let config: SyncConfig = if config.is_undefined() || config.is_null() {
            SyncConfig::default()
        } else {
            config.into_serde().map_err(to_js_error)?
        };

        init_logger(Box::new(ConsoleLogger::new(config.log_level)));

        let store = BrowserLocalStorage::new().map_err(to_js_error)?;
        let sync = TelemetrySync::hydrate(store, config.clone()).map_err(to_js_error)?;

        get_logger().info(
            LogComponent::Presentation("HashrateDashboard"),
            &format!("📊 Dashboard ready for '{}' with {} stored points", config.base_uri, sync.series().len()),
        );

        Ok(Self {
            sync: Rc::new(RefCell::new(sync)),
            client: Rc::new(DeviceHttpClient::new(config.base_uri.clone())),
            config,
            stop: None,
            generation: 0,
        })
    }

    /// Start polling: once now, then every `pollIntervalMs`. No-op while running.
    pub fn start(&mut self) {
        if self.stop.is_some() {
            return;
        }

        let (handle, registration) = AbortHandle::new_pair();
        let sync = Rc::clone(&self.sync);
        let client = Rc::clone(&self.client);
        let period = self.config.poll_interval_ms;

        let generation = begin_polling();
        spawn_local(async move {
            let observed = Rc::clone(&sync);
            let poll_loop = run_poll_loop(sync, client, get_time_provider(), browser_ticks(period), move |outcome| {
                let (count, latest) = {
                    let state = observed.borrow();
                    (state.series().len(), state.latest_point())
                };
                publish_outcome(outcome, count, latest);
            });

            if Abortable::new(poll_loop, registration).await.is_err() {
                get_logger().info(LogComponent::Presentation("HashrateDashboard"), "⏹️ Polling stopped");
            }
            end_polling(generation);
        });

        self.generation = generation;
        self.stop = Some(handle);
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.stop.take() {
            handle.abort();
            end_polling(self.generation);
        }
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.stop.is_some()
    }

    /// `{ labels, hashrate10m, hashrate1h, hashrate1d, len }`
    #[wasm_bindgen(js_name = chartData)]
    pub fn chart_data(&self) -> Result<JsValue, JsValue> {
        JsValue::from_serde(&self.sync.borrow().projection()).map_err(to_js_error)
    }

    /// Newest point or `null`
    #[wasm_bindgen(js_name = latestPoint)]
    pub fn latest_point(&self) -> Result<JsValue, JsValue> {
        JsValue::from_serde(&self.sync.borrow().latest_point()).map_err(to_js_error)
    }

    /// Last normalized system info or `null`
    #[wasm_bindgen(js_name = latestInfo)]
    pub fn latest_info(&self) -> Result<JsValue, JsValue> {
        JsValue::from_serde(&self.sync.borrow().latest_info()).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = expectedHashrate)]
    pub fn expected_hashrate(&self) -> Option<f64> {
        self.sync.borrow().latest_info().map(|info| info.expected_hashrate() as f64)
    }

    #[wasm_bindgen(js_name = poolStatsLink)]
    pub fn pool_stats_link(&self) -> Option<String> {
        self.sync.borrow().latest_info().and_then(|info| info.pool_stats_link())
    }

    pub fn cursor(&self) -> Option<f64> {
        self.sync.borrow().cursor().map(|cursor| cursor.value() as f64)
    }

    #[wasm_bindgen(js_name = nextFetchStart)]
    pub fn next_fetch_start(&self) -> f64 {
        self.sync.borrow().next_fetch_start(now()).value() as f64
    }

    /// Wipe the series, the cursor and both storage entries
    pub fn clear(&self) {
        self.sync.borrow_mut().clear();
        point_count().set(0);
    }

    /// Resolves to `{ firstTimestamp, lastTimestamp, numSamples }`
    #[wasm_bindgen(js_name = historyExtent)]
    pub fn history_extent(&self) -> Promise {
        let client = Rc::clone(&self.client);
        future_to_promise(async move {
            let extent = client.get_history_extent().await.map_err(to_js_error)?;
            JsValue::from_serde(&extent).map_err(to_js_error)
        })
    }

    /// Pull missing history through `/api/history/data` without waiting for
    /// the next poll. Resolves to the number of appended points.
    #[wasm_bindgen(js_name = backfillHistory)]
    pub fn backfill_history(&self) -> Promise {
        let sync = Rc::clone(&self.sync);
        let client = Rc::clone(&self.client);
        future_to_promise(async move {
            let start = sync.borrow().next_fetch_start(now());
            let fragment = client.get_history_data(start).await.map_err(to_js_error)?;
            let report = sync.borrow_mut().import_fragment(&fragment, now()).map_err(to_js_error)?;

            get_logger().info(
                LogComponent::Presentation("HashrateDashboard"),
                &format!("📥 Backfilled {} points from {}", report.appended, start),
            );
            Ok(JsValue::from_f64(report.appended as f64))
        })
    }
}

impl Drop for HashrateDashboard {
    fn drop(&mut self) {
        self.stop();
    }
}
