//! Device-side payloads: the system info snapshot and the history extent.

use crate::domain::telemetry::HistoryFragment;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, IntoEnumIterator};

/// Typed `GET /api/system/info` response.
///
/// Unknown fields are ignored and missing ones default, so older firmware
/// still parses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SystemInfo {
    pub power: f64,
    pub voltage: f64,
    pub current: f64,
    pub temp: f64,
    pub vr_temp: f64,
    pub hash_rate: f64,
    pub hash_rate_timestamp: u64,
    #[serde(rename = "hashRate_10m")]
    pub hash_rate_10m: f64,
    #[serde(rename = "hashRate_1h")]
    pub hash_rate_1h: f64,
    #[serde(rename = "hashRate_1d")]
    pub hash_rate_1d: f64,
    pub best_diff: String,
    pub best_session_diff: String,
    pub free_heap: u64,
    pub core_voltage: f64,
    pub core_voltage_actual: f64,
    pub hostname: String,
    pub ssid: String,
    pub wifi_status: String,
    pub shares_accepted: u64,
    pub shares_rejected: u64,
    pub uptime_seconds: u64,
    pub asic_count: u32,
    pub small_core_count: u32,
    #[serde(rename = "ASICModel")]
    pub asic_model: String,
    #[serde(rename = "stratumURL")]
    pub stratum_url: String,
    pub stratum_port: u16,
    #[serde(rename = "fallbackStratumURL")]
    pub fallback_stratum_url: String,
    pub fallback_stratum_port: u16,
    pub stratum_user: String,
    pub frequency: f64,
    pub version: String,
    pub board_version: String,
    #[serde(rename = "fanspeed")]
    pub fan_speed: f64,
    #[serde(rename = "fanrpm")]
    pub fan_rpm: f64,
    #[serde(rename = "boardtemp1", skip_serializing_if = "Option::is_none")]
    pub board_temp1: Option<f64>,
    #[serde(rename = "boardtemp2", skip_serializing_if = "Option::is_none")]
    pub board_temp2: Option<f64>,
    #[serde(rename = "overheat_mode")]
    pub overheat_mode: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub history: Option<HistoryFragment>,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

impl SystemInfo {
    /// Placeholder shown before the device has answered
    pub fn default_info() -> Self {
        Self {
            power: 11.670000076293945,
            voltage: 5208.75,
            current: 2237.5,
            temp: 60.0,
            vr_temp: 45.0,
            hash_rate: 2775.61417065818,
            hash_rate_timestamp: 1_724_398_272_483,
            hash_rate_10m: 475.0,
            hash_rate_1h: 475.0,
            hash_rate_1d: 475.0,
            best_diff: "0".to_string(),
            best_session_diff: "0".to_string(),
            free_heap: 200_504,
            core_voltage: 1200.0,
            core_voltage_actual: 1200.0,
            hostname: "Bitaxe".to_string(),
            ssid: "default".to_string(),
            wifi_status: "Connected!".to_string(),
            shares_accepted: 1,
            shares_rejected: 0,
            uptime_seconds: 38,
            asic_count: 1,
            small_core_count: 672,
            asic_model: "BM1366".to_string(),
            stratum_url: "public-pool.io".to_string(),
            stratum_port: 21496,
            fallback_stratum_url: String::new(),
            fallback_stratum_port: 0,
            stratum_user: "bc1q99n3pu025yyu0jlywpmwzalyhm36tg5u37w20d.bitaxe-U1".to_string(),
            frequency: 485.0,
            version: "2.0".to_string(),
            board_version: "204".to_string(),
            fan_speed: 100.0,
            fan_rpm: 0.0,
            board_temp1: Some(30.0),
            board_temp2: Some(40.0),
            overheat_mode: 0,
            history: Some(HistoryFragment::default()),
        }
    }

    /// Display units: W and degrees to 1 decimal, mV/mA to V/A with 1
    /// decimal, core voltages mV to V with 2 decimals.
    pub fn normalized(mut self) -> Self {
        self.power = round_to(self.power, 1);
        self.voltage = round_to(self.voltage / 1000.0, 1);
        self.current = round_to(self.current / 1000.0, 1);
        self.core_voltage_actual = round_to(self.core_voltage_actual / 1000.0, 2);
        self.core_voltage = round_to(self.core_voltage / 1000.0, 2);
        self.temp = round_to(self.temp, 1);
        self.vr_temp = round_to(self.vr_temp, 1);
        self
    }

    /// Nominal GH/s from clock and core count
    pub fn expected_hashrate(&self) -> u64 {
        let cores = f64::from(self.small_core_count) * f64::from(self.asic_count);
        (self.frequency * (cores / 1000.0)).floor().max(0.0) as u64
    }

    /// Payout address: the stratum user up to the first `.`
    pub fn payout_address(&self) -> &str {
        self.stratum_user.split('.').next().unwrap_or_default()
    }

    pub fn pool_provider(&self) -> Option<PoolProvider> {
        PoolProvider::iter().find(|provider| self.stratum_url.contains(provider.as_ref()))
    }

    /// Stats page of the configured pool for this miner, when the pool is known
    pub fn pool_stats_link(&self) -> Option<String> {
        self.pool_provider().map(|provider| provider.stats_url(self.payout_address()))
    }
}

/// Pools with a public per-address stats page
#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, EnumIter)]
pub enum PoolProvider {
    #[strum(serialize = "public-pool.io")]
    PublicPool,
    #[strum(serialize = "ocean.xyz")]
    Ocean,
    #[strum(serialize = "solo.d-central.tech")]
    DCentralSolo,
    #[strum(serialize = "solo.ckpool.org")]
    CkPoolSolo,
}

impl PoolProvider {
    pub fn stats_url(&self, address: &str) -> String {
        match self {
            Self::PublicPool => format!("https://web.public-pool.io/#/app/{}", address),
            Self::Ocean => format!("https://ocean.xyz/stats/{}", address),
            Self::DCentralSolo => format!("https://solo.d-central.tech/#/app/{}", address),
            Self::CkPoolSolo => format!("https://solostats.ckpool.org/stats/{}", address),
        }
    }
}

/// `GET /api/history/len`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryExtent {
    pub first_timestamp: u64,
    pub last_timestamp: u64,
    pub num_samples: u64,
}

impl HistoryExtent {
    pub fn is_empty(&self) -> bool {
        self.num_samples == 0
    }

    pub fn span_ms(&self) -> u64 {
        self.last_timestamp.saturating_sub(self.first_timestamp)
    }
}
