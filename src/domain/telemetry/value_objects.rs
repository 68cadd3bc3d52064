use derive_more::{Constructor, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display as StrumDisplay, EnumIter};

/// Value Object - milliseconds since the Unix epoch
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, From, Into, Deref, Constructor, Display, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn from_millis(value: u64) -> Self {
        Self(value)
    }

    /// `self - delta`, clamped at the epoch
    pub fn saturating_sub(self, delta_ms: u64) -> Self {
        Self(self.0.saturating_sub(delta_ms))
    }

    /// The next representable millisecond after `self`
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

/// How far back the buffer keeps points and how far back a fetch may reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RetentionWindow(u64);

impl RetentionWindow {
    pub const ONE_HOUR: RetentionWindow = RetentionWindow(3_600 * 1_000);

    pub fn from_millis(duration_ms: u64) -> Self {
        Self(duration_ms)
    }

    pub fn duration_ms(&self) -> u64 {
        self.0
    }

    /// Oldest timestamp still inside the window ending at `now`
    pub fn floor(&self, now: Timestamp) -> Timestamp {
        now.saturating_sub(self.0)
    }
}

impl Default for RetentionWindow {
    fn default() -> Self {
        Self::ONE_HOUR
    }
}

/// The three smoothing intervals the device reports hashrate for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, StrumDisplay, EnumIter, AsRefStr, Serialize, Deserialize)]
pub enum HashrateWindow {
    #[strum(serialize = "10m")]
    #[serde(rename = "10m")]
    TenMinutes,

    #[strum(serialize = "1h")]
    #[serde(rename = "1h")]
    OneHour,

    #[strum(serialize = "1d")]
    #[serde(rename = "1d")]
    OneDay,
}

impl HashrateWindow {
    /// Legend label used by the chart
    pub fn label(&self) -> String {
        format!("Hashrate {}", self.as_ref())
    }

    pub fn duration_ms(&self) -> u64 {
        match self {
            Self::TenMinutes => 600 * 1_000,
            Self::OneHour => 3_600 * 1_000,
            Self::OneDay => 86_400 * 1_000,
        }
    }
}

/// Device history encodes GH/s multiplied by 100 as an integer.
pub const RAW_HASHRATE_DIVISOR: f64 = 100.0;
pub const GIGA: f64 = 1_000_000_000.0;

/// Raw device units to H/s: `raw * 1e9 / 100`
pub fn scale_raw_hashrate(raw: f64) -> f64 {
    raw * GIGA / RAW_HASHRATE_DIVISOR
}
