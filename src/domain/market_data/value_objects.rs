use chrono::{DateTime, TimeZone, Utc};
use derive_more::{Constructor, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Value Object - price in quote currency
#[derive(Debug, Clone, Copy, PartialEq, From, Into, Deref, Constructor, Serialize, Deserialize)]
pub struct Price(f64);

impl Price {
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

/// Value Object - traded volume
#[derive(Debug, Clone, Copy, PartialEq, From, Into, Deref, Constructor, Serialize, Deserialize)]
pub struct Volume(f64);

impl Volume {
    pub fn value(&self) -> f64 {
        self.0
    }

    /// Compact form used by labels and the hover summary: `1.23M`, `4.5k`, `812`.
    pub fn compact(&self) -> String {
        let vol = self.0;
        if vol > 1_000_000.0 {
            format!("{:.2}M", vol / 1_000_000.0)
        } else if vol > 1_000.0 {
            format!("{:.1}k", vol / 1_000.0)
        } else {
            format!("{}", vol.trunc() as i64)
        }
    }
}

/// Value Object - timezone-aware instant, stored in UTC
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, From, Into, Deref, Display, Serialize, Deserialize,
)]
#[display(fmt = "{}", _0)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    pub fn value(&self) -> DateTime<Utc> {
        self.0
    }

    /// Milliseconds since the Unix epoch. Out-of-range input clamps to the epoch.
    pub fn from_millis(millis: i64) -> Self {
        Self(Utc.timestamp_millis_opt(millis).single().unwrap_or(DateTime::UNIX_EPOCH))
    }

    pub fn millis(&self) -> i64 {
        self.0.timestamp_millis()
    }
}

/// Value Object - one OHLCV sample
#[derive(Debug, Clone, Copy, PartialEq, Constructor, Serialize, Deserialize)]
pub struct OHLCV {
    pub open: Price,
    pub high: Price,
    pub low: Price,
    pub close: Price,
    pub volume: Volume,
}

impl OHLCV {
    /// `low <= min(open, close) <= max(open, close) <= high`, positive prices,
    /// non-negative volume, everything finite.
    pub fn is_valid(&self) -> bool {
        let values = [
            self.open.value(),
            self.high.value(),
            self.low.value(),
            self.close.value(),
            self.volume.value(),
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return false;
        }
        let body_low = self.open.value().min(self.close.value());
        let body_high = self.open.value().max(self.close.value());
        self.low.value() > 0.0
            && self.low.value() <= body_low
            && body_high <= self.high.value()
            && self.volume.value() >= 0.0
    }
}
