pub use super::value_objects::{OHLCV, Price, Timestamp, Volume};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Domain entity - one bar of the series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: Timestamp,
    pub ohlcv: OHLCV,
}

impl Bar {
    pub fn new(timestamp: Timestamp, ohlcv: OHLCV) -> Self {
        Self { timestamp, ohlcv }
    }

    /// Up bars close at or above the open. A doji counts as up.
    pub fn is_up(&self) -> bool {
        self.ohlcv.close >= self.ohlcv.open
    }

    pub fn is_doji(&self) -> bool {
        self.ohlcv.open.value() == self.ohlcv.close.value()
    }

    pub fn open(&self) -> f64 {
        self.ohlcv.open.value()
    }

    pub fn high(&self) -> f64 {
        self.ohlcv.high.value()
    }

    pub fn low(&self) -> f64 {
        self.ohlcv.low.value()
    }

    pub fn close(&self) -> f64 {
        self.ohlcv.close.value()
    }

    pub fn volume(&self) -> f64 {
        self.ohlcv.volume.value()
    }
}

static NEXT_GENERATION: AtomicU64 = AtomicU64::new(1);

/// Domain entity - immutable, shared, time-ordered bar sequence.
///
/// Cloning is cheap and yields the same generation. Every newly constructed
/// series gets a fresh generation, which is what geometry caches key on.
#[derive(Debug, Clone)]
pub struct BarSeries {
    bars: Arc<[Bar]>,
    generation: u64,
}

impl BarSeries {
    /// Wraps already validated, strictly time-ordered bars.
    pub fn new(bars: Vec<Bar>) -> Self {
        Self { bars: bars.into(), generation: NEXT_GENERATION.fetch_add(1, Ordering::Relaxed) }
    }

    pub fn empty() -> Self {
        Self { bars: Arc::from(Vec::new()), generation: 0 }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Sub-slice clamped to the series bounds; never panics.
    pub fn slice(&self, range: Range<usize>) -> &[Bar] {
        let end = range.end.min(self.bars.len());
        let start = range.start.min(end);
        &self.bars[start..end]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bar> {
        self.bars.iter()
    }

    /// Smallest positive gap between adjacent bars.
    pub fn bar_interval(&self) -> Option<Duration> {
        self.bars
            .windows(2)
            .map(|pair| pair[1].timestamp.value() - pair[0].timestamp.value())
            .filter(|gap| *gap > Duration::zero())
            .min()
    }

    /// Time at which the bar at `index` closes: its open time plus the bar interval.
    pub fn close_time(&self, index: usize) -> Option<Timestamp> {
        let bar = self.bars.get(index)?;
        let interval = self.bar_interval().unwrap_or_else(Duration::zero);
        Some(Timestamp::from(bar.timestamp.value() + interval))
    }
}

impl Default for BarSeries {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for BarSeries {
    fn eq(&self, other: &Self) -> bool {
        self.generation == other.generation && self.bars == other.bars
    }
}

/// Tooltip-ready rendering of a hovered bar
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSummary {
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
}

impl BarSummary {
    pub fn from_bar(bar: &Bar) -> Self {
        Self {
            open: format!("{:.2}", bar.open()),
            high: format!("{:.2}", bar.high()),
            low: format!("{:.2}", bar.low()),
            close: format!("{:.2}", bar.close()),
            volume: bar.ohlcv.volume.compact(),
        }
    }

    pub fn lines(&self) -> [String; 5] {
        [
            format!("O: {}", self.open),
            format!("H: {}", self.high),
            format!("L: {}", self.low),
            format!("C: {}", self.close),
            format!("V: {}", self.volume),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar_at(minute: i64, open: f64, close: f64) -> Bar {
        Bar::new(
            Timestamp::from_millis(minute * 60_000),
            OHLCV::new(
                Price::from(open),
                Price::from(open.max(close) + 1.0),
                Price::from(open.min(close) - 1.0),
                Price::from(close),
                Volume::from(1_500.0),
            ),
        )
    }

    #[test]
    fn doji_counts_as_up() {
        let bar = bar_at(0, 10.0, 10.0);
        assert!(bar.is_doji());
        assert!(bar.is_up());
        assert!(!bar_at(0, 10.0, 9.0).is_up());
    }

    #[test]
    fn slice_is_clamped() {
        let series = BarSeries::new((0..5).map(|i| bar_at(i, 10.0, 11.0)).collect());
        assert_eq!(series.slice(3..100).len(), 2);
        assert!(series.slice(7..9).is_empty());
    }

    #[test]
    fn generations_are_unique_per_series() {
        let a = BarSeries::new(vec![bar_at(0, 1.0, 2.0)]);
        let b = BarSeries::new(vec![bar_at(0, 1.0, 2.0)]);
        assert_ne!(a.generation(), b.generation());
        assert_eq!(a.clone().generation(), a.generation());
    }

    #[test]
    fn close_time_uses_smallest_gap() {
        let series = BarSeries::new(vec![bar_at(0, 1.0, 2.0), bar_at(1, 1.0, 2.0), bar_at(5, 1.0, 2.0)]);
        let close = series.close_time(2).map(|t| t.millis());
        assert_eq!(close, Some(6 * 60_000));
    }

    #[test]
    fn summary_uses_compact_volume() {
        let summary = BarSummary::from_bar(&bar_at(0, 10.0, 12.5));
        assert_eq!(summary.close, "12.50");
        assert_eq!(summary.volume, "1.5k");
    }
}
