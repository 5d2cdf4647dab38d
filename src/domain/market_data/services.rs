use super::entities::{Bar, BarSeries};
use super::value_objects::{OHLCV, Price, Timestamp, Volume};
use crate::domain::errors::{AppError, IngestResult};
use crate::domain::logging::{LogComponent, get_logger};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

/// Raw timestamp as delivered by a loader
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawTime {
    /// Epoch milliseconds
    Millis(i64),
    /// RFC 3339 or naive (assumed UTC) date-time text
    Text(String),
}

/// One untyped row handed over by the loading collaborator
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BarRecord {
    pub t: Option<RawTime>,
    pub o: Option<f64>,
    pub h: Option<f64>,
    pub l: Option<f64>,
    pub c: Option<f64>,
    pub v: Option<f64>,
}

impl BarRecord {
    fn has_all_values(&self) -> bool {
        [self.o, self.h, self.l, self.c, self.v].iter().all(|v| matches!(v, Some(x) if x.is_finite()))
    }
}

/// Outcome of an ingestion run
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub series: BarSeries,
    pub dropped_rows: usize,
}

const NAIVE_FORMATS: [&str; 4] =
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"];

/// Converts loader rows into a well-formed series or nothing at all.
///
/// Rows missing a price or volume are dropped. Anything else that is wrong
/// (bad timestamp, broken OHLC range, out-of-order rows) rejects the whole
/// input, so the core never sees a partially valid series.
pub struct SeriesIngestor;

impl SeriesIngestor {
    pub fn ingest(records: Vec<BarRecord>) -> IngestResult<IngestReport> {
        let total = records.len();
        let mut bars: Vec<Bar> = Vec::with_capacity(total);

        for (row, record) in records.into_iter().enumerate() {
            if !record.has_all_values() {
                continue;
            }
            let raw_time = record
                .t
                .as_ref()
                .ok_or_else(|| AppError::ValidationError(format!("row {row}: missing timestamp")))?;
            let timestamp = parse_timestamp(raw_time)
                .map_err(|e| AppError::ValidationError(format!("row {row}: {e}")))?;

            let ohlcv = OHLCV::new(
                Price::from(record.o.unwrap_or_default()),
                Price::from(record.h.unwrap_or_default()),
                Price::from(record.l.unwrap_or_default()),
                Price::from(record.c.unwrap_or_default()),
                Volume::from(record.v.unwrap_or_default()),
            );
            if !ohlcv.is_valid() {
                return Err(AppError::ValidationError(format!(
                    "row {row}: inconsistent OHLCV values {ohlcv:?}"
                )));
            }

            if let Some(previous) = bars.last() {
                if timestamp <= previous.timestamp {
                    return Err(AppError::ValidationError(format!(
                        "row {row}: timestamp {timestamp} is not after {}",
                        previous.timestamp
                    )));
                }
            }
            bars.push(Bar::new(timestamp, ohlcv));
        }

        let dropped_rows = total - bars.len();
        get_logger().info(
            LogComponent::Domain("Ingest"),
            &format!("📥 Ingested {} bars ({} rows dropped)", bars.len(), dropped_rows),
        );

        Ok(IngestReport { series: BarSeries::new(bars), dropped_rows })
    }

    /// Parses a JSON array of row objects.
    pub fn ingest_json(json: &str) -> IngestResult<IngestReport> {
        let records: Vec<BarRecord> = serde_json::from_str(json)
            .map_err(|e| AppError::ValidationError(format!("malformed bar rows: {e}")))?;
        Self::ingest(records)
    }
}

/// Timezone-aware text keeps its offset; naive text is taken as UTC.
pub fn parse_timestamp(raw: &RawTime) -> Result<Timestamp, String> {
    match raw {
        RawTime::Millis(ms) => DateTime::<Utc>::from_timestamp_millis(*ms)
            .map(Timestamp::from)
            .ok_or_else(|| format!("epoch millis {ms} out of range")),
        RawTime::Text(text) => {
            let text = text.trim();
            if let Ok(aware) = DateTime::parse_from_rfc3339(text) {
                return Ok(Timestamp::from(aware.with_timezone(&Utc)));
            }
            NAIVE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|naive| Timestamp::from(naive.and_utc()))
                .ok_or_else(|| format!("unparseable timestamp '{text}'"))
        }
    }
}
