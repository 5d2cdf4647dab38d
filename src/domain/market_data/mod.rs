//! Market data aggregate: bars, the immutable series and its ingestion boundary.

pub mod entities;
pub mod services;
pub mod value_objects;

pub use entities::{Bar, BarSeries, BarSummary};
pub use services::{BarRecord, IngestReport, RawTime, SeriesIngestor};
pub use value_objects::{OHLCV, Price, Timestamp, Volume};
