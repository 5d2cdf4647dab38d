use candle_label_chart::domain::errors::AppError;
use candle_label_chart::domain::market_data::{BarRecord, RawTime, SeriesIngestor};

fn row(t: &str, o: f64, h: f64, l: f64, c: f64, v: f64) -> BarRecord {
    BarRecord {
        t: Some(RawTime::Text(t.to_string())),
        o: Some(o),
        h: Some(h),
        l: Some(l),
        c: Some(c),
        v: Some(v),
    }
}

#[test]
fn incomplete_rows_are_dropped_and_reindexed() {
    let mut missing_volume = row("2024-03-01 14:31:00", 10.0, 11.0, 9.0, 10.5, 0.0);
    missing_volume.v = None;
    let records = vec![
        row("2024-03-01 14:30:00", 10.0, 11.0, 9.0, 10.5, 100.0),
        missing_volume,
        row("2024-03-01 14:32:00", 10.5, 12.0, 10.0, 11.5, 80.0),
    ];
    let report = SeriesIngestor::ingest(records).unwrap();
    assert_eq!(report.dropped_rows, 1);
    assert_eq!(report.series.len(), 2);
    assert_eq!(report.series.get(1).unwrap().close(), 11.5);
    assert!(report.series.get(2).is_none());
}

#[test]
fn json_rows_accept_text_and_epoch_times() {
    let json = r#"[
        {"t": "2024-03-01T14:30:00Z", "o": 1.0, "h": 2.0, "l": 0.5, "c": 1.5, "v": 10},
        {"t": 1709303460000, "o": 1.5, "h": 2.5, "l": 1.0, "c": 2.0, "v": 12.5},
        {"t": "2024-03-01 14:32", "o": 2.0, "h": 2.0, "l": 1.5, "c": 1.5, "v": null}
    ]"#;
    let report = SeriesIngestor::ingest_json(json).unwrap();
    assert_eq!(report.series.len(), 2);
    assert_eq!(report.dropped_rows, 1);
    assert_eq!(report.series.get(1).unwrap().timestamp.millis(), 1_709_303_460_000);
}

#[test]
fn broken_ohlc_rejects_everything() {
    let records = vec![
        row("2024-03-01 14:30:00", 10.0, 11.0, 9.0, 10.5, 100.0),
        row("2024-03-01 14:31:00", 10.0, 9.5, 9.0, 10.5, 100.0),
    ];
    assert!(matches!(SeriesIngestor::ingest(records), Err(AppError::ValidationError(_))));
}

#[test]
fn out_of_order_rows_reject_everything() {
    let records = vec![
        row("2024-03-01 14:31:00", 10.0, 11.0, 9.0, 10.5, 100.0),
        row("2024-03-01 14:30:00", 10.0, 11.0, 9.0, 10.5, 100.0),
    ];
    let err = SeriesIngestor::ingest(records).unwrap_err();
    assert!(err.to_string().contains("row 1"), "{err}");
}

#[test]
fn unparseable_timestamp_rejects_everything() {
    let records = vec![row("soon", 10.0, 11.0, 9.0, 10.5, 100.0)];
    assert!(SeriesIngestor::ingest(records).is_err());
    assert!(SeriesIngestor::ingest_json("{not json").is_err());
}

#[test]
fn each_load_is_a_new_generation() {
    let rows = || vec![row("2024-03-01 14:30:00", 10.0, 11.0, 9.0, 10.5, 100.0)];
    let a = SeriesIngestor::ingest(rows()).unwrap().series;
    let b = SeriesIngestor::ingest(rows()).unwrap().series;
    assert_ne!(a.generation(), b.generation());
    assert_eq!(a.clone().generation(), a.generation());
}
