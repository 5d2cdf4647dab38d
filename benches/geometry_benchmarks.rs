use candle_label_chart::domain::chart::{ChartLayout, StyleState, ViewportModel};
use candle_label_chart::domain::market_data::{Bar, BarSeries, OHLCV, Price, Timestamp, Volume};
use candle_label_chart::infrastructure::ChartConfig;
use candle_label_chart::infrastructure::rendering::renderer::{
    GeometryBuilder, PriceGeometryBuilder, VolumeGeometryBuilder,
};
use candle_label_chart::infrastructure::rendering::{OverlayRenderer, RecordingPainter};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;

/// Synthetic one-minute bars with a slow trend and some wobble
fn generate_bars(count: usize) -> Vec<Bar> {
    let mut base_price = 50_000.0;
    (0..count)
        .map(|i| {
            let t = i as f64;
            let open = base_price + (t * 0.1).sin() * 100.0;
            let close = if i % 50 == 0 { open } else { open + (t * 0.2).cos() * 50.0 };
            let high = open.max(close) + (t * 0.3).sin().abs() * 25.0;
            let low = open.min(close) - (t * 0.4).cos().abs() * 25.0;
            let volume = 1_000.0 + (t * 0.5).sin().abs() * 500.0;
            base_price = close * 0.999 + open * 0.001;
            Bar::new(
                Timestamp::from_millis(1_640_000_000_000 + i as i64 * 60_000),
                OHLCV::new(Price::from(open), Price::from(high), Price::from(low), Price::from(close), Volume::from(volume)),
            )
        })
        .collect()
}

fn bench_geometry_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("geometry_build");
    group.measurement_time(Duration::from_secs(5));
    let style = StyleState::default();

    for count in [100, 1_000, 10_000, 100_000] {
        let bars = generate_bars(count);
        group.bench_with_input(BenchmarkId::new("price", count), &bars, |b, bars| {
            b.iter(|| black_box(PriceGeometryBuilder.build(black_box(bars), &style)))
        });
        group.bench_with_input(BenchmarkId::new("volume", count), &bars, |b, bars| {
            b.iter(|| black_box(VolumeGeometryBuilder.build(black_box(bars), &style)))
        });
    }
    group.finish();
}

fn bench_overlay(c: &mut Criterion) {
    let mut model = ViewportModel::default();
    model.set_data(BarSeries::new(generate_bars(5_000)));
    model.set_visible_bars(500);
    model.set_symbol_text("BTCUSDT 1m");
    let overlay = OverlayRenderer::new(&ChartConfig::default());
    let layout = ChartLayout::compute(1920.0, 1080.0, 0.25, 30.0, 5.0);

    c.bench_function("overlay_render_500_bars", |b| {
        b.iter(|| {
            let mut painter = RecordingPainter::new();
            overlay.render(&model, &layout, &mut painter);
            black_box(painter.commands.len())
        })
    });
}

criterion_group!(benches, bench_geometry_build, bench_overlay);
criterion_main!(benches);
