use candle_label_chart::domain::chart::{Color, StyleKey, StyleState, StyleValue, ViewportModel};
use candle_label_chart::domain::market_data::{Bar, BarSeries, OHLCV, Price, Timestamp, Volume};
use candle_label_chart::infrastructure::MapStyleProvider;
use candle_label_chart::infrastructure::rendering::renderer::{
    GeometryBuilder, GeometryCache, PriceGeometryBuilder, VolumeGeometryBuilder,
};

fn bar(i: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Bar {
    Bar::new(
        Timestamp::from_millis(i * 60_000),
        OHLCV::new(Price::from(open), Price::from(high), Price::from(low), Price::from(close), Volume::from(volume)),
    )
}

fn points(vertices: &[candle_label_chart::infrastructure::rendering::ChartVertex]) -> Vec<(f32, f32)> {
    vertices.iter().map(|v| (v.x(), v.y())).collect()
}

fn approx(a: &[(f32, f32)], b: &[(f32, f32)]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(p, q)| (p.0 - q.0).abs() < 1e-5 && (p.1 - q.1).abs() < 1e-5)
}

#[test]
fn doji_is_a_tick_not_a_body() {
    let style = StyleState::default();
    let slice = [bar(0, 11.0, 13.0, 10.0, 12.0, 1.0), bar(1, 10.0, 12.0, 8.0, 10.0, 1.0)];
    let geometry = PriceGeometryBuilder.build(&slice, &style);

    // slot 0: wick + body; slot 1: wick + doji tick
    assert_eq!(geometry.line_vertex_count(), 6);
    assert_eq!(geometry.quad_vertex_count(), 4);

    let lines = points(&geometry.lines);
    assert!(approx(&lines[2..], &[(1.5, 8.0), (1.5, 12.0), (1.1, 10.0), (1.9, 10.0)]));
    assert!(geometry.quads.iter().all(|v| v.x() < 1.0));
}

#[test]
fn body_spans_inner_width_between_open_and_close() {
    let style = StyleState::default();
    let geometry = PriceGeometryBuilder.build(&[bar(0, 20.0, 25.0, 15.0, 18.0, 1.0)], &style);
    assert!(approx(&points(&geometry.quads), &[(0.1, 20.0), (0.9, 20.0), (0.9, 18.0), (0.1, 18.0)]));
    assert!(geometry.quads.iter().all(|v| v.color == style.down_candle.to_array()));
    assert!(geometry.lines.iter().all(|v| v.color == style.down_wick.to_array()));
}

#[test]
fn doji_uses_up_wick_colour() {
    let provider = {
        let mut store = MapStyleProvider::with_defaults();
        store.set(StyleKey::UpWick, StyleValue::Text("#ff0000ff".into()));
        store
    };
    let style = StyleState::load(&provider);
    let geometry = PriceGeometryBuilder.build(&[bar(0, 10.0, 12.0, 8.0, 10.0, 1.0)], &style);
    assert!(geometry.lines.iter().all(|v| v.color == Color::from_argb(0xff0000ff).to_array()));
}

#[test]
fn volume_quads_rise_from_zero() {
    let style = StyleState::default();
    let slice = [bar(0, 1.0, 2.0, 0.5, 1.5, 300.0), bar(1, 1.5, 2.0, 1.0, 1.2, 120.0)];
    let geometry = VolumeGeometryBuilder.build(&slice, &style);
    assert_eq!(geometry.line_vertex_count(), 0);
    assert!(approx(
        &points(&geometry.quads[4..]),
        &[(1.1, 0.0), (1.9, 0.0), (1.9, 120.0), (1.1, 120.0)]
    ));
    assert_eq!(geometry.quads[0].color, style.up_volume.to_array());
    assert_eq!(geometry.quads[4].color, style.down_volume.to_array());
}

#[test]
fn cache_rebuilds_only_when_window_or_colours_change() {
    let mut model = ViewportModel::default();
    model.set_data(BarSeries::new((0..300).map(|i| bar(i, 10.0, 12.0, 9.0, 11.0, 5.0)).collect()));
    let mut cache = GeometryCache::new(PriceGeometryBuilder);

    assert!(cache.ensure(&model));
    assert!(!cache.ensure(&model));

    model.set_mouse_pos(Some(candle_label_chart::domain::chart::ScreenPoint::new(5.0, 5.0)));
    model.set_zoom_factor(0.8);
    assert!(!cache.ensure(&model), "hover and vertical zoom only re-project");

    model.update_start_bar(20);
    assert!(cache.ensure(&model));

    let mut store = MapStyleProvider::with_defaults();
    store.set(StyleKey::UpVolume, StyleValue::Text("#ff112233".into()));
    model.reload_style(&store);
    assert!(!cache.ensure(&model), "volume colour is not a price-pane input");

    store.set(StyleKey::UpCandle, StyleValue::Text("#ff112233".into()));
    model.reload_style(&store);
    assert!(cache.ensure(&model));
    assert_eq!(cache.rebuild_count(), 3);
}

#[test]
fn new_series_with_same_shape_still_rebuilds() {
    let bars: Vec<Bar> = (0..50).map(|i| bar(i, 10.0, 12.0, 9.0, 11.0, 5.0)).collect();
    let mut model = ViewportModel::default();
    model.set_data(BarSeries::new(bars.clone()));
    let mut cache = GeometryCache::new(VolumeGeometryBuilder);
    cache.ensure(&model);
    model.set_data(BarSeries::new(bars));
    assert!(cache.ensure(&model));
}
