use candle_label_chart::domain::chart::ViewportModel;
use candle_label_chart::domain::market_data::{Bar, BarSeries, OHLCV, Price, Timestamp, Volume};
use candle_label_chart::infrastructure::rendering::renderer::{
    BufferSlot, GpuCommand, PaneRect, PaneRenderer, RecordingBackend, Topology,
};

fn make_bar(i: usize) -> Bar {
    let open = 20.0 + (i % 5) as f64;
    let close = if i % 3 == 0 { open } else { open + 1.0 };
    Bar::new(
        Timestamp::from_millis(i as i64 * 60_000),
        OHLCV::new(
            Price::from(open),
            Price::from(open + 2.0),
            Price::from(open - 1.0),
            Price::from(close),
            Volume::from(40.0 + i as f64),
        ),
    )
}

fn model_with(n: usize) -> ViewportModel {
    let mut model = ViewportModel::default();
    model.set_data(BarSeries::new((0..n).map(make_bar).collect()));
    model
}

#[test]
fn draws_lines_then_quads_inside_pane_and_resets_state() {
    let model = model_with(30);
    let mut pane = PaneRenderer::price();
    let mut backend = RecordingBackend::new();

    assert!(pane.prepare(&model, &mut backend));
    backend.clear_log();
    assert!(pane.render(&model, 800.0, 400.0, 180.0, &mut backend));

    match backend.commands.as_slice() {
        [
            GpuCommand::SetPane { rect, .. },
            GpuCommand::Draw { slot: BufferSlot::PriceLines, topology: Topology::Lines, vertex_count: lines },
            GpuCommand::Draw { slot: BufferSlot::PriceQuads, topology: Topology::Quads, vertex_count: quads },
            GpuCommand::ClearPane,
        ] => {
            assert_eq!(*rect, PaneRect { x: 0.0, y_offset: 180.0, width: 800.0, height: 400.0 });
            // 10 doji among 30 bars: 30 wicks + 10 ticks, 20 bodies
            assert_eq!(*lines, 80);
            assert_eq!(*quads, 80);
        }
        other => panic!("unexpected commands {other:?}"),
    }
    assert!(!backend.scissor_active());
}

#[test]
fn repaint_without_window_change_skips_upload() {
    let mut model = model_with(300);
    let mut pane = PaneRenderer::volume();
    let mut backend = RecordingBackend::new();

    pane.prepare(&model, &mut backend);
    assert_eq!(backend.uploads(), 2);

    model.set_last_hovered(Some(3));
    assert!(!pane.prepare(&model, &mut backend));
    assert_eq!(backend.uploads(), 2);

    model.update_start_bar(50);
    assert!(pane.prepare(&model, &mut backend));
    assert_eq!(backend.uploads(), 4);
    assert_eq!(backend.buffers[&BufferSlot::VolumeQuads].len(), 400);
    assert_eq!(pane.rebuild_count(), 2);
}

#[test]
fn empty_series_or_zero_pane_draws_nothing() {
    let empty = ViewportModel::default();
    let mut pane = PaneRenderer::price();
    let mut backend = RecordingBackend::new();
    pane.prepare(&empty, &mut backend);
    assert!(!pane.render(&empty, 800.0, 400.0, 0.0, &mut backend));

    let model = model_with(30);
    pane.prepare(&model, &mut backend);
    backend.clear_log();
    assert!(!pane.render(&model, 800.0, 0.0, 0.0, &mut backend));
    assert!(backend.commands.is_empty());
}

#[test]
fn volume_projection_leaves_headroom() {
    let model = model_with(30);
    let projection = PaneRenderer::volume().projection(&model);
    assert_eq!(projection.right, 30.0);
    assert!((projection.top - 69.0 * 1.05).abs() < 1e-9);
}
