use candle_label_chart::domain::chart::{
    ChartLayout, ChartMode, DragSelection, GradientDirection, ScreenPoint, StyleKey, StyleValue, ViewportModel,
    ViewportSettings,
};
use candle_label_chart::domain::market_data::{Bar, BarSeries, OHLCV, Price, Timestamp, Volume};
use candle_label_chart::infrastructure::rendering::painter::{Fill, PaintCommand, RecordingPainter, TextAlign};
use candle_label_chart::infrastructure::rendering::{OverlayRenderer, selection_summary};
use candle_label_chart::infrastructure::{ChartConfig, MapStyleProvider};
use candle_label_chart::time_utils::display_offset;
use insta::assert_snapshot;

/// 2024-03-05 23:57:00 UTC
const FIRST_BAR_MS: i64 = 1_709_683_020_000;

fn make_bar(i: usize) -> Bar {
    let base = 100.0 + i as f64;
    Bar::new(
        Timestamp::from_millis(FIRST_BAR_MS + i as i64 * 60_000),
        OHLCV::new(
            Price::from(base),
            Price::from(base + 2.0),
            Price::from(base - 1.0),
            Price::from(base + 1.0),
            Volume::from(1_000.0 * (i + 1) as f64),
        ),
    )
}

fn ten_bar_model() -> ViewportModel {
    let mut model = ViewportModel::default();
    model.set_data(BarSeries::new((0..10).map(make_bar).collect()));
    model.set_symbol_text("BTCUSDT 1m");
    model
}

fn layout() -> ChartLayout {
    ChartLayout::compute(800.0, 600.0, 0.25, 30.0, 5.0)
}

fn render(model: &ViewportModel) -> RecordingPainter {
    let mut painter = RecordingPainter::new();
    OverlayRenderer::new(&ChartConfig::default()).render(model, &layout(), &mut painter);
    painter
}

#[test]
fn empty_series_draws_background_only() {
    let model = ViewportModel::default();
    let overlay = OverlayRenderer::new(&ChartConfig::default());
    let mut underlay = RecordingPainter::new();
    overlay.render_underlay(&model, &layout(), &mut underlay);
    assert_eq!(underlay.commands.len(), 1);

    let painter = render(&model);
    assert!(painter.is_empty());
}

#[test]
fn gradient_background_follows_style() {
    let mut store = MapStyleProvider::with_defaults();
    store.set(StyleKey::BackgroundMode, StyleValue::Text("Gradient".into()));
    store.set(StyleKey::GradientDirection, StyleValue::Text("Horizontal".into()));
    let model = ViewportModel::from_provider(&store, ViewportSettings::default());

    let mut underlay = RecordingPainter::new();
    OverlayRenderer::new(&ChartConfig::default()).render_underlay(&model, &layout(), &mut underlay);
    match &underlay.commands[..] {
        [PaintCommand::FillRect { fill: Fill::LinearGradient { direction, .. }, rect }] => {
            assert_eq!(*direction, GradientDirection::Horizontal);
            assert_eq!((rect.width, rect.height), (800.0, 600.0));
        }
        other => panic!("unexpected underlay {other:?}"),
    }
}

#[test]
fn axis_labels_in_drawing_order() {
    let painter = render(&ten_bar_model());
    assert_snapshot!(
        painter.texts().join(" | "),
        @"101.04 | 103.68 | 106.32 | 108.96 | 111.00 | 99.00 | 5.0k | 10.0k | 23:57 | 23:58 | 23:59 | 00:00 | 00:01 | 00:02 | 00:03 | 00:04 | 00:05 | 00:06 | 06 Mar | BTCUSDT 1m"
    );
}

#[test]
fn first_time_label_is_pinned_to_left_edge() {
    let painter = render(&ten_bar_model());
    let first = painter.text_rect("23:57").unwrap();
    assert_eq!(first.x, 0.0);
    let second = painter.text_rect("23:58").unwrap();
    // centre of slot 1 is x=120
    assert_eq!(second.x, 70.0);

    let aligns: Vec<TextAlign> = painter
        .commands
        .iter()
        .filter_map(|c| match c {
            PaintCommand::Text { text, style, .. } if text == "23:57" || text == "23:58" => Some(style.align),
            _ => None,
        })
        .collect();
    assert_eq!(aligns, [TextAlign::Left, TextAlign::Center]);
}

#[test]
fn day_boundary_gets_full_height_separator() {
    let painter = render(&ten_bar_model());
    let separator = painter
        .lines()
        .into_iter()
        .find(|(from, to, _)| from.x == 240.0 && to.x == 240.0)
        .unwrap();
    assert_eq!((separator.0.y, separator.1.y), (0.0, 600.0));
    assert_eq!(painter.text_rect("06 Mar").unwrap().x, 245.0);
}

#[test]
fn crosshair_snaps_to_hovered_bar_and_labels_price() {
    let mut model = ten_bar_model();
    model.set_mouse_pos(Some(ScreenPoint::new(405.0, 200.0)));
    model.set_last_hovered(Some(5));
    let painter = render(&model);

    let lines = painter.lines();
    assert!(lines.iter().any(|(from, to, _)| *from == ScreenPoint::new(440.0, 0.0) && *to == ScreenPoint::new(440.0, 570.0)));
    assert!(lines.iter().any(|(from, to, _)| from.y == 200.0 && to.y == 200.0 && to.x == 800.0));
    assert_eq!(painter.texts().last(), Some(&"105.36"));
}

#[test]
fn crosshair_hidden_in_marker_mode_and_over_time_axis() {
    let mut model = ten_bar_model();
    let baseline = render(&model).commands.len();

    model.set_mouse_pos(Some(ScreenPoint::new(405.0, 585.0)));
    assert_eq!(render(&model).commands.len(), baseline);

    model.set_mouse_pos(Some(ScreenPoint::new(405.0, 200.0)));
    model.set_mode(ChartMode::Marker);
    assert_eq!(render(&model).commands.len(), baseline);
}

#[test]
fn selection_summary_reports_range_and_change() {
    let model = ten_bar_model();
    let selection = DragSelection { start: ScreenPoint::new(330.0, 150.0), end: ScreenPoint::new(85.0, 100.0) };
    let summary = selection_summary(&model, &selection, 800.0, display_offset(0)).unwrap();

    assert_eq!((summary.start_index, summary.end_index), (1, 4));
    assert_snapshot!(summary.headline(), @"4 bars (23:58:00 to 00:02:00)");
    assert_snapshot!(summary.change_text(), @"Change: $+4.00 (+3.96%)");
    assert!(summary.is_up);
}

#[test]
fn selection_past_data_has_no_summary() {
    let mut model = ViewportModel::default();
    model.set_data(BarSeries::new((0..10).map(make_bar).collect()));
    let selection = DragSelection { start: ScreenPoint::new(-40.0, 0.0), end: ScreenPoint::new(-5.0, 10.0) };
    assert!(selection_summary(&model, &selection, 800.0, display_offset(0)).is_none());
}

#[test]
fn selection_box_replaces_crosshair() {
    let mut model = ten_bar_model();
    model.set_mouse_pos(Some(ScreenPoint::new(330.0, 150.0)));
    model.set_last_hovered(Some(4));
    model.begin_selection(ScreenPoint::new(85.0, 100.0));
    model.update_selection(ScreenPoint::new(330.0, 150.0));
    let painter = render(&model);

    let texts = painter.texts();
    assert_eq!(texts[texts.len() - 2..], ["4 bars (23:58:00 to 00:02:00)", "Change: $+4.00 (+3.96%)"]);
    assert!(!painter.lines().iter().any(|(from, _, _)| from.x == 360.0 && from.y == 0.0));

    let rects: Vec<_> = painter
        .commands
        .iter()
        .filter_map(|c| match c {
            PaintCommand::Rect { rect, corner_radius, .. } if rect.width > LABEL_BOX_MAX => Some((*rect, *corner_radius)),
            _ => None,
        })
        .collect();
    assert_eq!(rects.len(), 2);
    assert_eq!(rects[0].0.x, 85.0);
    assert_eq!(rects[0].0.width, 245.0);
    assert_eq!(rects[1].1, 3.0);
}

/// Axis label boxes are 70 px wide; anything wider is the selection or its info box
const LABEL_BOX_MAX: f32 = 70.0;
