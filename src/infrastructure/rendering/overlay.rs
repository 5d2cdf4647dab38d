//! Axes, grid, labels, crosshair and selection box, drawn through a
//! [`Painter`] on top of the GPU panes. Reads the viewport, never mutates it.

use super::gpu_structures::VOLUME_HEADROOM;
use super::painter::{Fill, Painter, Pen, TextAlign, TextStyle};
use crate::domain::chart::{
    BackgroundMode, ChartLayout, ChartMode, Color, DragSelection, LineStyle, PriceRange, ScreenPoint, ScreenRect,
    ViewportModel,
};
use crate::domain::market_data::Volume;
use crate::infrastructure::config::ChartConfig;
use crate::time_utils;
use chrono::FixedOffset;
use serde::Serialize;

const LABEL_WIDTH: f32 = 70.0;
const LABEL_HEIGHT: f32 = 18.0;
/// Label boxes sit this far left of the right edge
const LABEL_INSET: f32 = 75.0;
const LABEL_FONT: f32 = 9.0;
const LABEL_BACKGROUND: Color = Color::from_argb(0xB428_2828);
const LABEL_TEXT: Color = Color::from_argb(0xFFDC_DCDC);
const DAY_LABEL_TEXT: Color = Color::from_argb(0xB4DC_DCDC);
const SYMBOL_TEXT: Color = Color::from_argb(0xC8DC_DCDC);
const SELECTION_FILL: Color = Color::from_argb(0x2864_78C8);
const SELECTION_BORDER: Color = Color::from_argb(0xFF82_AAFF);
const INFO_BOX_FILL: Color = Color::from_argb(0xDC1E_1E1E);
const INFO_BOX_BORDER: Color = Color::from_argb(0xFF96_9696);
const INFO_BOX_OFFSET: f32 = 15.0;
const INFO_BOX_WIDTH: f32 = 300.0;
const INFO_BOX_PADDING: f32 = 5.0;
const INFO_LINE_HEIGHT: f32 = 18.0;

/// Range analysis of a drag selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionSummary {
    pub start_index: usize,
    pub end_index: usize,
    pub bar_count: usize,
    pub start_time: String,
    pub end_time: String,
    pub change: f64,
    pub percent_change: f64,
    pub is_up: bool,
}

impl SelectionSummary {
    pub fn headline(&self) -> String {
        format!("{} bars ({} to {})", self.bar_count, self.start_time, self.end_time)
    }

    pub fn change_text(&self) -> String {
        format!("Change: ${:+.2} ({:+.2}%)", self.change, self.percent_change)
    }
}

/// Maps the selection's horizontal extent to bars and summarises the move
/// from the first bar's open to the last bar's close. `None` when the
/// selection covers no data.
pub fn selection_summary(
    model: &ViewportModel,
    selection: &DragSelection,
    pane_width: f32,
    offset: FixedOffset,
) -> Option<SelectionSummary> {
    let series = model.series();
    let bar_width = model.bar_width_px(pane_width);
    if series.is_empty() || bar_width <= 0.0 {
        return None;
    }
    let rect = ScreenRect::from_corners(selection.start, selection.end);
    let start = model.start_bar() as i64 + (rect.x / bar_width).floor() as i64;
    let end = model.start_bar() as i64 + (rect.right() / bar_width).floor() as i64;
    let start = start.max(0) as usize;
    let end = end.min(series.len() as i64 - 1);
    if end < 0 || start > end as usize {
        return None;
    }
    let end = end as usize;

    let first = series.get(start)?;
    let last = series.get(end)?;
    let change = last.close() - first.open();
    let percent_change = if first.open() != 0.0 { change / first.open() * 100.0 } else { 0.0 };
    let close_time = series.close_time(end).unwrap_or(last.timestamp);

    Some(SelectionSummary {
        start_index: start,
        end_index: end,
        bar_count: end - start + 1,
        start_time: time_utils::format_clock(first.timestamp, offset),
        end_time: time_utils::format_clock(close_time, offset),
        change,
        percent_change,
        is_up: change >= 0.0,
    })
}

fn line_pen(style: &LineStyle) -> Pen {
    Pen { color: style.color, width: style.width as f32, style: style.pen }
}

pub struct OverlayRenderer {
    time_axis_height: f32,
    price_label_spacing: f32,
    offset: FixedOffset,
}

impl OverlayRenderer {
    pub fn new(config: &ChartConfig) -> Self {
        Self {
            time_axis_height: config.time_axis_height,
            price_label_spacing: config.price_label_spacing,
            offset: config.display_offset(),
        }
    }

    pub fn display_offset(&self) -> FixedOffset {
        self.offset
    }

    /// Background fill, painted beneath the GPU panes.
    pub fn render_underlay(&self, model: &ViewportModel, layout: &ChartLayout, painter: &mut dyn Painter) {
        if layout.width <= 0.0 || layout.height <= 0.0 {
            return;
        }
        let background = &model.style().background;
        let fill = match background.mode {
            BackgroundMode::Solid => Fill::Solid(background.color1),
            BackgroundMode::Gradient => Fill::LinearGradient {
                from: background.color1,
                to: background.color2,
                direction: background.direction,
            },
        };
        painter.fill_rect(ScreenRect::new(0.0, 0.0, layout.width, layout.height), &fill);
    }

    /// Everything above the GPU panes. No-op without data.
    pub fn render(&self, model: &ViewportModel, layout: &ChartLayout, painter: &mut dyn Painter) {
        if !model.has_data() || model.visible_slice().is_empty() || layout.width <= 0.0 {
            return;
        }
        let range = model.visible_price_range();

        self.draw_price_axis(model, layout, &range, painter);
        self.draw_volume_axis(model, layout, painter);
        self.draw_time_axis_and_separators(model, layout, painter);
        self.draw_symbol(model, painter);

        if let Some(selection) = model.interaction().selection() {
            self.draw_selection(model, layout, selection, painter);
        } else if model.mode() == ChartMode::Cursor {
            if let Some(mouse) = model.mouse_pos().filter(|p| layout.in_chart_area(*p)) {
                self.draw_crosshair(model, layout, &range, mouse, painter);
            }
        }
    }

    fn draw_label(&self, painter: &mut dyn Painter, layout: &ChartLayout, y: f32, text: &str, background: Color) {
        let rect = ScreenRect::new(layout.width - LABEL_INSET, y - LABEL_HEIGHT / 2.0, LABEL_WIDTH, LABEL_HEIGHT);
        painter.draw_rect(rect, Some(&Fill::Solid(background)), None, 0.0);
        painter.draw_text(
            rect,
            text,
            &TextStyle { color: LABEL_TEXT, size: LABEL_FONT, bold: false, align: TextAlign::Center },
        );
    }

    /// Number of horizontal price grid divisions for a pane `height` tall
    pub fn price_divisions(&self, height: f32) -> usize {
        ((height / self.price_label_spacing).floor() as usize).max(2)
    }

    fn draw_price_axis(&self, model: &ViewportModel, layout: &ChartLayout, range: &PriceRange, painter: &mut dyn Painter) {
        let (top, height) = (layout.price_top, layout.price_height);
        if height <= 0.0 {
            return;
        }
        let pen = line_pen(&model.style().price_grid);
        let divisions = self.price_divisions(height);
        for i in 1..divisions {
            let price = range.min_display + (i as f64 / divisions as f64) * range.display_range;
            let y = range.price_to_y(price, top, height).floor();
            painter.draw_line(ScreenPoint::new(0.0, y), ScreenPoint::new(layout.width, y), &pen);
            self.draw_label(painter, layout, y, &format!("{:.2}", price), LABEL_BACKGROUND);
        }

        let slice = model.visible_slice();
        let high = slice.iter().map(|b| b.high()).fold(f64::NEG_INFINITY, f64::max);
        let low = slice.iter().map(|b| b.low()).fold(f64::INFINITY, f64::min);
        for price in [high, low] {
            let y = range.price_to_y(price, top, height).floor();
            self.draw_label(painter, layout, y, &format!("{:.2}", price), LABEL_BACKGROUND);
        }
    }

    fn draw_volume_axis(&self, model: &ViewportModel, layout: &ChartLayout, painter: &mut dyn Painter) {
        let (top, height) = (layout.volume_top, layout.volume_height);
        let max_volume = model.max_visible_volume();
        if height <= 0.0 || max_volume <= 0.0 {
            return;
        }
        let pen = line_pen(&model.style().price_grid);
        for step in 1..=2 {
            let volume = step as f64 / 2.0 * max_volume;
            let ratio = volume / (max_volume * VOLUME_HEADROOM);
            let y = (top + ((1.0 - ratio) * height as f64) as f32).floor();
            painter.draw_line(ScreenPoint::new(0.0, y), ScreenPoint::new(layout.width, y), &pen);
            self.draw_label(painter, layout, y, &Volume::from(volume).compact(), LABEL_BACKGROUND);
        }
    }

    fn draw_time_axis_and_separators(&self, model: &ViewportModel, layout: &ChartLayout, painter: &mut dyn Painter) {
        let slice = model.visible_slice();
        let visible = model.visible_bars().max(1) as f32;
        let (w, h) = (layout.width, layout.height);
        let label_y = h - self.time_axis_height + 5.0;
        let daily = time_utils::is_daily(model.series().bar_interval());

        let step = (model.visible_bars() / 10).max(1);
        for (i, bar) in slice.iter().enumerate().step_by(step) {
            let x = (((i as f32 + 0.5) / visible) * w).floor();
            let mut rect = ScreenRect::new(x - 50.0, label_y, 100.0, 20.0);
            let mut align = TextAlign::Center;
            if i == 0 && rect.x < 0.0 {
                rect.x = 0.0;
                align = TextAlign::Left;
            }
            let text = time_utils::format_time_label(bar.timestamp, self.offset, daily);
            painter.draw_text(rect, &text, &TextStyle { color: LABEL_TEXT, size: LABEL_FONT, bold: true, align });
        }

        let pen = line_pen(&model.style().time_grid);
        let mut last_date = slice.first().map(|bar| time_utils::local_date(bar.timestamp, self.offset));
        for (i, bar) in slice.iter().enumerate().skip(1) {
            let date = time_utils::local_date(bar.timestamp, self.offset);
            if last_date != Some(date) {
                let x = ((i as f32 / visible) * w).floor();
                painter.draw_line(ScreenPoint::new(x, 0.0), ScreenPoint::new(x, h), &pen);
                painter.draw_text(
                    ScreenRect::new(x + 5.0, label_y, 60.0, 20.0),
                    &time_utils::format_day_label(bar.timestamp, self.offset),
                    &TextStyle { color: DAY_LABEL_TEXT, size: LABEL_FONT, bold: true, align: TextAlign::Left },
                );
            }
            last_date = Some(date);
        }
    }

    fn draw_symbol(&self, model: &ViewportModel, painter: &mut dyn Painter) {
        let symbol = model.symbol_text();
        if symbol.is_empty() {
            return;
        }
        painter.draw_text(
            ScreenRect::new(15.0, 5.0, 500.0, 30.0),
            symbol,
            &TextStyle { color: SYMBOL_TEXT, size: 14.0, bold: true, align: TextAlign::Left },
        );
    }

    fn draw_selection(
        &self,
        model: &ViewportModel,
        layout: &ChartLayout,
        selection: &DragSelection,
        painter: &mut dyn Painter,
    ) {
        let rect = ScreenRect::from_corners(selection.start, selection.end);
        painter.draw_rect(
            rect,
            Some(&Fill::Solid(SELECTION_FILL)),
            Some(&Pen::solid(SELECTION_BORDER, 1.0)),
            0.0,
        );

        let Some(summary) = selection_summary(model, selection, layout.width, self.offset) else {
            return;
        };
        let anchor = selection.end.offset(INFO_BOX_OFFSET - INFO_BOX_PADDING, INFO_BOX_OFFSET - INFO_BOX_PADDING);
        let box_rect = ScreenRect::new(
            anchor.x,
            anchor.y,
            INFO_BOX_WIDTH + 2.0 * INFO_BOX_PADDING,
            2.0 * INFO_LINE_HEIGHT + 2.0 * INFO_BOX_PADDING,
        );
        painter.draw_rect(
            box_rect,
            Some(&Fill::Solid(INFO_BOX_FILL)),
            Some(&Pen::solid(INFO_BOX_BORDER, 1.0)),
            3.0,
        );

        let text_x = box_rect.x + INFO_BOX_PADDING;
        let text_y = box_rect.y + INFO_BOX_PADDING;
        painter.draw_text(
            ScreenRect::new(text_x, text_y, INFO_BOX_WIDTH, INFO_LINE_HEIGHT),
            &summary.headline(),
            &TextStyle { color: LABEL_TEXT, size: 10.0, bold: true, align: TextAlign::Left },
        );
        let style = model.style();
        let change_color = if summary.is_up { style.up_candle } else { style.down_candle };
        painter.draw_text(
            ScreenRect::new(text_x, text_y + INFO_LINE_HEIGHT, INFO_BOX_WIDTH, INFO_LINE_HEIGHT),
            &summary.change_text(),
            &TextStyle { color: change_color, size: 10.0, bold: true, align: TextAlign::Left },
        );
    }

    fn draw_crosshair(
        &self,
        model: &ViewportModel,
        layout: &ChartLayout,
        range: &PriceRange,
        mouse: ScreenPoint,
        painter: &mut dyn Painter,
    ) {
        let crosshair = &model.style().crosshair;
        let pen = line_pen(crosshair);

        if let Some(index) = model.last_hovered_index() {
            let x = model.bar_center_x(index, layout.width).floor();
            painter.draw_line(ScreenPoint::new(x, 0.0), ScreenPoint::new(x, layout.chart_area_height()), &pen);
        }
        painter.draw_line(ScreenPoint::new(0.0, mouse.y), ScreenPoint::new(layout.width, mouse.y), &pen);

        if layout.in_price_pane(mouse.y) {
            let price = range.y_to_price(mouse.y, layout.price_top, layout.price_height);
            self.draw_label(painter, layout, mouse.y, &format!("{:.2}", price), crosshair.color);
        }
    }
}
