//! Pointer, wheel and keyboard handling over a [`ViewportModel`].
//!
//! The controller owns no window-system resources. Hosts translate their
//! native events into [`InputEvent`]s and act on the returned [`Redraw`].

use crate::domain::chart::{ChartLayout, ChartMode, Interaction, ScreenPoint, ViewportModel};
use crate::domain::events::{ChartEvent, EventQueue};
use crate::domain::logging::LogComponent;
use crate::domain::market_data::BarSummary;
use crate::{log_debug, log_trace};

/// Wheel step towards fewer bars (scroll up)
const WHEEL_ZOOM_IN: f64 = 0.85;
const WHEEL_ZOOM_OUT: f64 = 1.15;
const KEY_ZOOM_IN: f64 = 0.8;
const KEY_ZOOM_OUT: f64 = 1.2;
/// Vertical zoom steps for `+`/`=` and `-`
const PRICE_ZOOM_IN: f64 = 0.9;
const PRICE_ZOOM_OUT: f64 = 1.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKey {
    Left,
    Right,
    Up,
    Down,
    /// `+` or `=`
    ZoomIn,
    /// `-`
    ZoomOut,
}

impl ChartKey {
    /// Maps a typed character to its key, if it has one.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '+' | '=' => Some(ChartKey::ZoomIn),
            '-' => Some(ChartKey::ZoomOut),
            _ => None,
        }
    }
}

/// Input in widget-local coordinates (top-down pixels)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    PointerPress { button: PointerButton, pos: ScreenPoint },
    PointerRelease { button: PointerButton, pos: ScreenPoint },
    /// `global_pos` is forwarded with hover events so the host can place a tooltip.
    PointerMove { pos: ScreenPoint, global_pos: ScreenPoint },
    PointerLeave,
    /// Positive `delta` is scroll up.
    Wheel { delta: f32, pos: ScreenPoint },
    Key(ChartKey),
}

impl InputEvent {
    pub fn pointer_move(x: f32, y: f32) -> Self {
        let pos = ScreenPoint::new(x, y);
        InputEvent::PointerMove { pos, global_pos: pos }
    }
}

/// What the host has to do after an event. Ordered by cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Redraw {
    #[default]
    None,
    /// Overlay changed; cached geometry is still valid
    Repaint,
    /// Visible window changed
    Rebuild,
}

impl Redraw {
    pub fn merge(self, other: Redraw) -> Redraw {
        self.max(other)
    }

    pub fn needs_paint(&self) -> bool {
        *self != Redraw::None
    }
}

pub struct InteractionController {
    scroll_speed: i64,
    /// Last pointer position in host coordinates, reused when the hover
    /// changes without the pointer moving.
    last_global_pos: Option<ScreenPoint>,
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(10)
    }
}

impl InteractionController {
    pub fn new(scroll_speed: i64) -> Self {
        Self { scroll_speed: scroll_speed.max(1), last_global_pos: None }
    }

    pub fn scroll_speed(&self) -> i64 {
        self.scroll_speed
    }

    /// Applies one input event. Outbound events are appended to `events`.
    /// With no data loaded every event is ignored.
    pub fn handle(
        &mut self,
        model: &mut ViewportModel,
        layout: &ChartLayout,
        event: InputEvent,
        events: &mut EventQueue,
    ) -> Redraw {
        if !model.has_data() {
            return Redraw::None;
        }
        match event {
            InputEvent::PointerPress { button, pos } => self.on_press(model, button, pos, events),
            InputEvent::PointerRelease { button, .. } => self.on_release(model, button),
            InputEvent::PointerMove { pos, global_pos } => self.on_move(model, layout, pos, global_pos, events),
            InputEvent::PointerLeave => self.on_leave(model, events),
            InputEvent::Wheel { delta, pos } => self.on_wheel(model, layout, delta, pos, events),
            InputEvent::Key(key) => self.on_key(model, layout, key, events),
        }
    }

    /// Re-derives the hovered bar from the last pointer position. Call it
    /// after the window or the pane width changed under a still pointer.
    /// Returns whether the hover changed.
    pub fn sync_hover(&mut self, model: &mut ViewportModel, layout: &ChartLayout, events: &mut EventQueue) -> bool {
        if !model.has_data() || !matches!(model.interaction(), Interaction::Idle) {
            return false;
        }
        match model.mouse_pos() {
            Some(pos) => self.update_hover(model, layout, pos, events),
            None => false,
        }
    }

    fn on_press(
        &mut self,
        model: &mut ViewportModel,
        button: PointerButton,
        pos: ScreenPoint,
        events: &mut EventQueue,
    ) -> Redraw {
        if !matches!(model.interaction(), Interaction::Idle) {
            return Redraw::None;
        }
        match button {
            PointerButton::Right => {
                model.begin_pan(pos);
                log_trace!(LogComponent::Application("Interaction"), "pan started at x={}", pos.x);
                Redraw::None
            }
            PointerButton::Left if model.mode() == ChartMode::Cursor => {
                model.set_last_hovered(None);
                events.push(ChartEvent::HoverLeft);
                model.set_mouse_pos(Some(pos));
                model.begin_selection(pos);
                Redraw::Repaint
            }
            _ => Redraw::None,
        }
    }

    fn on_release(&mut self, model: &mut ViewportModel, button: PointerButton) -> Redraw {
        match (button, *model.interaction()) {
            (PointerButton::Right, Interaction::Panning(_)) => {
                model.end_interaction();
                Redraw::Repaint
            }
            (PointerButton::Left, Interaction::Selecting(_)) => {
                model.end_interaction();
                Redraw::Repaint
            }
            _ => Redraw::None,
        }
    }

    fn on_move(
        &mut self,
        model: &mut ViewportModel,
        layout: &ChartLayout,
        pos: ScreenPoint,
        global_pos: ScreenPoint,
        events: &mut EventQueue,
    ) -> Redraw {
        model.set_mouse_pos(Some(pos));
        match *model.interaction() {
            Interaction::Panning(anchor) => {
                let bar_width = model.bar_width_px(layout.width);
                if bar_width <= 0.0 {
                    return Redraw::None;
                }
                let bar_delta = ((pos.x - anchor.origin.x) / bar_width).round() as i64;
                if model.update_start_bar(anchor.start_bar as i64 - bar_delta) {
                    events.push(view_changed(model));
                    Redraw::Rebuild
                } else {
                    Redraw::Repaint
                }
            }
            Interaction::Selecting(_) => {
                model.update_selection(pos);
                Redraw::Repaint
            }
            Interaction::Idle => {
                self.last_global_pos = Some(global_pos);
                self.update_hover(model, layout, pos, events);
                Redraw::Repaint
            }
        }
    }

    fn update_hover(
        &mut self,
        model: &mut ViewportModel,
        layout: &ChartLayout,
        pos: ScreenPoint,
        events: &mut EventQueue,
    ) -> bool {
        let index = if pos.x < layout.width { model.bar_index_at(pos.x, layout.width) } else { None };
        if !model.set_last_hovered(index) {
            return false;
        }
        match index.and_then(|i| model.series().get(i).map(|bar| (i, bar.clone()))) {
            Some((index, bar)) => {
                log_trace!(LogComponent::Application("Interaction"), "hover bar {}", index);
                let summary = BarSummary::from_bar(&bar);
                let screen_pos = self.last_global_pos.unwrap_or(pos);
                events.push(ChartEvent::BarHovered { index, bar, summary, screen_pos });
            }
            None => events.push(ChartEvent::HoverLeft),
        }
        true
    }

    fn on_leave(&mut self, model: &mut ViewportModel, events: &mut EventQueue) -> Redraw {
        self.last_global_pos = None;
        model.set_mouse_pos(None);
        if model.set_last_hovered(None) {
            events.push(ChartEvent::HoverLeft);
        }
        Redraw::Repaint
    }

    fn on_wheel(
        &mut self,
        model: &mut ViewportModel,
        layout: &ChartLayout,
        delta: f32,
        pos: ScreenPoint,
        events: &mut EventQueue,
    ) -> Redraw {
        if !matches!(model.interaction(), Interaction::Idle) || delta == 0.0 || layout.width <= 0.0 {
            return Redraw::None;
        }
        let multiplier = if delta > 0.0 { WHEEL_ZOOM_IN } else { WHEEL_ZOOM_OUT };
        let old_visible = model.visible_bars();
        let target = (old_visible as f64 * multiplier).round().max(0.0) as usize;

        let x = pos.x.clamp(0.0, layout.width);
        let bar_width = model.bar_width_px(layout.width);
        let bar_under_mouse = model.start_bar() as i64 + (x / bar_width).floor() as i64;
        let mouse_ratio = (x / layout.width) as f64;

        if !model.set_visible_bars(target) {
            return Redraw::None;
        }
        let new_start = bar_under_mouse - (mouse_ratio * model.visible_bars() as f64).round() as i64;
        model.update_start_bar(new_start);

        log_debug!(
            LogComponent::Application("Interaction"),
            "🔍 wheel zoom {} -> {} bars, start {}",
            old_visible,
            model.visible_bars(),
            model.start_bar()
        );
        events.push(view_changed(model));
        self.sync_hover(model, layout, events);
        Redraw::Rebuild
    }

    fn on_key(
        &mut self,
        model: &mut ViewportModel,
        layout: &ChartLayout,
        key: ChartKey,
        events: &mut EventQueue,
    ) -> Redraw {
        let changed = match key {
            ChartKey::Left => model.update_start_bar(model.start_bar() as i64 - self.scroll_speed),
            ChartKey::Right => model.update_start_bar(model.start_bar() as i64 + self.scroll_speed),
            ChartKey::Up => Self::resize_centered(model, KEY_ZOOM_IN),
            ChartKey::Down => Self::resize_centered(model, KEY_ZOOM_OUT),
            ChartKey::ZoomIn => model.set_zoom_factor(model.zoom_factor() * PRICE_ZOOM_IN),
            ChartKey::ZoomOut => model.set_zoom_factor(model.zoom_factor() * PRICE_ZOOM_OUT),
        };
        if !changed {
            return Redraw::None;
        }
        log_debug!(
            LogComponent::Application("Interaction"),
            "⌨️ {:?}: start {}, {} bars, zoom {:.3}",
            key,
            model.start_bar(),
            model.visible_bars(),
            model.zoom_factor()
        );
        events.push(view_changed(model));
        self.sync_hover(model, layout, events);
        Redraw::Rebuild
    }

    /// Scales the window around its current centre bar.
    fn resize_centered(model: &mut ViewportModel, multiplier: f64) -> bool {
        let (old_start, old_visible) = (model.start_bar(), model.visible_bars());
        let center = old_start as i64 + old_visible as i64 / 2;
        let target = (old_visible as f64 * multiplier).round() as usize;
        model.set_visible_bars(target);
        model.update_start_bar(center - model.visible_bars() as i64 / 2);
        model.start_bar() != old_start || model.visible_bars() != old_visible
    }
}

fn view_changed(model: &ViewportModel) -> ChartEvent {
    ChartEvent::ViewChanged {
        start_bar: model.start_bar(),
        visible_bars: model.visible_bars(),
        max_start_bar: model.max_start_bar(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::market_data::{Bar, BarSeries, OHLCV, Price, Timestamp, Volume};

    fn model_with(n: usize) -> ViewportModel {
        let bars = (0..n)
            .map(|i| {
                let base = 100.0 + i as f64;
                Bar::new(
                    Timestamp::from_millis(i as i64 * 60_000),
                    OHLCV::new(
                        Price::from(base),
                        Price::from(base + 2.0),
                        Price::from(base - 2.0),
                        Price::from(base + 1.0),
                        Volume::from(1_000.0),
                    ),
                )
            })
            .collect();
        let mut model = ViewportModel::default();
        model.set_data(BarSeries::new(bars));
        model
    }

    fn layout() -> ChartLayout {
        ChartLayout::compute(1000.0, 600.0, 0.25, 30.0, 5.0)
    }

    #[test]
    fn redraw_merges_to_the_costlier() {
        assert_eq!(Redraw::None.merge(Redraw::Repaint), Redraw::Repaint);
        assert_eq!(Redraw::Rebuild.merge(Redraw::Repaint), Redraw::Rebuild);
        assert!(!Redraw::None.needs_paint());
    }

    #[test]
    fn right_drag_pans_by_whole_bars() {
        let mut model = model_with(500);
        model.update_start_bar(200);
        let mut controller = InteractionController::default();
        let mut events = EventQueue::new();
        let layout = layout();

        let press = InputEvent::PointerPress { button: PointerButton::Right, pos: ScreenPoint::new(500.0, 100.0) };
        controller.handle(&mut model, &layout, press, &mut events);
        // 100 bars over 1000 px: 10 px per bar, dragging right reveals older bars
        let redraw = controller.handle(&mut model, &layout, InputEvent::pointer_move(550.0, 100.0), &mut events);
        assert_eq!(redraw, Redraw::Rebuild);
        assert_eq!(model.start_bar(), 195);

        let redraw = controller.handle(&mut model, &layout, InputEvent::pointer_move(552.0, 100.0), &mut events);
        assert_eq!(redraw, Redraw::Repaint);
        assert_eq!(events.drain().len(), 1);

        let release = InputEvent::PointerRelease { button: PointerButton::Right, pos: ScreenPoint::new(552.0, 100.0) };
        controller.handle(&mut model, &layout, release, &mut events);
        assert_eq!(*model.interaction(), Interaction::Idle);
    }

    #[test]
    fn left_press_in_marker_mode_does_not_select() {
        let mut model = model_with(50);
        model.set_mode(ChartMode::Marker);
        let mut events = EventQueue::new();
        let press = InputEvent::PointerPress { button: PointerButton::Left, pos: ScreenPoint::new(10.0, 10.0) };
        let redraw = InteractionController::default().handle(&mut model, &layout(), press, &mut events);
        assert_eq!(redraw, Redraw::None);
        assert!(!model.interaction().is_dragging());
        assert!(events.is_empty());
    }

    #[test]
    fn keys_that_change_nothing_are_silent() {
        let mut model = model_with(500);
        let mut controller = InteractionController::default();
        let mut events = EventQueue::new();
        let redraw = controller.handle(&mut model, &layout(), InputEvent::Key(ChartKey::Left), &mut events);
        assert_eq!(redraw, Redraw::None);
        assert!(events.is_empty());

        let redraw = controller.handle(&mut model, &layout(), InputEvent::Key(ChartKey::Right), &mut events);
        assert_eq!(redraw, Redraw::Rebuild);
        assert_eq!(model.start_bar(), 10);
    }

    #[test]
    fn up_key_narrows_around_centre() {
        let mut model = model_with(500);
        model.update_start_bar(200);
        let mut events = EventQueue::new();
        InteractionController::default().handle(&mut model, &layout(), InputEvent::Key(ChartKey::Up), &mut events);
        assert_eq!(model.visible_bars(), 80);
        // centre bar 250 stays in the middle
        assert_eq!(model.start_bar(), 210);
    }

    #[test]
    fn plus_and_minus_change_vertical_zoom_only() {
        let mut model = model_with(500);
        let mut controller = InteractionController::default();
        let mut events = EventQueue::new();
        controller.handle(&mut model, &layout(), InputEvent::Key(ChartKey::ZoomIn), &mut events);
        assert!((model.zoom_factor() - 0.9).abs() < 1e-12);
        controller.handle(&mut model, &layout(), InputEvent::Key(ChartKey::ZoomOut), &mut events);
        assert!((model.zoom_factor() - 0.99).abs() < 1e-12);
        assert_eq!(model.visible_bars(), 100);
        assert_eq!(ChartKey::from_char('='), Some(ChartKey::ZoomIn));
    }
}
