use super::style::{StyleProvider, StyleState};
use super::value_objects::{ChartMode, MIN_VISIBLE_BARS, PriceRange, ScreenPoint, ViewportSettings};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::{Bar, BarSeries};
use std::ops::Range;

/// Anchor captured when a right-button pan starts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanAnchor {
    pub origin: ScreenPoint,
    pub start_bar: usize,
}

/// Screen-space rectangle being dragged out with the left button
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSelection {
    pub start: ScreenPoint,
    pub end: ScreenPoint,
}

/// Pointer interaction in progress. Panning and selecting exclude each other.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Interaction {
    #[default]
    Idle,
    Panning(PanAnchor),
    Selecting(DragSelection),
}

impl Interaction {
    pub fn is_panning(&self) -> bool {
        matches!(self, Interaction::Panning(_))
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, Interaction::Selecting(_))
    }

    pub fn selection(&self) -> Option<&DragSelection> {
        match self {
            Interaction::Selecting(selection) => Some(selection),
            _ => None,
        }
    }
}

/// Mutable view state over the series
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportState {
    pub start_bar: usize,
    pub visible_bars: usize,
    pub zoom_factor: f64,
    pub mode: ChartMode,
    pub interaction: Interaction,
    pub mouse_pos: Option<ScreenPoint>,
    pub last_hovered_index: Option<usize>,
    pub symbol_text: String,
}

impl ViewportState {
    fn initial(visible_bars: usize) -> Self {
        Self {
            start_bar: 0,
            visible_bars,
            zoom_factor: 1.0,
            mode: ChartMode::Cursor,
            interaction: Interaction::Idle,
            mouse_pos: None,
            last_hovered_index: None,
            symbol_text: String::new(),
        }
    }
}

/// Domain entity - the logical view over a bar series.
///
/// Every mutation re-establishes `0 <= start_bar <= max_start_bar()` and
/// `10 <= visible_bars <= max(10, len)` by clamping. Nothing here renders.
#[derive(Debug, Clone)]
pub struct ViewportModel {
    series: BarSeries,
    state: ViewportState,
    style: StyleState,
    settings: ViewportSettings,
}

impl ViewportModel {
    pub fn new(style: StyleState, settings: ViewportSettings) -> Self {
        let visible = settings.initial_visible_bars.max(MIN_VISIBLE_BARS);
        Self { series: BarSeries::empty(), state: ViewportState::initial(visible), style, settings }
    }

    pub fn from_provider(provider: &dyn StyleProvider, settings: ViewportSettings) -> Self {
        Self::new(StyleState::load(provider), settings)
    }

    /// Replaces the series and resets the window, zoom and interaction.
    /// Mode and symbol text are host settings and survive.
    pub fn set_data(&mut self, series: BarSeries) {
        self.series = series;
        let visible = self.clamp_visible(self.settings.initial_visible_bars);
        self.state = ViewportState {
            mode: self.state.mode,
            symbol_text: std::mem::take(&mut self.state.symbol_text),
            mouse_pos: self.state.mouse_pos,
            ..ViewportState::initial(visible)
        };
        get_logger().info(
            LogComponent::Domain("Viewport"),
            &format!(
                "📊 Series loaded: {} bars (generation {}), showing {}",
                self.series.len(),
                self.series.generation(),
                visible
            ),
        );
    }

    pub fn series(&self) -> &BarSeries {
        &self.series
    }

    pub fn has_data(&self) -> bool {
        !self.series.is_empty()
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn style(&self) -> &StyleState {
        &self.style
    }

    pub fn settings(&self) -> &ViewportSettings {
        &self.settings
    }

    pub fn start_bar(&self) -> usize {
        self.state.start_bar
    }

    pub fn visible_bars(&self) -> usize {
        self.state.visible_bars
    }

    pub fn zoom_factor(&self) -> f64 {
        self.state.zoom_factor
    }

    pub fn mode(&self) -> ChartMode {
        self.state.mode
    }

    pub fn interaction(&self) -> &Interaction {
        &self.state.interaction
    }

    pub fn mouse_pos(&self) -> Option<ScreenPoint> {
        self.state.mouse_pos
    }

    pub fn last_hovered_index(&self) -> Option<usize> {
        self.state.last_hovered_index
    }

    pub fn symbol_text(&self) -> &str {
        &self.state.symbol_text
    }

    pub fn max_start_bar(&self) -> usize {
        self.series.len().saturating_sub(self.state.visible_bars)
    }

    fn clamp_visible(&self, count: usize) -> usize {
        count.clamp(MIN_VISIBLE_BARS, self.series.len().max(MIN_VISIBLE_BARS))
    }

    /// Clamps `candidate` into `[0, max_start_bar]`. Returns whether it moved.
    pub fn update_start_bar(&mut self, candidate: i64) -> bool {
        let max_start = self.max_start_bar() as i64;
        let clamped = candidate.clamp(0, max_start) as usize;
        let changed = clamped != self.state.start_bar;
        self.state.start_bar = clamped;
        changed
    }

    /// Sets the window width, then re-clamps the start. Returns whether
    /// either changed.
    pub fn set_visible_bars(&mut self, count: usize) -> bool {
        let clamped = self.clamp_visible(count);
        let width_changed = clamped != self.state.visible_bars;
        self.state.visible_bars = clamped;
        let start_changed = self.update_start_bar(self.state.start_bar as i64);
        width_changed || start_changed
    }

    /// Positive, finite factors only.
    pub fn set_zoom_factor(&mut self, zoom_factor: f64) -> bool {
        if !zoom_factor.is_finite() || zoom_factor <= 0.0 || zoom_factor == self.state.zoom_factor {
            return false;
        }
        self.state.zoom_factor = zoom_factor;
        true
    }

    pub fn visible_range(&self) -> Range<usize> {
        let start = self.state.start_bar.min(self.series.len());
        let end = (start + self.state.visible_bars).min(self.series.len());
        start..end
    }

    pub fn visible_slice(&self) -> &[Bar] {
        self.series.slice(self.visible_range())
    }

    /// Price window for `slice`, centred on its midpoint and scaled by zoom
    /// and padding. A flat or empty slice gets a one unit range.
    pub fn price_range(&self, slice: &[Bar]) -> PriceRange {
        if slice.is_empty() {
            return PriceRange::new(-0.5, 1.0);
        }
        let (low, high) = slice
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), bar| (lo.min(bar.low()), hi.max(bar.high())));
        let center = (low + high) / 2.0;
        let data_range = high - low;
        let display_range = if data_range > 0.0 {
            data_range * self.state.zoom_factor * self.settings.price_padding_factor
        } else {
            1.0
        };
        PriceRange::new(center - display_range / 2.0, display_range)
    }

    pub fn visible_price_range(&self) -> PriceRange {
        self.price_range(self.visible_slice())
    }

    pub fn max_visible_volume(&self) -> f64 {
        self.visible_slice().iter().map(Bar::volume).fold(0.0, f64::max)
    }

    /// Pixel width of one bar slot for a pane `pane_width` wide
    pub fn bar_width_px(&self, pane_width: f32) -> f32 {
        pane_width / self.state.visible_bars.max(1) as f32
    }

    /// Bar under screen X, or `None` when X falls outside the data.
    pub fn bar_index_at(&self, x: f32, pane_width: f32) -> Option<usize> {
        let bar_width = self.bar_width_px(pane_width);
        if !x.is_finite() || x < 0.0 || bar_width <= 0.0 {
            return None;
        }
        let index = self.state.start_bar + (x / bar_width).floor() as usize;
        (index < self.series.len()).then_some(index)
    }

    /// Screen X of the centre of bar `index`.
    pub fn bar_center_x(&self, index: usize, pane_width: f32) -> f32 {
        let local = index as f32 - self.state.start_bar as f32;
        (local + 0.5) * self.bar_width_px(pane_width)
    }

    pub fn reload_style(&mut self, provider: &dyn StyleProvider) {
        self.style = StyleState::load(provider);
        get_logger().info(LogComponent::Domain("Viewport"), "🎨 Style reloaded");
    }

    /// Entering marker mode abandons a selection drag.
    pub fn set_mode(&mut self, mode: ChartMode) {
        self.state.mode = mode;
        if mode == ChartMode::Marker && self.state.interaction.is_dragging() {
            self.state.interaction = Interaction::Idle;
        }
    }

    pub fn set_symbol_text(&mut self, text: impl Into<String>) {
        self.state.symbol_text = text.into();
    }

    pub fn set_mouse_pos(&mut self, position: Option<ScreenPoint>) {
        self.state.mouse_pos = position;
    }

    /// Returns whether the hovered index actually changed.
    pub fn set_last_hovered(&mut self, index: Option<usize>) -> bool {
        let changed = self.state.last_hovered_index != index;
        self.state.last_hovered_index = index;
        changed
    }

    pub fn begin_pan(&mut self, origin: ScreenPoint) {
        self.state.interaction =
            Interaction::Panning(PanAnchor { origin, start_bar: self.state.start_bar });
    }

    pub fn begin_selection(&mut self, at: ScreenPoint) {
        self.state.interaction = Interaction::Selecting(DragSelection { start: at, end: at });
    }

    pub fn update_selection(&mut self, to: ScreenPoint) -> bool {
        match &mut self.state.interaction {
            Interaction::Selecting(selection) => {
                selection.end = to;
                true
            }
            _ => false,
        }
    }

    pub fn end_interaction(&mut self) {
        self.state.interaction = Interaction::Idle;
    }
}

impl Default for ViewportModel {
    fn default() -> Self {
        Self::new(StyleState::default(), ViewportSettings::default())
    }
}
