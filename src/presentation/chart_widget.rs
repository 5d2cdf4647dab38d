use crate::application::interaction::{InputEvent, InteractionController, Redraw};
use crate::domain::chart::{ChartLayout, ChartMode, StyleProvider, ViewportModel};
use crate::domain::errors::IngestResult;
use crate::domain::events::{ChartEvent, EventDispatcher, EventQueue, InMemoryEventDispatcher};
use crate::domain::logging::{LogComponent, get_logger};
use crate::domain::market_data::{BarRecord, BarSeries, SeriesIngestor};
use crate::infrastructure::config::ChartConfig;
use crate::infrastructure::rendering::overlay::OverlayRenderer;
use crate::infrastructure::rendering::painter::Painter;
use crate::infrastructure::rendering::renderer::{
    FrameStats, FrameTimer, GpuBackend, PaneRenderer, PriceGeometryBuilder, VolumeGeometryBuilder,
};
use crate::log_trace;

/// Host-facing candlestick chart: owns the viewport, the controller and
/// both pane renderers. Everything runs on the caller's (UI) thread.
pub struct CandleChartWidget {
    config: ChartConfig,
    model: ViewportModel,
    controller: InteractionController,
    price_pane: PaneRenderer<PriceGeometryBuilder>,
    volume_pane: PaneRenderer<VolumeGeometryBuilder>,
    overlay: OverlayRenderer,
    events: EventQueue,
    dispatcher: InMemoryEventDispatcher,
    timer: FrameTimer,
    width: f32,
    height: f32,
}

impl CandleChartWidget {
    pub fn new(config: ChartConfig, style: &dyn StyleProvider) -> Self {
        let config = config.validated();
        get_logger().info(
            LogComponent::Presentation("ChartWidget"),
            &format!("🚀 Chart widget created ({} bars initially visible)", config.initial_visible_bars),
        );
        Self {
            model: ViewportModel::from_provider(style, config.viewport_settings()),
            controller: InteractionController::new(config.scroll_speed),
            price_pane: PaneRenderer::price(),
            volume_pane: PaneRenderer::volume(),
            overlay: OverlayRenderer::new(&config),
            events: EventQueue::new(),
            dispatcher: InMemoryEventDispatcher::new(),
            timer: FrameTimer::new(),
            width: 0.0,
            height: 0.0,
            config,
        }
    }

    pub fn model(&self) -> &ViewportModel {
        &self.model
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Replaces the series. A tooltip showing a bar of the old series is
    /// closed with `HoverLeft` before the view change.
    pub fn set_data(&mut self, series: BarSeries) {
        let was_hovering = self.model.last_hovered_index().is_some();
        self.model.set_data(series);
        if was_hovering {
            self.events.push(ChartEvent::HoverLeft);
        }
        self.queue_view_changed();
    }

    /// Validates raw rows and installs the result. On error the current
    /// series is left untouched.
    pub fn load_records(&mut self, records: Vec<BarRecord>) -> IngestResult<usize> {
        let report = SeriesIngestor::ingest(records)?;
        let loaded = report.series.len();
        self.set_data(report.series);
        Ok(loaded)
    }

    pub fn set_mode(&mut self, mode: ChartMode) {
        self.model.set_mode(mode);
    }

    pub fn set_symbol_text(&mut self, text: impl Into<String>) {
        self.model.set_symbol_text(text);
    }

    /// Scrollbar entry point. Returns whether the window moved.
    pub fn set_start_bar(&mut self, start_bar: i64) -> bool {
        let changed = self.model.update_start_bar(start_bar);
        if changed {
            self.queue_view_changed();
        }
        changed
    }

    pub fn reload_style(&mut self, provider: &dyn StyleProvider) {
        self.model.reload_style(provider);
    }

    /// The bar under a still pointer can change with the pane width, so the
    /// hover is re-derived here.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        log_trace!(LogComponent::Presentation("ChartWidget"), "resized to {}x{}", self.width, self.height);
        let layout = self.layout();
        self.controller.sync_hover(&mut self.model, &layout, &mut self.events);
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn layout(&self) -> ChartLayout {
        ChartLayout::compute(
            self.width,
            self.height,
            self.model.style().volume_pane_ratio,
            self.config.time_axis_height,
            self.config.pane_separator_height,
        )
    }

    pub fn handle_input(&mut self, event: InputEvent) -> Redraw {
        let layout = self.layout();
        self.controller.handle(&mut self.model, &layout, event, &mut self.events)
    }

    /// One frame: background, geometry refresh, both panes, then the overlay.
    /// Rebuild always completes before the draws that use it.
    pub fn paint(
        &mut self,
        backend: &mut dyn GpuBackend,
        underlay: &mut dyn Painter,
        overlay: &mut dyn Painter,
    ) -> FrameStats {
        self.timer.begin();
        let layout = self.layout();

        self.overlay.render_underlay(&self.model, &layout, underlay);

        let price_rebuilt = self.price_pane.prepare(&self.model, backend);
        let volume_rebuilt = self.volume_pane.prepare(&self.model, backend);

        let volume_drawn = self.volume_pane.render(
            &self.model,
            layout.width,
            layout.volume_height,
            layout.volume_gpu_offset(),
            backend,
        );
        let price_drawn = self.price_pane.render(
            &self.model,
            layout.width,
            layout.price_height,
            layout.price_gpu_offset(),
            backend,
        );

        self.overlay.render(&self.model, &layout, overlay);

        let frame_time = self.timer.end();
        FrameStats { price_rebuilt, volume_rebuilt, price_drawn, volume_drawn, frame_time, fps: self.timer.fps() }
    }

    /// Forces both panes to rebuild and re-upload on the next paint.
    pub fn invalidate_geometry(&mut self) {
        self.price_pane.invalidate();
        self.volume_pane.invalidate();
    }

    pub fn rebuild_counts(&self) -> (u64, u64) {
        (self.price_pane.rebuild_count(), self.volume_pane.rebuild_count())
    }

    pub fn frame_timer(&self) -> &FrameTimer {
        &self.timer
    }

    pub fn subscribe<F>(&mut self, handler: F)
    where
        F: Fn(&ChartEvent) + 'static,
    {
        self.dispatcher.subscribe_to_chart_events(handler);
    }

    /// Publishes pending events to subscribers and returns them.
    pub fn drain_events(&mut self) -> Vec<ChartEvent> {
        let events = self.events.drain();
        for event in &events {
            self.dispatcher.publish_chart_event(event);
        }
        events
    }

    fn queue_view_changed(&mut self) {
        self.events.push(ChartEvent::ViewChanged {
            start_bar: self.model.start_bar(),
            visible_bars: self.model.visible_bars(),
            max_start_bar: self.model.max_start_bar(),
        });
    }
}

impl Default for CandleChartWidget {
    fn default() -> Self {
        Self::new(ChartConfig::default(), &crate::domain::chart::DefaultStyleProvider)
    }
}
