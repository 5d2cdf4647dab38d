use super::geometry::{GeometryBuilder, GeometryCache, PaneGeometry, PriceGeometryBuilder, VolumeGeometryBuilder};
use crate::domain::chart::ViewportModel;
use crate::domain::logging::LogComponent;
use crate::infrastructure::rendering::gpu_structures::{ChartVertex, PaneProjection};
use crate::log_trace;

/// GPU-side vertex storage, one per pane and primitive kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferSlot {
    PriceLines,
    PriceQuads,
    VolumeLines,
    VolumeQuads,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    Lines,
    /// Four vertices per quad; the backend triangulates
    Quads,
}

/// Drawing region in surface pixels. `y_offset` is measured from the bottom
/// edge, the way the GPU viewport is specified.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaneRect {
    pub x: f32,
    pub y_offset: f32,
    pub width: f32,
    pub height: f32,
}

impl PaneRect {
    /// Top edge in top-down surface coordinates
    pub fn top_down_y(&self, surface_height: f32) -> f32 {
        surface_height - self.y_offset - self.height
    }
}

/// The minimal set of GPU operations the pane renderers need.
///
/// `set_pane` establishes scissor and viewport for the following draws;
/// `clear_pane` must restore full-surface state.
pub trait GpuBackend {
    fn write_vertices(&mut self, slot: BufferSlot, vertices: &[ChartVertex]);
    fn set_pane(&mut self, rect: PaneRect, view_proj: [[f32; 4]; 4]);
    fn draw(&mut self, slot: BufferSlot, topology: Topology, vertex_count: u32);
    fn clear_pane(&mut self);
}

/// What a [`RecordingBackend`] saw
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCommand {
    Upload { slot: BufferSlot, vertex_count: usize },
    SetPane { rect: PaneRect, view_proj: [[f32; 4]; 4] },
    Draw { slot: BufferSlot, topology: Topology, vertex_count: u32 },
    ClearPane,
}

/// Backend that records commands and keeps uploaded vertices in memory.
/// Used by tests and headless hosts.
#[derive(Debug, Default, Clone)]
pub struct RecordingBackend {
    pub commands: Vec<GpuCommand>,
    pub buffers: std::collections::HashMap<BufferSlot, Vec<ChartVertex>>,
    scissor_active: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draws(&self) -> Vec<&GpuCommand> {
        self.commands.iter().filter(|c| matches!(c, GpuCommand::Draw { .. })).collect()
    }

    pub fn uploads(&self) -> usize {
        self.commands.iter().filter(|c| matches!(c, GpuCommand::Upload { .. })).count()
    }

    pub fn scissor_active(&self) -> bool {
        self.scissor_active
    }

    pub fn clear_log(&mut self) {
        self.commands.clear();
    }
}

impl GpuBackend for RecordingBackend {
    fn write_vertices(&mut self, slot: BufferSlot, vertices: &[ChartVertex]) {
        self.buffers.insert(slot, vertices.to_vec());
        self.commands.push(GpuCommand::Upload { slot, vertex_count: vertices.len() });
    }

    fn set_pane(&mut self, rect: PaneRect, view_proj: [[f32; 4]; 4]) {
        self.scissor_active = true;
        self.commands.push(GpuCommand::SetPane { rect, view_proj });
    }

    fn draw(&mut self, slot: BufferSlot, topology: Topology, vertex_count: u32) {
        self.commands.push(GpuCommand::Draw { slot, topology, vertex_count });
    }

    fn clear_pane(&mut self) {
        self.scissor_active = false;
        self.commands.push(GpuCommand::ClearPane);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaneKind {
    Price,
    Volume,
}

/// Draws one pane from cached geometry.
///
/// `prepare` rebuilds and uploads when the cache key moved; `render` only
/// sets the pane projection and issues the two draws. Both run inside one
/// paint so geometry and projection always belong to the same window.
#[derive(Debug, Clone)]
pub struct PaneRenderer<B> {
    kind: PaneKind,
    cache: GeometryCache<B>,
    uploaded: bool,
}

impl PaneRenderer<PriceGeometryBuilder> {
    pub fn price() -> Self {
        Self::new(PaneKind::Price, PriceGeometryBuilder)
    }
}

impl PaneRenderer<VolumeGeometryBuilder> {
    pub fn volume() -> Self {
        Self::new(PaneKind::Volume, VolumeGeometryBuilder)
    }
}

impl<B: GeometryBuilder> PaneRenderer<B> {
    pub fn new(kind: PaneKind, builder: B) -> Self {
        Self { kind, cache: GeometryCache::new(builder), uploaded: false }
    }

    pub fn kind(&self) -> PaneKind {
        self.kind
    }

    fn slots(&self) -> (BufferSlot, BufferSlot) {
        match self.kind {
            PaneKind::Price => (BufferSlot::PriceLines, BufferSlot::PriceQuads),
            PaneKind::Volume => (BufferSlot::VolumeLines, BufferSlot::VolumeQuads),
        }
    }

    pub fn geometry(&self) -> &PaneGeometry {
        self.cache.geometry()
    }

    pub fn rebuild_count(&self) -> u64 {
        self.cache.rebuild_count()
    }

    /// Forces the next `prepare` to rebuild and re-upload, e.g. after the
    /// backend lost its buffers.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
        self.uploaded = false;
    }

    /// Returns `true` when geometry was rebuilt.
    pub fn prepare(&mut self, model: &ViewportModel, backend: &mut dyn GpuBackend) -> bool {
        let rebuilt = self.cache.ensure(model);
        if rebuilt || !self.uploaded {
            let (line_slot, quad_slot) = self.slots();
            let geometry = self.cache.geometry();
            backend.write_vertices(line_slot, &geometry.lines);
            backend.write_vertices(quad_slot, &geometry.quads);
            self.uploaded = true;
        }
        rebuilt
    }

    pub fn projection(&self, model: &ViewportModel) -> PaneProjection {
        match self.kind {
            PaneKind::Price => PaneProjection::price(model.visible_bars(), &model.visible_price_range()),
            PaneKind::Volume => PaneProjection::volume(model.visible_bars(), model.max_visible_volume()),
        }
    }

    /// Draws the pane at `(0, pane_y_offset, pane_width, pane_height)`.
    /// Returns whether anything was drawn.
    pub fn render(
        &self,
        model: &ViewportModel,
        pane_width: f32,
        pane_height: f32,
        pane_y_offset: f32,
        backend: &mut dyn GpuBackend,
    ) -> bool {
        let geometry = self.cache.geometry();
        if !model.has_data() || geometry.is_empty() || pane_width <= 0.0 || pane_height <= 0.0 {
            return false;
        }

        let rect = PaneRect { x: 0.0, y_offset: pane_y_offset, width: pane_width, height: pane_height };
        backend.set_pane(rect, self.projection(model).matrix());

        let (line_slot, quad_slot) = self.slots();
        if geometry.line_vertex_count() > 0 {
            backend.draw(line_slot, Topology::Lines, geometry.line_vertex_count() as u32);
        }
        if geometry.quad_vertex_count() > 0 {
            backend.draw(quad_slot, Topology::Quads, geometry.quad_vertex_count() as u32);
        }
        backend.clear_pane();

        log_trace!(
            LogComponent::Infrastructure("PaneRenderer"),
            "{:?} pane drawn at y={} ({}x{})",
            self.kind,
            pane_y_offset,
            pane_width,
            pane_height
        );
        true
    }
}
