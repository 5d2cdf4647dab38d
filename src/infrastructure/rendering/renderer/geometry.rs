//! Per-pane geometry: vertex lists built from the visible slice, cached
//! until the slice identity or the colours they depend on change.

use crate::domain::chart::{Color, StyleState, ViewportModel};
use crate::domain::market_data::Bar;
use crate::domain::logging::LogComponent;
use crate::infrastructure::rendering::gpu_structures::ChartVertex;
use crate::log_debug;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Inner body/volume margin inside a bar slot
const BODY_INSET: f32 = 0.1;
/// Slices at least this long are split across threads with `parallel`
#[cfg(feature = "parallel")]
const PARALLEL_THRESHOLD: usize = 4096;
#[cfg(feature = "parallel")]
const PARALLEL_CHUNK: usize = 1024;

/// Line-list and quad-list vertices of one pane
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaneGeometry {
    /// Pairs of vertices, one segment each
    pub lines: Vec<ChartVertex>,
    /// Four vertices per quad, in outline order
    pub quads: Vec<ChartVertex>,
}

impl PaneGeometry {
    pub fn with_capacity(lines: usize, quads: usize) -> Self {
        Self { lines: Vec::with_capacity(lines), quads: Vec::with_capacity(quads) }
    }

    pub fn line_vertex_count(&self) -> usize {
        self.lines.len()
    }

    pub fn quad_vertex_count(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.quads.is_empty()
    }

    fn push_line(&mut self, from: (f32, f32), to: (f32, f32), color: Color) {
        self.lines.push(ChartVertex::new(from.0, from.1, color));
        self.lines.push(ChartVertex::new(to.0, to.1, color));
    }

    fn push_quad(&mut self, x0: f32, x1: f32, y0: f32, y1: f32, color: Color) {
        self.quads.extend_from_slice(&[
            ChartVertex::new(x0, y0, color),
            ChartVertex::new(x1, y0, color),
            ChartVertex::new(x1, y1, color),
            ChartVertex::new(x0, y1, color),
        ]);
    }

    #[cfg(feature = "parallel")]
    fn concat(parts: Vec<PaneGeometry>) -> Self {
        let lines = parts.iter().map(|p| p.lines.len()).sum();
        let quads = parts.iter().map(|p| p.quads.len()).sum();
        parts.into_iter().fold(Self::with_capacity(lines, quads), |mut acc, part| {
            acc.lines.extend(part.lines);
            acc.quads.extend(part.quads);
            acc
        })
    }
}

/// Turns a visible slice into pane geometry. Vertex x is the slot index
/// within the slice, so the projection alone places the window.
pub trait GeometryBuilder: Sync {
    fn build_bar(&self, slot: usize, bar: &Bar, style: &StyleState, out: &mut PaneGeometry);

    /// Colours the output depends on, in a fixed order
    fn relevant_colors(&self, style: &StyleState) -> Vec<Color>;

    fn build(&self, slice: &[Bar], style: &StyleState) -> PaneGeometry {
        #[cfg(feature = "parallel")]
        {
            if slice.len() >= PARALLEL_THRESHOLD {
                let parts: Vec<PaneGeometry> = slice
                    .par_chunks(PARALLEL_CHUNK)
                    .enumerate()
                    .map(|(chunk_index, chunk)| {
                        let mut part = PaneGeometry::with_capacity(chunk.len() * 2, chunk.len() * 4);
                        for (offset, bar) in chunk.iter().enumerate() {
                            self.build_bar(chunk_index * PARALLEL_CHUNK + offset, bar, style, &mut part);
                        }
                        part
                    })
                    .collect();
                return PaneGeometry::concat(parts);
            }
        }

        let mut geometry = PaneGeometry::with_capacity(slice.len() * 2, slice.len() * 4);
        for (slot, bar) in slice.iter().enumerate() {
            self.build_bar(slot, bar, style, &mut geometry);
        }
        geometry
    }
}

/// Wicks and doji ticks as lines, bodies as quads
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceGeometryBuilder;

impl GeometryBuilder for PriceGeometryBuilder {
    fn build_bar(&self, slot: usize, bar: &Bar, style: &StyleState, out: &mut PaneGeometry) {
        let x = slot as f32;
        let is_up = bar.is_up();
        let wick = style.wick_color(is_up);
        let open = bar.open() as f32;
        let close = bar.close() as f32;

        out.push_line((x + 0.5, bar.low() as f32), (x + 0.5, bar.high() as f32), wick);
        if bar.is_doji() {
            out.push_line((x + BODY_INSET, open), (x + 1.0 - BODY_INSET, open), wick);
        } else {
            out.push_quad(x + BODY_INSET, x + 1.0 - BODY_INSET, open, close, style.body_color(is_up));
        }
    }

    fn relevant_colors(&self, style: &StyleState) -> Vec<Color> {
        vec![style.up_candle, style.down_candle, style.up_wick, style.down_wick]
    }
}

/// One translucent quad per bar from zero to the bar's volume
#[derive(Debug, Clone, Copy, Default)]
pub struct VolumeGeometryBuilder;

impl GeometryBuilder for VolumeGeometryBuilder {
    fn build_bar(&self, slot: usize, bar: &Bar, style: &StyleState, out: &mut PaneGeometry) {
        let x = slot as f32;
        let color = style.volume_color(bar.is_up());
        out.push_quad(x + BODY_INSET, x + 1.0 - BODY_INSET, 0.0, bar.volume() as f32, color);
    }

    fn relevant_colors(&self, style: &StyleState) -> Vec<Color> {
        vec![style.up_volume, style.down_volume]
    }
}

/// Identity of the inputs a pane's geometry was built from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GeometryKey {
    pub generation: u64,
    pub start_bar: usize,
    pub visible_bars: usize,
    pub colors: Vec<[u32; 4]>,
}

impl GeometryKey {
    pub fn for_model<B: GeometryBuilder + ?Sized>(builder: &B, model: &ViewportModel) -> Self {
        Self {
            generation: model.series().generation(),
            start_bar: model.start_bar(),
            visible_bars: model.visible_bars(),
            colors: builder.relevant_colors(model.style()).iter().map(Color::to_bits).collect(),
        }
    }
}

/// Builder plus its last output. `ensure` rebuilds only on a key change.
#[derive(Debug, Clone, Default)]
pub struct GeometryCache<B> {
    builder: B,
    key: Option<GeometryKey>,
    geometry: PaneGeometry,
    rebuilds: u64,
}

impl<B: GeometryBuilder> GeometryCache<B> {
    pub fn new(builder: B) -> Self {
        Self { builder, key: None, geometry: PaneGeometry::default(), rebuilds: 0 }
    }

    /// Returns `true` when the geometry was rebuilt.
    pub fn ensure(&mut self, model: &ViewportModel) -> bool {
        let key = GeometryKey::for_model(&self.builder, model);
        if self.key.as_ref() == Some(&key) {
            return false;
        }
        self.geometry = self.builder.build(model.visible_slice(), model.style());
        self.rebuilds += 1;
        log_debug!(
            LogComponent::Infrastructure("Geometry"),
            "🔧 Rebuilt geometry: {} line / {} quad vertices (start {}, visible {})",
            self.geometry.line_vertex_count(),
            self.geometry.quad_vertex_count(),
            key.start_bar,
            key.visible_bars
        );
        self.key = Some(key);
        true
    }

    pub fn geometry(&self) -> &PaneGeometry {
        &self.geometry
    }

    pub fn key(&self) -> Option<&GeometryKey> {
        self.key.as_ref()
    }

    pub fn rebuild_count(&self) -> u64 {
        self.rebuilds
    }

    pub fn invalidate(&mut self) {
        self.key = None;
    }
}
