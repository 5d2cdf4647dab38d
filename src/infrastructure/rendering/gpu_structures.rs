use crate::domain::chart::{Color, PriceRange};
use bytemuck::{Pod, Zeroable};

/// Headroom above the tallest volume bar
pub const VOLUME_HEADROOM: f64 = 1.05;

/// Vertex in pane data space: x is the bar slot, y a price or a volume
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ChartVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl ChartVertex {
    pub fn new(x: f32, y: f32, color: Color) -> Self {
        Self { position: [x, y], color: color.to_array() }
    }

    pub fn x(&self) -> f32 {
        self.position[0]
    }

    pub fn y(&self) -> f32 {
        self.position[1]
    }

    /// Vertex buffer descriptor for wgpu
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
            wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ChartVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Per-pane uniform block, one `mat4x4<f32>`
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PaneUniforms {
    pub view_proj: [[f32; 4]; 4],
}

/// Orthographic data window of one pane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaneProjection {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

impl PaneProjection {
    /// x in `[0, visible_bars]`, y over the displayed price window.
    pub fn price(visible_bars: usize, range: &PriceRange) -> Self {
        Self {
            left: 0.0,
            right: visible_bars.max(1) as f64,
            bottom: range.min_display,
            top: range.max_display(),
        }
    }

    /// x in `[0, visible_bars]`, y in `[0, max_volume * 1.05]`. A slice with
    /// no volume gets a unit window.
    pub fn volume(visible_bars: usize, max_volume: f64) -> Self {
        let top = if max_volume > 0.0 { max_volume * VOLUME_HEADROOM } else { 1.0 };
        Self { left: 0.0, right: visible_bars.max(1) as f64, bottom: 0.0, top }
    }

    /// Column-major `glOrtho(left, right, bottom, top, -1, 1)`.
    pub fn matrix(&self) -> [[f32; 4]; 4] {
        let width = self.right - self.left;
        let height = self.top - self.bottom;
        let sx = (2.0 / width) as f32;
        let sy = (2.0 / height) as f32;
        let tx = (-(self.right + self.left) / width) as f32;
        let ty = (-(self.top + self.bottom) / height) as f32;
        [
            [sx, 0.0, 0.0, 0.0],
            [0.0, sy, 0.0, 0.0],
            [0.0, 0.0, -1.0, 0.0],
            [tx, ty, 0.0, 1.0],
        ]
    }

    /// Where a data-space point lands in normalised device coordinates
    pub fn to_ndc(&self, x: f64, y: f64) -> (f64, f64) {
        let nx = 2.0 * (x - self.left) / (self.right - self.left) - 1.0;
        let ny = 2.0 * (y - self.bottom) / (self.top - self.bottom) - 1.0;
        (nx, ny)
    }
}

/// Triangle-list indices for `quad_count` quads laid out as 4 consecutive
/// vertices each
pub fn quad_indices(quad_count: usize) -> Vec<u32> {
    (0..quad_count as u32)
        .flat_map(|q| {
            let base = q * 4;
            [base, base + 1, base + 2, base, base + 2, base + 3]
        })
        .collect()
}
