//! GPU side of the chart: cached pane geometry, the pane renderers and the
//! backends they draw through.

pub mod geometry;
pub mod pane;
pub mod performance;
pub mod wgpu_backend;

pub use geometry::{
    GeometryBuilder, GeometryCache, GeometryKey, PaneGeometry, PriceGeometryBuilder, VolumeGeometryBuilder,
};
pub use pane::{BufferSlot, GpuBackend, GpuCommand, PaneKind, PaneRect, PaneRenderer, RecordingBackend, Topology};
pub use performance::{FrameStats, FrameTimer};
pub use wgpu_backend::WgpuBackend;
