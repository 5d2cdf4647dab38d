pub mod gpu_structures;
pub mod overlay;
pub mod painter;
pub mod renderer;

pub use gpu_structures::*;
pub use overlay::{OverlayRenderer, SelectionSummary, selection_summary};
pub use painter::{Fill, PaintCommand, Painter, Pen, RecordingPainter, TextAlign, TextStyle};
pub use renderer::{
    FrameStats, FrameTimer, GpuBackend, GpuCommand, PaneKind, PaneRect, PaneRenderer, RecordingBackend, WgpuBackend,
};
