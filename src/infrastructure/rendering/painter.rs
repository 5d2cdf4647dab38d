//! Retained 2D drawing surface the overlay paints through.

use crate::domain::chart::{Color, GradientDirection, PenStyle, ScreenPoint, ScreenRect};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fill {
    Solid(Color),
    LinearGradient { from: Color, to: Color, direction: GradientDirection },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pen {
    pub color: Color,
    pub width: f32,
    pub style: PenStyle,
}

impl Pen {
    pub fn solid(color: Color, width: f32) -> Self {
        Self { color, width, style: PenStyle::Solid }
    }
}

/// Horizontal placement inside the text rect; vertical is always centred
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub color: Color,
    /// Point size
    pub size: f32,
    pub bold: bool,
    pub align: TextAlign,
}

/// Host-provided 2D painter: QPainter, a canvas context, a tiny-skia pixmap.
pub trait Painter {
    fn fill_rect(&mut self, rect: ScreenRect, fill: &Fill);
    fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint, pen: &Pen);
    fn draw_rect(&mut self, rect: ScreenRect, fill: Option<&Fill>, border: Option<&Pen>, corner_radius: f32);
    fn draw_text(&mut self, rect: ScreenRect, text: &str, style: &TextStyle);
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    FillRect { rect: ScreenRect, fill: Fill },
    Line { from: ScreenPoint, to: ScreenPoint, pen: Pen },
    Rect { rect: ScreenRect, fill: Option<Fill>, border: Option<Pen>, corner_radius: f32 },
    Text { rect: ScreenRect, text: String, style: TextStyle },
}

/// Painter that only records what it was asked to draw
#[derive(Debug, Clone, Default)]
pub struct RecordingPainter {
    pub commands: Vec<PaintCommand>,
}

impl RecordingPainter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                PaintCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn lines(&self) -> Vec<(ScreenPoint, ScreenPoint, Pen)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                PaintCommand::Line { from, to, pen } => Some((*from, *to, *pen)),
                _ => None,
            })
            .collect()
    }

    pub fn text_rect(&self, needle: &str) -> Option<ScreenRect> {
        self.commands.iter().find_map(|c| match c {
            PaintCommand::Text { rect, text, .. } if text == needle => Some(*rect),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Painter for RecordingPainter {
    fn fill_rect(&mut self, rect: ScreenRect, fill: &Fill) {
        self.commands.push(PaintCommand::FillRect { rect, fill: *fill });
    }

    fn draw_line(&mut self, from: ScreenPoint, to: ScreenPoint, pen: &Pen) {
        self.commands.push(PaintCommand::Line { from, to, pen: *pen });
    }

    fn draw_rect(&mut self, rect: ScreenRect, fill: Option<&Fill>, border: Option<&Pen>, corner_radius: f32) {
        self.commands.push(PaintCommand::Rect {
            rect,
            fill: fill.copied(),
            border: border.copied(),
            corner_radius,
        });
    }

    fn draw_text(&mut self, rect: ScreenRect, text: &str, style: &TextStyle) {
        self.commands.push(PaintCommand::Text { rect, text: text.to_string(), style: *style });
    }
}
