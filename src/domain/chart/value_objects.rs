use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

/// Smallest number of bars the horizontal window may span
pub const MIN_VISIBLE_BARS: usize = 10;

/// Value Object - mutually exclusive interaction mode
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter, EnumString, AsRefStr, Serialize, Deserialize,
)]
pub enum ChartMode {
    #[default]
    #[display(fmt = "Cursor")]
    #[strum(serialize = "cursor", ascii_case_insensitive)]
    Cursor,
    #[display(fmt = "Marker")]
    #[strum(serialize = "marker", ascii_case_insensitive)]
    Marker,
}

/// Value Object - pointer position in widget pixels, top-down
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Value Object - axis-aligned rectangle in widget pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle spanned by two corners given in any order
    pub fn from_corners(a: ScreenPoint, b: ScreenPoint) -> Self {
        Self::new(a.x.min(b.x), a.y.min(b.y), (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }
}

/// Value Object - the vertical price window of the price pane.
///
/// Both the GPU projection and every overlay label are placed through this
/// one pair, so label positions always agree with drawn geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceRange {
    pub min_display: f64,
    pub display_range: f64,
}

impl PriceRange {
    pub fn new(min_display: f64, display_range: f64) -> Self {
        Self { min_display, display_range }
    }

    pub fn max_display(&self) -> f64 {
        self.min_display + self.display_range
    }

    /// Screen Y (top-down) of `price` inside a pane starting at `pane_top`.
    pub fn price_to_y(&self, price: f64, pane_top: f32, pane_height: f32) -> f32 {
        let normalized = (price - self.min_display) / self.display_range;
        pane_top + ((1.0 - normalized) * pane_height as f64) as f32
    }

    /// Inverse of [`price_to_y`](Self::price_to_y).
    pub fn y_to_price(&self, y: f32, pane_top: f32, pane_height: f32) -> f64 {
        if pane_height <= 0.0 {
            return self.min_display;
        }
        let normalized = 1.0 - ((y - pane_top) / pane_height) as f64;
        self.min_display + normalized * self.display_range
    }
}

/// Value Object - Color
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Packed `0xAARRGGBB`
    pub const fn from_argb(argb: u32) -> Self {
        let a = ((argb >> 24) & 0xFF) as f32 / 255.0;
        let r = ((argb >> 16) & 0xFF) as f32 / 255.0;
        let g = ((argb >> 8) & 0xFF) as f32 / 255.0;
        let b = (argb & 0xFF) as f32 / 255.0;
        Self::new(r, g, b, a)
    }

    /// Parses `#RRGGBB` or alpha-first `#AARRGGBB`.
    pub fn parse_hex(text: &str) -> Option<Self> {
        let digits = text.trim().strip_prefix('#')?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let value = u32::from_str_radix(digits, 16).ok()?;
        match digits.len() {
            6 => Some(Self::from_argb(0xFF00_0000 | value)),
            8 => Some(Self::from_argb(value)),
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        format!(
            "#{:02x}{:02x}{:02x}{:02x}",
            channel(self.a),
            channel(self.r),
            channel(self.g),
            channel(self.b)
        )
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Stable identity for cache keys
    pub fn to_bits(&self) -> [u32; 4] {
        [self.r.to_bits(), self.g.to_bits(), self.b.to_bits(), self.a.to_bits()]
    }
}

/// Value Object - dash pattern of a stroked line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumIter, EnumString, AsRefStr, Serialize)]
pub enum PenStyle {
    #[default]
    #[display(fmt = "Solid")]
    #[strum(serialize = "Solid", serialize = "SolidLine")]
    Solid,
    #[display(fmt = "Dash")]
    #[strum(serialize = "Dash", serialize = "DashLine")]
    Dash,
    #[display(fmt = "Dot")]
    #[strum(serialize = "Dot", serialize = "DotLine")]
    Dot,
    #[display(fmt = "DashDot")]
    #[strum(serialize = "DashDot", serialize = "DashDotLine")]
    DashDot,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumIter, EnumString, AsRefStr, Serialize)]
pub enum BackgroundMode {
    #[default]
    #[display(fmt = "Solid")]
    Solid,
    #[display(fmt = "Gradient")]
    Gradient,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumIter, EnumString, AsRefStr, Serialize)]
pub enum GradientDirection {
    #[default]
    #[display(fmt = "Vertical")]
    Vertical,
    #[display(fmt = "Horizontal")]
    Horizontal,
}

/// Value Object - tunables of the viewport model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSettings {
    pub initial_visible_bars: usize,
    pub price_padding_factor: f64,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self { initial_visible_bars: 100, price_padding_factor: 1.1 }
    }
}

/// Value Object - pixel split of the widget into price pane, volume pane
/// and time axis strip.
///
/// Screen coordinates are top-down. The GPU pane offsets are bottom-up and
/// are exposed separately through [`price_gpu_offset`](Self::price_gpu_offset)
/// and [`volume_gpu_offset`](Self::volume_gpu_offset).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartLayout {
    pub width: f32,
    pub height: f32,
    pub time_axis_height: f32,
    pub separator_height: f32,
    pub price_top: f32,
    pub price_height: f32,
    pub volume_top: f32,
    pub volume_height: f32,
}

impl ChartLayout {
    pub fn compute(
        width: f32,
        height: f32,
        volume_pane_ratio: f64,
        time_axis_height: f32,
        separator_height: f32,
    ) -> Self {
        let width = width.max(0.0);
        let height = height.max(0.0);
        let chart_area = (height - time_axis_height).max(0.0);
        let volume_height = (chart_area as f64 * volume_pane_ratio).floor() as f32;
        let price_height = (chart_area - volume_height - separator_height).max(0.0);
        Self {
            width,
            height,
            time_axis_height,
            separator_height,
            price_top: 0.0,
            price_height,
            volume_top: (height - time_axis_height - volume_height).max(0.0),
            volume_height,
        }
    }

    /// Height above the time axis strip
    pub fn chart_area_height(&self) -> f32 {
        (self.height - self.time_axis_height).max(0.0)
    }

    pub fn volume_gpu_offset(&self) -> f32 {
        self.time_axis_height
    }

    pub fn price_gpu_offset(&self) -> f32 {
        self.time_axis_height + self.volume_height + self.separator_height
    }

    /// Inside the widget and above the time axis
    pub fn in_chart_area(&self, point: ScreenPoint) -> bool {
        point.x >= 0.0 && point.x < self.width && point.y >= 0.0 && point.y < self.chart_area_height()
    }

    /// Half-open `[price_top, price_top + price_height)`
    pub fn in_price_pane(&self, y: f32) -> bool {
        y >= self.price_top && y < self.price_top + self.price_height
    }
}
