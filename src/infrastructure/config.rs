use crate::domain::chart::{MIN_VISIBLE_BARS, ViewportSettings};
use crate::domain::errors::AppError;
use crate::domain::logging::{LogComponent, get_logger};
use serde::{Deserialize, Serialize};

/// Widget tunables. Styling lives in the style provider, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    /// Bars moved per Left/Right key press
    pub scroll_speed: i64,
    pub initial_visible_bars: usize,
    pub price_padding_factor: f64,
    pub time_axis_height: f32,
    pub pane_separator_height: f32,
    /// Target vertical pixels per price grid line
    pub price_label_spacing: f32,
    pub display_utc_offset_minutes: i32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            scroll_speed: 10,
            initial_visible_bars: 100,
            price_padding_factor: 1.1,
            time_axis_height: 30.0,
            pane_separator_height: 5.0,
            price_label_spacing: 75.0,
            display_utc_offset_minutes: 0,
        }
    }
}

const MAX_OFFSET_MINUTES: i32 = 24 * 60;

impl ChartConfig {
    /// Parses JSON, then repairs out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self, AppError> {
        let config: ChartConfig =
            serde_json::from_str(json).map_err(|e| AppError::ConfigError(format!("invalid chart config: {e}")))?;
        Ok(config.validated())
    }

    /// Replaces every out-of-range field with its default, logging a warning.
    pub fn validated(mut self) -> Self {
        let defaults = ChartConfig::default();
        let mut repaired = Vec::new();

        if self.scroll_speed <= 0 {
            self.scroll_speed = defaults.scroll_speed;
            repaired.push("scroll_speed");
        }
        if self.initial_visible_bars < MIN_VISIBLE_BARS {
            self.initial_visible_bars = defaults.initial_visible_bars;
            repaired.push("initial_visible_bars");
        }
        if !(self.price_padding_factor.is_finite() && self.price_padding_factor > 0.0) {
            self.price_padding_factor = defaults.price_padding_factor;
            repaired.push("price_padding_factor");
        }
        if !(self.time_axis_height.is_finite() && self.time_axis_height >= 0.0) {
            self.time_axis_height = defaults.time_axis_height;
            repaired.push("time_axis_height");
        }
        if !(self.pane_separator_height.is_finite() && self.pane_separator_height >= 0.0) {
            self.pane_separator_height = defaults.pane_separator_height;
            repaired.push("pane_separator_height");
        }
        if !(self.price_label_spacing.is_finite() && self.price_label_spacing > 0.0) {
            self.price_label_spacing = defaults.price_label_spacing;
            repaired.push("price_label_spacing");
        }
        if self.display_utc_offset_minutes.unsigned_abs() >= MAX_OFFSET_MINUTES.unsigned_abs() {
            self.display_utc_offset_minutes = defaults.display_utc_offset_minutes;
            repaired.push("display_utc_offset_minutes");
        }

        if !repaired.is_empty() {
            get_logger().warn(
                LogComponent::Infrastructure("Config"),
                &format!("⚠️ Reset out-of-range settings to defaults: {}", repaired.join(", ")),
            );
        }
        self
    }

    pub fn viewport_settings(&self) -> ViewportSettings {
        ViewportSettings {
            initial_visible_bars: self.initial_visible_bars,
            price_padding_factor: self.price_padding_factor,
        }
    }

    pub fn display_offset(&self) -> chrono::FixedOffset {
        crate::time_utils::display_offset(self.display_utc_offset_minutes)
    }
}
