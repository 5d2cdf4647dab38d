//! In-memory preference store backing the [`StyleProvider`] interface.

use crate::domain::chart::{StyleKey, StyleProvider, StyleValue};
use crate::domain::errors::AppError;
use crate::domain::logging::{LogComponent, get_logger};
use std::collections::HashMap;

/// String-keyed style values, typically loaded from a JSON settings file.
/// Unknown keys are kept but never read by the chart.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MapStyleProvider {
    values: HashMap<String, StyleValue>,
}

impl MapStyleProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with every documented default
    pub fn with_defaults() -> Self {
        let mut store = Self::new();
        store.restore_defaults();
        store
    }

    /// Parses a flat JSON object such as `{"colors/up_candle": "#ff00ff00"}`.
    pub fn from_json_str(json: &str) -> Result<Self, AppError> {
        let values: HashMap<String, StyleValue> =
            serde_json::from_str(json).map_err(|e| AppError::StyleError(format!("invalid style JSON: {e}")))?;

        let unknown = values.keys().filter(|key| key.parse::<StyleKey>().is_err()).count();
        if unknown > 0 {
            get_logger().warn(
                LogComponent::Infrastructure("StyleStore"),
                &format!("⚠️ {} unrecognised style keys ignored", unknown),
            );
        }
        Ok(Self { values })
    }

    pub fn to_json_string(&self) -> Result<String, AppError> {
        serde_json::to_string(&self.values).map_err(|e| AppError::StyleError(e.to_string()))
    }

    pub fn set(&mut self, key: StyleKey, value: StyleValue) {
        self.values.insert(key.name().to_string(), value);
    }

    pub fn remove(&mut self, key: StyleKey) -> Option<StyleValue> {
        self.values.remove(key.name())
    }

    /// Drops every stored value and writes the defaults back.
    pub fn restore_defaults(&mut self) {
        self.values.clear();
        for (key, value) in StyleKey::defaults() {
            self.values.insert(key.name().to_string(), value);
        }
        get_logger().info(LogComponent::Infrastructure("StyleStore"), "🎨 Style defaults restored");
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl StyleProvider for MapStyleProvider {
    fn get(&self, key: &str) -> Option<StyleValue> {
        self.values.get(key).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chart::{Color, PenStyle, StyleState};

    #[test]
    fn json_values_reach_style_state() {
        let store = MapStyleProvider::from_json_str(
            r##"{"colors/up_candle": "#ff00ff00", "props/crosshair_width": 3,
                "props/crosshair_style": "DotLine", "other/volume_pane_ratio": 0.4}"##,
        )
        .unwrap();
        let style = StyleState::load(&store);
        assert_eq!(style.up_candle, Color::from_argb(0xff00ff00));
        assert_eq!(style.crosshair.width, 3);
        assert_eq!(style.crosshair.pen, PenStyle::Dot);
        assert!((style.volume_pane_ratio - 0.4).abs() < 1e-9);
    }

    #[test]
    fn restore_defaults_matches_default_provider() {
        let mut store = MapStyleProvider::new();
        store.set(StyleKey::UpCandle, StyleValue::Text("#ff123456".into()));
        store.restore_defaults();
        assert_eq!(store.len(), StyleKey::defaults().count());
        assert_eq!(StyleState::load(&store), StyleState::default());
    }

    #[test]
    fn remove_falls_back_to_default() {
        let mut store = MapStyleProvider::with_defaults();
        store.set(StyleKey::DownCandle, StyleValue::Text("#ff0000ff".into()));
        assert_eq!(StyleState::load(&store).down_candle, Color::from_argb(0xff0000ff));
        store.remove(StyleKey::DownCandle);
        assert_eq!(StyleState::load(&store).down_candle, StyleState::default().down_candle);
    }

    #[test]
    fn rejects_non_object_json() {
        assert!(matches!(MapStyleProvider::from_json_str("[1, 2]"), Err(AppError::StyleError(_))));
    }
}
