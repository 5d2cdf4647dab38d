use super::value_objects::{BackgroundMode, Color, GradientDirection, PenStyle};
use crate::domain::logging::{LogComponent, get_logger};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{AsRefStr, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Known keys of the style namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, AsRefStr, IntoStaticStr)]
pub enum StyleKey {
    #[strum(serialize = "colors/up_candle")]
    UpCandle,
    #[strum(serialize = "colors/down_candle")]
    DownCandle,
    #[strum(serialize = "colors/up_wick")]
    UpWick,
    #[strum(serialize = "colors/down_wick")]
    DownWick,
    #[strum(serialize = "colors/up_volume")]
    UpVolume,
    #[strum(serialize = "colors/down_volume")]
    DownVolume,
    #[strum(serialize = "lines/crosshair")]
    CrosshairColor,
    #[strum(serialize = "lines/price_grid")]
    PriceGridColor,
    #[strum(serialize = "lines/time_grid")]
    TimeGridColor,
    #[strum(serialize = "props/crosshair_width")]
    CrosshairWidth,
    #[strum(serialize = "props/crosshair_style")]
    CrosshairStyle,
    #[strum(serialize = "props/price_grid_width")]
    PriceGridWidth,
    #[strum(serialize = "props/price_grid_style")]
    PriceGridStyle,
    #[strum(serialize = "props/time_grid_width")]
    TimeGridWidth,
    #[strum(serialize = "props/time_grid_style")]
    TimeGridStyle,
    #[strum(serialize = "background/mode")]
    BackgroundMode,
    #[strum(serialize = "background/color1")]
    BackgroundColor1,
    #[strum(serialize = "background/color2")]
    BackgroundColor2,
    #[strum(serialize = "background/gradient_direction")]
    GradientDirection,
    #[strum(serialize = "other/volume_pane_ratio")]
    VolumePaneRatio,
}

impl StyleKey {
    pub fn name(&self) -> &'static str {
        (*self).into()
    }

    /// Documented default, in the form a provider stores it
    pub fn default_value(&self) -> StyleValue {
        let text = |s: &str| StyleValue::Text(s.to_string());
        match self {
            StyleKey::UpCandle => text("#ff00cc00"),
            StyleKey::DownCandle => text("#ffcc0000"),
            StyleKey::UpWick | StyleKey::DownWick => text("#ffb4b4b4"),
            StyleKey::UpVolume => text("#b400cc00"),
            StyleKey::DownVolume => text("#b4cc0000"),
            StyleKey::CrosshairColor => text("#96dcdcdc"),
            StyleKey::PriceGridColor | StyleKey::TimeGridColor => text("#ff505050"),
            StyleKey::CrosshairWidth | StyleKey::PriceGridWidth | StyleKey::TimeGridWidth => {
                StyleValue::Int(1)
            }
            StyleKey::CrosshairStyle | StyleKey::TimeGridStyle => text("DashLine"),
            StyleKey::PriceGridStyle => text("DotLine"),
            StyleKey::BackgroundMode => text("Solid"),
            StyleKey::BackgroundColor1 => text("#ff191919"),
            StyleKey::BackgroundColor2 => text("#ff373737"),
            StyleKey::GradientDirection => text("Vertical"),
            StyleKey::VolumePaneRatio => StyleValue::Float(0.25),
        }
    }

    pub fn defaults() -> impl Iterator<Item = (StyleKey, StyleValue)> {
        StyleKey::iter().map(|key| (key, key.default_value()))
    }
}

/// A raw value as a provider hands it out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl StyleValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            StyleValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StyleValue::Int(v) => Some(*v as f64),
            StyleValue::Float(v) => Some(*v),
            StyleValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Key to value source of styling.
///
/// The viewport reads it wholesale at construction and on reload; it is
/// never consulted at draw time.
pub trait StyleProvider {
    fn get(&self, key: &str) -> Option<StyleValue>;
}

/// Provider with no stored values; every key resolves to its default.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultStyleProvider;

impl StyleProvider for DefaultStyleProvider {
    fn get(&self, _key: &str) -> Option<StyleValue> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LineStyle {
    pub color: Color,
    pub width: u32,
    pub pen: PenStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BackgroundStyle {
    pub mode: BackgroundMode,
    pub color1: Color,
    pub color2: Color,
    pub direction: GradientDirection,
}

/// Snapshot of all styling, replaced wholesale on reload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StyleState {
    pub up_candle: Color,
    pub down_candle: Color,
    pub up_wick: Color,
    pub down_wick: Color,
    pub up_volume: Color,
    pub down_volume: Color,
    pub crosshair: LineStyle,
    pub price_grid: LineStyle,
    pub time_grid: LineStyle,
    pub background: BackgroundStyle,
    pub volume_pane_ratio: f64,
}

const WIDTH_RANGE: (u32, u32) = (1, 10);
const RATIO_RANGE: (f64, f64) = (0.05, 0.9);

impl Default for StyleState {
    fn default() -> Self {
        Self::load(&DefaultStyleProvider)
    }
}

impl StyleState {
    /// Reads every key, falling back to the documented default for missing
    /// or unusable values.
    pub fn load(provider: &dyn StyleProvider) -> Self {
        let reader = StyleReader { provider };
        Self {
            up_candle: reader.color(StyleKey::UpCandle),
            down_candle: reader.color(StyleKey::DownCandle),
            up_wick: reader.color(StyleKey::UpWick),
            down_wick: reader.color(StyleKey::DownWick),
            up_volume: reader.color(StyleKey::UpVolume),
            down_volume: reader.color(StyleKey::DownVolume),
            crosshair: LineStyle {
                color: reader.color(StyleKey::CrosshairColor),
                width: reader.width(StyleKey::CrosshairWidth),
                pen: reader.parsed(StyleKey::CrosshairStyle),
            },
            price_grid: LineStyle {
                color: reader.color(StyleKey::PriceGridColor),
                width: reader.width(StyleKey::PriceGridWidth),
                pen: reader.parsed(StyleKey::PriceGridStyle),
            },
            time_grid: LineStyle {
                color: reader.color(StyleKey::TimeGridColor),
                width: reader.width(StyleKey::TimeGridWidth),
                pen: reader.parsed(StyleKey::TimeGridStyle),
            },
            background: BackgroundStyle {
                mode: reader.parsed(StyleKey::BackgroundMode),
                color1: reader.color(StyleKey::BackgroundColor1),
                color2: reader.color(StyleKey::BackgroundColor2),
                direction: reader.parsed(StyleKey::GradientDirection),
            },
            volume_pane_ratio: reader.ratio(StyleKey::VolumePaneRatio),
        }
    }

    pub fn body_color(&self, is_up: bool) -> Color {
        if is_up { self.up_candle } else { self.down_candle }
    }

    pub fn wick_color(&self, is_up: bool) -> Color {
        if is_up { self.up_wick } else { self.down_wick }
    }

    pub fn volume_color(&self, is_up: bool) -> Color {
        if is_up { self.up_volume } else { self.down_volume }
    }
}

struct StyleReader<'a> {
    provider: &'a dyn StyleProvider,
}

impl StyleReader<'_> {
    /// The provider's value if `parse` accepts it, otherwise the key's
    /// table default run through the same `parse`.
    fn resolve<T: Default>(&self, key: StyleKey, parse: impl Fn(&StyleValue) -> Option<T>) -> T {
        let provided = self.provider.get(key.name()).and_then(|value| {
            let parsed = parse(&value);
            if parsed.is_none() {
                get_logger().warn(
                    LogComponent::Domain("Style"),
                    &format!("⚠️ Unusable value {:?} for '{}', using default", value, key.name()),
                );
            }
            parsed
        });
        provided.or_else(|| parse(&key.default_value())).unwrap_or_default()
    }

    fn color(&self, key: StyleKey) -> Color {
        self.resolve(key, |value| value.as_text().and_then(Color::parse_hex))
    }

    fn width(&self, key: StyleKey) -> u32 {
        self.resolve(key, |value| {
            value
                .as_f64()
                .filter(|w| w.is_finite())
                .map(|w| (w.round() as i64).clamp(WIDTH_RANGE.0 as i64, WIDTH_RANGE.1 as i64) as u32)
        })
    }

    fn ratio(&self, key: StyleKey) -> f64 {
        self.resolve(key, |value| {
            value.as_f64().filter(|r| *r > 0.0 && *r < 1.0).map(|r| r.clamp(RATIO_RANGE.0, RATIO_RANGE.1))
        })
    }

    fn parsed<T: FromStr + Default>(&self, key: StyleKey) -> T {
        self.resolve(key, |value| value.as_text().and_then(|s| T::from_str(s.trim()).ok()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Fixed(HashMap<&'static str, StyleValue>);

    impl StyleProvider for Fixed {
        fn get(&self, key: &str) -> Option<StyleValue> {
            self.0.get(key).cloned()
        }
    }

    #[test]
    fn key_names_match_strum_serialisation() {
        for key in StyleKey::iter() {
            assert_eq!(key.name(), key.as_ref());
            assert_eq!(StyleKey::from_str(key.name()).unwrap(), key);
        }
    }

    #[test]
    fn table_defaults_load_to_builtin_defaults() {
        let table = Fixed(StyleKey::defaults().map(|(k, v)| (k.name(), v)).collect());
        assert_eq!(StyleState::load(&table), StyleState::default());
    }

    #[test]
    fn bad_values_fall_back() {
        let provider = Fixed(HashMap::from([
            ("colors/up_candle", StyleValue::Text("green".into())),
            ("props/crosshair_width", StyleValue::Int(40)),
            ("props/crosshair_style", StyleValue::Text("Zigzag".into())),
            ("other/volume_pane_ratio", StyleValue::Float(1.5)),
        ]));
        let style = StyleState::load(&provider);
        let defaults = StyleState::default();
        assert_eq!(style.up_candle, defaults.up_candle);
        assert_eq!(style.crosshair.width, 10);
        assert_eq!(style.crosshair.pen, PenStyle::Dash);
        assert_eq!(style.volume_pane_ratio, 0.25);
    }

    #[test]
    fn fallbacks_come_from_the_key_table() {
        let style = StyleState::default();
        let text = |key: StyleKey| key.default_value().as_text().map(str::to_string).unwrap();
        assert_eq!(Some(style.up_volume), Color::parse_hex(&text(StyleKey::UpVolume)));
        assert_eq!(Some(style.crosshair.color), Color::parse_hex(&text(StyleKey::CrosshairColor)));
        assert_eq!(style.price_grid.pen, PenStyle::from_str(&text(StyleKey::PriceGridStyle)).unwrap());
        assert_eq!(Some(style.volume_pane_ratio), StyleKey::VolumePaneRatio.default_value().as_f64());
        assert_eq!(style.background.color2, Color::from_argb(0xff373737));
    }
}
