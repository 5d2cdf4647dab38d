//! Candlestick + volume chart core: viewport model, GPU pane geometry,
//! 2D overlay and pointer/keyboard interaction, independent of any window
//! system.

use crate::domain::logging::{LogComponent, LogLevel, get_logger};
use once_cell::sync::OnceCell;

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
pub mod time_utils;

pub use application::{ChartKey, InputEvent, InteractionController, LoadCoordinator, PointerButton, Redraw};
pub use domain::chart::{ChartMode, StyleProvider, ViewportModel};
pub use domain::errors::AppError;
pub use domain::events::ChartEvent;
pub use domain::market_data::{Bar, BarSeries, SeriesIngestor};
pub use infrastructure::{ChartConfig, MapStyleProvider};
pub use presentation::CandleChartWidget;

static INITIALIZED: OnceCell<LogLevel> = OnceCell::new();

/// Installs the stderr logger and the system clock. Only the first call
/// has an effect; later calls return the level already in force.
pub fn initialize(min_level: LogLevel) -> LogLevel {
    *INITIALIZED.get_or_init(|| {
        domain::logging::init_time_provider(Box::new(infrastructure::services::SystemTimeProvider::new()));
        domain::logging::init_logger(Box::new(infrastructure::services::ConsoleLogger::new(min_level)));
        get_logger().info(
            LogComponent::Presentation("Initialize"),
            &format!("🚀 Chart core initialized (log level {})", min_level),
        );
        min_level
    })
}
