pub mod config;
pub mod rendering;
pub mod services;
pub mod style_store;

pub use config::ChartConfig;
pub use services::{ConsoleLogger, SystemTimeProvider};
pub use style_store::MapStyleProvider;
