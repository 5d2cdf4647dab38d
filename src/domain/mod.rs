//! Domain layer: market data, the chart viewport model, events, logging and errors.
//! Nothing here depends on a GPU or a windowing toolkit.

pub mod chart;
pub mod errors;
pub mod events;
pub mod logging;
pub mod market_data;
