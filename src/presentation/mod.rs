pub mod chart_widget;

pub use chart_widget::CandleChartWidget;
