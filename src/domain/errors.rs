use derive_more::Display;

/// Errors surfaced at the edges of the chart core.
///
/// Viewport, geometry and interaction code recovers locally and never
/// returns these; only ingestion, configuration and GPU setup do.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum AppError {
    #[display(fmt = "Validation Error: {}", _0)]
    ValidationError(String),
    #[display(fmt = "Style Error: {}", _0)]
    StyleError(String),
    #[display(fmt = "Config Error: {}", _0)]
    ConfigError(String),
    #[display(fmt = "Rendering Error: {}", _0)]
    RenderingError(String),
    #[display(fmt = "Data Load Error: {}", _0)]
    DataLoadError(String),
}

impl std::error::Error for AppError {}

pub type IngestResult<T> = Result<T, AppError>;
pub type RenderingResult<T> = Result<T, AppError>;
