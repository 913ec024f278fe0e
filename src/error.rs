use crate::config::ConfigError;
use crate::engine::AllocationError;
use crate::report::ReportError;
use crate::source::SourceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Event source error: {0}")]
    Source(#[from] SourceError),
    #[error("Allocation failed: {0}")]
    Allocation(#[from] AllocationError),
    #[error("Report error: {0}")]
    Report(#[from] ReportError),
}
