use api_client::error::ApiError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("API health check failed: {0}")]
    Unhealthy(#[source] ApiError),

    #[error("Failed to fetch the symbol list: {0}")]
    Symbols(#[source] ApiError),

    #[error("Configured industries matched no company profile: {}", .0.join(", "))]
    UnknownIndustry(Vec<String>),

    #[error("Database error occurred while saving results: {0}")]
    Database(#[from] database::DbError),

    #[error("Sink rejected the results: {0}")]
    Sink(String),

    #[error("Progress bar template error: {0}")]
    ProgressBarTemplate(String),
}

impl From<indicatif::style::TemplateError> for PipelineError {
    fn from(error: indicatif::style::TemplateError) -> Self {
        PipelineError::ProgressBarTemplate(error.to_string())
    }
}
