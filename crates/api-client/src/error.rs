use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request to {url} failed with status {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Failed to deserialize the API response from {url}: {message}")]
    Deserialization { url: String, message: String },

    #[error("Invalid request header: {0}")]
    InvalidHeader(String),

    #[error("API health check failed: {0}")]
    Unhealthy(String),
}
