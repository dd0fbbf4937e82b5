use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Page fetch failed for {url} after {attempts} attempts: {source}")]
    FetchError {
        url: String,
        attempts: u32,
        #[source]
        source: Box<TrackerError>,
    },

    #[error("Timed out after {seconds}s waiting for {stage}")]
    TimeoutError { stage: &'static str, seconds: u64 },

    #[error("Browser error: {0}")]
    BrowserError(#[from] chromiumoxide::error::CdpError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Record store {operation} failed with status {status}: {body}")]
    StoreError {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("No record found with URL '{url}'")]
    RecordNotFound { url: String },
}

pub type Result<T> = std::result::Result<T, TrackerError>;
