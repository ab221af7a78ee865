//! Error taxonomy shared by every domain.
//!
//! - `SchemaError`     : a request or response violated its declared shape
//! - `IdentifyError`   : what an identification attempt can fail with
//! - `UpstreamError`   : the model call failed or returned unusable output
//! - `PermissionError` : geolocation or camera access was refused
//! - `StorageError`    : the favorites blob could not be read or written
//! - `CaptureError`    : an image file or camera frame could not be turned into a data URI
//!
//! None of these are retried. Every failure ends the user action that caused it.

use thiserror::Error;

/// A value failed boundary validation. `field` is a dotted path into the
/// request or response (`taxonomyConfidence.genus`, `interestingFacts`).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{field}: {reason}")]
pub struct SchemaError {
    pub field: String,
    pub reason: String,
}

impl SchemaError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("no API key configured for provider '{0}'")]
    MissingApiKey(String),
    #[error("HTTP request failed: {0}")]
    Http(String),
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("provider returned no text content")]
    EmptyResponse,
    #[error("response is not valid JSON: {0}")]
    Malformed(String),
    #[error("response violates the output schema: {0}")]
    Schema(SchemaError),
}

/// The request URL is dropped from the message: it may carry credentials.
impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        UpstreamError::Http(e.without_url().to_string())
    }
}

#[derive(Debug, Error)]
pub enum IdentifyError {
    #[error("invalid request: {0}")]
    InvalidInput(SchemaError),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("no image selected")]
    NoImageSelected,
    #[error("an identification is already in progress")]
    AlreadyIdentifying,
}

impl IdentifyError {
    /// Message safe to show the user. Upstream detail stays in the log.
    pub fn user_message(&self) -> String {
        match self {
            IdentifyError::InvalidInput(e) => format!("The request could not be sent: {}", e),
            IdentifyError::Upstream(_) => {
                "Could not identify the species. Please try again.".to_string()
            }
            IdentifyError::NoImageSelected => "Select an image first.".to_string(),
            IdentifyError::AlreadyIdentifying => {
                "An identification is already in progress.".to_string()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PermissionError {
    #[error("location access denied: {0}")]
    Geolocation(String),
    #[error("camera access denied: {0}")]
    Camera(String),
    #[error("{0} is not supported on this device")]
    Unsupported(&'static str),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not serialize favorites: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("could not read image file: {0}")]
    Io(#[from] std::io::Error),
    #[error("unsupported image format (expected PNG, JPEG or WEBP)")]
    UnsupportedFormat,
    #[error("image is {size} bytes, the limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },
    #[error("image could not be decoded or encoded: {0}")]
    Image(#[from] image::ImageError),
    #[error("camera frame unavailable: {0}")]
    Frame(String),
    #[error("no camera stream is active")]
    NoActiveStream,
}
