//! Request-level error taxonomy.
//!
//! Every failure terminates the request; nothing is retried. Each variant maps
//! to one response status and a short plain-text message. Internal detail
//! stays in the logs.

use crate::imaging::BackendError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScalerError {
    #[error("Image fetch failed for {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Remote server returned status {status} for {url}")]
    UpstreamStatus { url: String, status: u16 },

    #[error("Remote server returned status {status} for {url} but the content-type: {content_type} was invalid")]
    NotAnImage {
        url: String,
        status: u16,
        content_type: String,
    },

    #[error("Image too large: {bytes} bytes (limit {limit})")]
    PayloadTooLarge { bytes: u64, limit: u64 },

    #[error("Image processing failed: {0}")]
    Codec(#[from] BackendError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ScalerError {
    /// HTTP status the caller sees.
    pub fn status_code(&self) -> u16 {
        match self {
            ScalerError::Fetch { .. } => 502,
            ScalerError::UpstreamStatus { status, .. } if (400..=599).contains(status) => *status,
            ScalerError::UpstreamStatus { .. } => 502,
            ScalerError::NotAnImage { .. } => 415,
            ScalerError::PayloadTooLarge { .. } => 413,
            ScalerError::Codec(_) => 500,
            ScalerError::Internal(_) => 500,
        }
    }

    /// Plain-text response body. Never includes URLs, paths, or codec detail.
    pub fn public_message(&self) -> String {
        match self {
            ScalerError::Fetch { .. } => "Image could not be fetched.".to_string(),
            ScalerError::UpstreamStatus { status, .. } => {
                format!("Remote server returned status {status}")
            }
            ScalerError::NotAnImage { .. } => "URL did not return an image.".to_string(),
            ScalerError::PayloadTooLarge { bytes, .. } => format!("Image too large: {bytes} bytes"),
            ScalerError::Codec(_) => "Image could not be processed.".to_string(),
            ScalerError::Internal(_) => "Internal Server Error".to_string(),
        }
    }

    /// Failures caused by the origin or the caller, as opposed to this service.
    pub fn is_client_side(&self) -> bool {
        !matches!(self, ScalerError::Codec(_) | ScalerError::Internal(_))
    }
}

pub type Result<T> = std::result::Result<T, ScalerError>;
