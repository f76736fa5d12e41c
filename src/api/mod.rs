//! Client side of the external classification API.
//!
//! The backend exposes `GET /health` and `POST /detect`. [`ClassificationApi`]
//! is the seam the controller talks through; [`HttpApi`] is the real
//! implementation and tests substitute their own.

pub mod client;
pub mod types;

use thiserror::Error;

pub use client::HttpApi;
pub use types::{AnalysisRequest, AnalysisResult, MIN_TEXT_CHARS, Prediction, status_message};

/// Failures talking to the classification API, classified by origin.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (DNS, refused, timeout).
    #[error("unable to reach the classification API: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status. `message` is already the
    /// user-facing text.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// A 2xx response whose body is not a valid analysis result.
    #[error("Invalid response format from API")]
    InvalidResponse(String),
}

/// Operations the controller needs from the classification backend.
pub trait ClassificationApi {
    /// `GET /health`; any 2xx is healthy.
    fn health(&self) -> Result<(), ApiError>;

    /// `POST /detect` with `{"text": ...}`.
    fn detect(&self, request: &AnalysisRequest) -> Result<AnalysisResult, ApiError>;

    /// Origin named in connection-failure messages.
    fn base_url(&self) -> &str;
}

impl<T: ClassificationApi + ?Sized> ClassificationApi for &T {
    fn health(&self) -> Result<(), ApiError> {
        (**self).health()
    }

    fn detect(&self, request: &AnalysisRequest) -> Result<AnalysisResult, ApiError> {
        (**self).detect(request)
    }

    fn base_url(&self) -> &str {
        (**self).base_url()
    }
}
