//! ML client error types.

use thiserror::Error;
use vlens_media::MediaError;

pub type MlResult<T> = Result<T, MlError>;

#[derive(Debug, Error)]
pub enum MlError {
    #[error("ML service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Image encoding failed: {0}")]
    Encode(#[from] MediaError),
}

impl MlError {
    pub fn is_retryable(&self) -> bool {
        match self {
            MlError::ServiceUnavailable(_) => true,
            MlError::Network(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }
}

impl From<MlError> for MediaError {
    fn from(e: MlError) -> Self {
        match e {
            MlError::ServiceUnavailable(msg) => MediaError::ProviderUnavailable(msg),
            MlError::Encode(inner) => inner,
            other => MediaError::DetectionFailed(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(MlError::ServiceUnavailable("503".into()).is_retryable());
        assert!(!MlError::InvalidResponse("bad".into()).is_retryable());
        assert!(!MlError::RequestFailed("400".into()).is_retryable());
    }

    #[test]
    fn test_into_media_error() {
        let media: MediaError = MlError::ServiceUnavailable("down".into()).into();
        assert!(matches!(media, MediaError::ProviderUnavailable(_)));

        let media: MediaError = MlError::RequestFailed("500".into()).into();
        assert!(matches!(media, MediaError::DetectionFailed(_)));
    }
}
