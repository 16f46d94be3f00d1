//! Error types for the document service API client.

use thiserror::Error;

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors surfaced by remote calls. Every variant is caught at the call
/// site and translated into a single notification; none escapes to the
/// event loop.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure: connect refused, timeout, or a malformed body.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response, or a 200 whose envelope carried `status != "success"`.
    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The server no longer knows the requested id.
    #[error("document not found: {0}")]
    NotFound(String),

    /// Local file could not be read while assembling an upload.
    #[error("file read error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Creates a server error from a status code and message.
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// True for failures worth retrying by hand (transport-level); server
    /// rejections and missing documents are not.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_display() {
        let err = ApiError::server(500, "boom");
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_not_found_display() {
        let err = ApiError::NotFound("doc-1".to_string());
        assert!(err.to_string().contains("doc-1"));
    }

    #[test]
    fn test_is_transport() {
        assert!(!ApiError::server(502, "bad gateway").is_transport());
        assert!(!ApiError::NotFound("x".into()).is_transport());
    }
}
