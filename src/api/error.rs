//! API error classification
//!
//! The TUI routes failures into different modes (connection banner, auth
//! screen, status line), so client errors carry a coarse kind alongside the
//! server message.

/// Classified failure from the ArgoCD API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Token missing, expired, or rejected (HTTP 401/403)
    #[error("authentication required: {0}")]
    Auth(String),

    /// Server unreachable (DNS, refused, timeout)
    #[error("cannot reach ArgoCD server: {0}")]
    Connection(String),

    /// Any other server-side failure
    #[error("{0}")]
    Server(String),
}

impl ApiError {
    /// Classify a reqwest transport error.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            ApiError::Connection(err.to_string())
        } else {
            ApiError::Server(err.to_string())
        }
    }

    /// Classify an HTTP status with the response body as the message.
    pub fn from_status(status: reqwest::StatusCode, body: String) -> Self {
        let message = if body.trim().is_empty() {
            status.to_string()
        } else {
            body
        };
        match status.as_u16() {
            401 | 403 => ApiError::Auth(message),
            _ => ApiError::Server(message),
        }
    }
}

/// Pull the classified kind back out of an anyhow chain, if present.
pub fn classify(err: &anyhow::Error) -> Option<&ApiError> {
    err.chain().find_map(|e| e.downcast_ref::<ApiError>())
}
