use thiserror::Error;

/// Custom error type for clustertop
#[derive(Error, Debug)]
pub enum ClusterTopError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{endpoint} returned status {status}")]
    Status { endpoint: String, status: u16 },

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Result type alias for clustertop
pub type Result<T> = std::result::Result<T, ClusterTopError>;

impl ClusterTopError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        ClusterTopError::Config(msg.into())
    }

    pub fn status<S: Into<String>>(endpoint: S, status: u16) -> Self {
        ClusterTopError::Status {
            endpoint: endpoint.into(),
            status,
        }
    }

    pub fn invalid_url<S: Into<String>, R: Into<String>>(url: S, reason: R) -> Self {
        ClusterTopError::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn runtime<S: Into<String>>(msg: S) -> Self {
        ClusterTopError::Runtime(msg.into())
    }
}
