//! Error types for the provider layer.
//!
//! These errors never cross the [`Provider`](crate::Provider) boundary:
//! adapters log them and degrade to an empty query result or a failed
//! [`ActionResult`](msp_core::ActionResult).

use thiserror::Error;

/// Errors that can occur while talking to a vendor.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Required configuration keys are absent.
    #[error("missing required configuration: {}", .0.join(", "))]
    MissingConfiguration(Vec<String>),

    /// Configuration is present but unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Network failure or timeout.
    #[error("transport error: {0}")]
    Transport(String),

    /// Vendor answered with a non-2xx status.
    #[error("vendor returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Vendor answered with a body that cannot be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Token exchange failed.
    #[error("authentication failed: {0}")]
    AuthRefresh(String),

    /// Client directory lookup failed.
    #[error("client directory error: {0}")]
    Directory(String),

    /// No constructor is registered for the provider type.
    #[error("unknown provider type: {0}")]
    UnknownProviderType(String),

    /// A constructor is already registered for the provider type.
    #[error("provider type already registered: {0}")]
    DuplicateProviderType(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProviderError {
    /// HTTP status of a vendor rejection, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProviderError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Transport(format!("request timed out: {e}"))
        } else if e.is_decode() {
            ProviderError::InvalidResponse(e.to_string())
        } else {
            ProviderError::Transport(e.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
