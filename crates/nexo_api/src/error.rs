//! Error model used by Nexo CRM API client operations.

use std::io;

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CrmError>;

/// Represents the failure classes a CRM API call can produce: raw HTTP errors with
/// status and server code, access-denied responses, timeouts, transport failures,
/// business rejections reported inside a 2xx envelope, and serialization problems.
#[derive(Debug, Error)]
pub enum CrmError {
    #[error("http {status}: {message}")]
    Http {
        status: StatusCode,
        code: Option<String>,
        message: String,
    },
    #[error("access denied: {0}")]
    AccessDenied(String),
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("rejected by server: {0}")]
    Business(String),
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("unexpected error: {0}")]
    Other(String),
}

impl CrmError {
    /// Constructs an HTTP error variant with an optional server-side error code.
    pub fn http(status: StatusCode, code: Option<String>, message: impl Into<String>) -> Self {
        CrmError::Http {
            status,
            code,
            message: message.into(),
        }
    }

    /// True for failures caused by the transport itself rather than the server's
    /// answer. Only these qualify for the loader's automatic one-shot retry.
    pub fn is_network_class(&self) -> bool {
        matches!(self, CrmError::Network(_) | CrmError::Timeout(_))
    }

    /// True for 401/403-class failures, which are surfaced distinctly and never retried.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, CrmError::AccessDenied(_))
    }
}

impl From<reqwest::Error> for CrmError {
    /// Converts reqwest errors into semantic CrmError variants.
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CrmError::Timeout(err.to_string())
        } else if err.is_status() {
            let status = err.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            CrmError::Http {
                status,
                code: None,
                message: err.to_string(),
            }
        } else if err.is_connect() {
            CrmError::Network(err.to_string())
        } else {
            CrmError::Other(err.to_string())
        }
    }
}

impl From<serde_json::Error> for CrmError {
    /// Converts serde_json decode/encode failures into serialization errors.
    fn from(err: serde_json::Error) -> Self {
        CrmError::Serialization(err.to_string())
    }
}
