//! Everything that can go wrong while relaying a request, and how each failure
//! looks to the browser.

use lambda_http::http::StatusCode;
use serde_json::{json, Value};
use thiserror::Error;

use crate::{config::ConfigError, upstream::UpstreamError};

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("invalid action")]
    InvalidAction,

    #[error("server configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storefront API returned an error: {message}")]
    Upstream { message: String, details: Value },

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<UpstreamError> for ProxyError {
    fn from(e: UpstreamError) -> Self {
        ProxyError::Internal(e.to_string())
    }
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::InvalidAction | ProxyError::Upstream { .. } => StatusCode::BAD_REQUEST,
            ProxyError::Config(_) | ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The JSON body reported to the caller. Configuration problems are
    /// deliberately vague here; the specifics only go to the logs.
    pub fn body(&self) -> Value {
        match self {
            ProxyError::MethodNotAllowed => json!({ "error": "Method not allowed" }),
            ProxyError::InvalidAction => json!({ "error": "Invalid action" }),
            ProxyError::Config(_) => json!({ "error": "Server configuration error" }),
            ProxyError::Upstream { message, details } => {
                json!({ "error": message, "details": details })
            }
            ProxyError::Internal(message) => {
                json!({ "error": "Internal server error", "message": message })
            }
        }
    }
}
