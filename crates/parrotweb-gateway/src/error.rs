//! Error types for parrotweb-gateway

use parrotweb_core::ErrorSeverity;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Banner text for failures the user cannot act on
pub const GENERIC_MESSAGE: &str = "Something went wrong, please try again later";

/// Banner text for a rejected token with an empty body
pub const NOT_AUTHORIZED_MESSAGE: &str = "Not authorized";

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayErrorCode {
    Unauthorized,
    ApiError,
    Transport,
    Decode,
}

impl std::fmt::Display for GatewayErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayErrorCode::Unauthorized => write!(f, "UNAUTHORIZED"),
            GatewayErrorCode::ApiError => write!(f, "API_ERROR"),
            GatewayErrorCode::Transport => write!(f, "TRANSPORT"),
            GatewayErrorCode::Decode => write!(f, "DECODE"),
        }
    }
}

#[derive(Error, Debug)]
pub enum GatewayError {
    /// 401/403: the token is missing, expired or rejected
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Any other non-2xx answer; `message` is the response body
    #[error("Request failed ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response: {message}")]
    Decode { message: String },
}

impl GatewayError {
    pub fn code(&self) -> GatewayErrorCode {
        match self {
            GatewayError::Unauthorized { .. } => GatewayErrorCode::Unauthorized,
            GatewayError::Api { .. } => GatewayErrorCode::ApiError,
            GatewayError::Http(_) => GatewayErrorCode::Transport,
            GatewayError::Decode { .. } => GatewayErrorCode::Decode,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            GatewayError::Unauthorized { .. } => ErrorSeverity::Warning,
            GatewayError::Api { .. } => ErrorSeverity::Warning,
            GatewayError::Http(_) | GatewayError::Decode { .. } => ErrorSeverity::Error,
        }
    }

    /// Whether the session should be dropped
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, GatewayError::Unauthorized { .. })
    }

    /// Text for the dismissible error banner.
    ///
    /// Server messages are shown as sent; transport and decoding failures
    /// collapse into one generic line.
    pub fn display_message(&self) -> String {
        match self {
            GatewayError::Unauthorized { message } if !message.trim().is_empty() => message.trim().to_string(),
            GatewayError::Unauthorized { .. } => NOT_AUTHORIZED_MESSAGE.to_string(),
            GatewayError::Api { message, .. } if !message.trim().is_empty() => message.trim().to_string(),
            _ => GENERIC_MESSAGE.to_string(),
        }
    }
}

pub type GatewayResult<T> = Result<T, GatewayError>;
