//! Error types for parrotweb-api

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use parrotweb_core::{CoreError, ErrorCode, ErrorSeverity};
use parrotweb_gateway::GatewayError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Unauthorized")]
    Unauthorized,

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Core(e) => match e.code() {
                ErrorCode::TransactionNotFound => StatusCode::NOT_FOUND,
                ErrorCode::UnknownField => StatusCode::BAD_REQUEST,
                ErrorCode::NotAuthenticated => StatusCode::UNAUTHORIZED,
                ErrorCode::SessionStore | ErrorCode::IoError => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Gateway(e) if e.is_unauthorized() => StatusCode::UNAUTHORIZED,
            ApiError::Gateway(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ApiError::NotFound { .. } | ApiError::BadRequest { .. } => ErrorSeverity::Info,
            ApiError::Unauthorized => ErrorSeverity::Warning,
            ApiError::Core(e) => e.severity(),
            ApiError::Gateway(e) => e.severity(),
        }
    }

    /// Text shown to the user
    pub fn message(&self) -> String {
        match self {
            ApiError::Gateway(e) => e.display_message(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self.severity() {
            ErrorSeverity::Info => log::info!("Request failed ({}): {}", status, self),
            ErrorSeverity::Warning => log::warn!("Request failed ({}): {}", status, self),
            ErrorSeverity::Error => log::error!("Request failed ({}): {}", status, self),
        }
        let body = Html(crate::render::error_notice(&self.message()));
        if status == StatusCode::UNAUTHORIZED {
            // send HTMX back to the entry screen
            return (status, [("HX-Redirect", "/")], body).into_response();
        }
        (status, body).into_response()
    }
}
