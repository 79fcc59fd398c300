//! Error types for the auth router

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Required config parameter '{0}' is not provided")]
    MissingConfig(&'static str),

    #[error("{0} is not initialized")]
    Uninitialized(&'static str),

    #[error("Query parameter '{param}' has an invalid value")]
    InvalidParameter { param: &'static str, value: String },

    #[error("OAuth callback error: {0}")]
    Callback(String),

    #[error("Token error: {0}")]
    Token(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, AuthError>;

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        match self {
            AuthError::InvalidParameter { param, value } => {
                let body = serde_json::json!({
                    "errors": [{
                        "location": "query",
                        "msg": "invalid value",
                        "param": param,
                        "value": value,
                    }]
                });
                (StatusCode::BAD_REQUEST, axum::Json(body)).into_response()
            }
            other => {
                tracing::error!("Request failed: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}
