//! API error taxonomy.
//!
//! Every upstream failure is caught at the handler boundary and translated
//! to one of these kinds; no raw provider error propagates to a response.
//! Nothing here retries: refresh-then-retry is an explicit client-driven
//! protocol.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Errors surfaced by the session API endpoints
#[derive(Debug)]
pub enum ApiError {
    /// No or malformed Authorization header; the store is never consulted
    AuthMissing(String),
    /// Bearer token not present in the credential store
    AuthInvalid,
    /// Provider rejected the refresh token; user must re-login
    RefreshFailed,
    /// Delegated-data provider rejected the access token
    UpstreamAuth,
    /// Insufficient authentication scopes
    InsufficientScopes,
    /// Other delegated-data provider failure
    UpstreamData(String),
    /// Text-generation provider failure
    UpstreamGeneration(String),
    /// Missing required request fields
    Validation(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::AuthMissing(msg) => {
                (StatusCode::UNAUTHORIZED, format!("Invalid or missing token: {}", msg))
            }
            ApiError::AuthInvalid => (StatusCode::UNAUTHORIZED, "Invalid token".to_string()),
            ApiError::RefreshFailed => {
                (StatusCode::BAD_REQUEST, "Token refresh failed".to_string())
            }
            ApiError::UpstreamAuth => (
                StatusCode::UNAUTHORIZED,
                "Access token expired or revoked".to_string(),
            ),
            ApiError::InsufficientScopes => (
                StatusCode::FORBIDDEN,
                "Insufficient authentication scopes. Please log in again.".to_string(),
            ),
            ApiError::UpstreamData(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::UpstreamGeneration(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
