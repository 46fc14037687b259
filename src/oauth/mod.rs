//! Google OAuth 2.0 authorization flow.
//!
//! Authorization code flow, one implementation for both deployment modes:
//! 1. GET /auth/login → issue state token, redirect to Google consent URL
//! 2. User authorizes on Google's site
//! 3. Google redirects to GET /auth/callback with a single-use code
//! 4. Exchange code for tokens, fetch identity, discover the channel
//! 5. Upsert the credential record; hand the access token to the frontend
//!    (redirect with query parameters, or a JSON body, per configuration)
//!
//! The refresh sub-flow ([`exchange::refresh_access_token`]) is invoked
//! separately by POST /api/refresh_token, never from here.

pub mod exchange;
pub mod provider;
mod state;

pub use provider::GoogleOAuthConfig;
pub use state::{run_state_cleanup, StateManager};

use crate::config::CallbackMode;
use crate::store::{CredentialRecord, SessionStore};
use crate::youtube::{YouTubeClient, YouTubeError};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Redirect, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Shared application state for the OAuth endpoints
#[derive(Clone)]
pub struct OAuthAppState {
    pub store: Arc<SessionStore>,
    pub state_manager: StateManager,
    pub google: GoogleOAuthConfig,
    pub youtube_base_url: String,
    pub frontend_origin: String,
    pub callback_mode: CallbackMode,
}

/// OAuth callback query parameters
#[derive(Deserialize)]
pub struct OAuthCallback {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// Successful login result, as delivered to the frontend
#[derive(Serialize)]
pub struct LoginSuccess {
    pub name: String,
    pub email: String,
    pub channel_id: String,
    pub access_token: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Create the OAuth router
pub fn create_oauth_router(state: OAuthAppState) -> Router {
    Router::new()
        .route("/auth/login", get(login))
        .route("/auth/callback", get(callback))
        .with_state(Arc::new(state))
}

/// GET /auth/login
///
/// Issues a single-use state token and redirects the user to Google's
/// consent page.
async fn login(State(state): State<Arc<OAuthAppState>>) -> Redirect {
    let csrf_state = state.state_manager.create_state();
    let auth_url = state.google.build_auth_url(&csrf_state);

    info!("Redirecting to Google consent page");
    Redirect::temporary(&auth_url)
}

/// GET /auth/callback
///
/// Terminal step of one login attempt: validates the state token, exchanges
/// the code, resolves identity and channel, and upserts the credential
/// record. Any failure ends the attempt; there are no retries because
/// authorization codes are single-use.
async fn callback(
    State(state): State<Arc<OAuthAppState>>,
    Query(callback): Query<OAuthCallback>,
) -> Response {
    debug!("OAuth callback received");

    if let Some(error) = callback.error {
        warn!(error = %error, "Google reported an authorization error");
        return failure(
            &state,
            StatusCode::BAD_REQUEST,
            &format!("authorization failed: {}", error),
        );
    }

    let Some(code) = callback.code else {
        return failure(&state, StatusCode::BAD_REQUEST, "missing 'code' parameter");
    };
    let Some(csrf_state) = callback.state else {
        return failure(&state, StatusCode::BAD_REQUEST, "missing 'state' parameter");
    };

    if !state.state_manager.validate_and_consume(&csrf_state) {
        warn!("Invalid or expired OAuth state token");
        return failure(
            &state,
            StatusCode::UNAUTHORIZED,
            "invalid or expired login attempt",
        );
    }

    let tokens = match exchange::exchange_code_for_token(&state.google, &code).await {
        Ok(tokens) => tokens,
        Err(e) => {
            error!(error = %e, "Token exchange failed");
            return failure(&state, StatusCode::UNAUTHORIZED, "authorization failed");
        }
    };

    let user_info = match exchange::fetch_user_info(&state.google, &tokens.access_token).await {
        Ok(info) => info,
        Err(e) => {
            error!(error = %e, "Identity lookup failed");
            return failure(&state, StatusCode::BAD_GATEWAY, "identity lookup failed");
        }
    };

    let youtube = YouTubeClient::with_base_url(
        tokens.access_token.clone(),
        state.youtube_base_url.clone(),
    );
    let channel_id = match youtube.my_channel_id().await {
        Ok(id) => id,
        Err(YouTubeError::NoChannel) => {
            warn!(email = %user_info.email, "Account has no YouTube channel");
            return failure(
                &state,
                StatusCode::NOT_FOUND,
                "no YouTube channel linked to this account",
            );
        }
        Err(e) => {
            error!(error = %e, "Channel discovery failed");
            return failure(&state, StatusCode::BAD_GATEWAY, "channel discovery failed");
        }
    };

    // Google only issues a refresh token at first consent. On a repeat
    // login, keep the one already on file for this identity.
    let refresh_token = match tokens
        .refresh_token
        .or_else(|| state.store.find_by_email(&user_info.email).map(|r| r.refresh_token))
    {
        Some(token) => token,
        None => {
            error!(email = %user_info.email, "No refresh token granted or on file");
            return failure(
                &state,
                StatusCode::BAD_REQUEST,
                "authorization response did not include a refresh token",
            );
        }
    };

    let record = CredentialRecord {
        email: user_info.email.clone(),
        name: user_info.name.clone(),
        channel_id: channel_id.clone(),
        access_token: tokens.access_token.clone(),
        refresh_token,
        token_expiry: tokens.expires_at,
    };
    state.store.insert_or_replace(record);

    info!(
        email = %user_info.email,
        channel_id = %channel_id,
        "Login completed"
    );

    let result = LoginSuccess {
        name: user_info.name,
        email: user_info.email,
        channel_id,
        access_token: tokens.access_token,
    };

    match state.callback_mode {
        CallbackMode::Redirect => {
            let url = format!(
                "{}/?name={}&email={}&channel_id={}&access_token={}",
                state.frontend_origin,
                urlencoding::encode(&result.name),
                urlencoding::encode(&result.email),
                urlencoding::encode(&result.channel_id),
                urlencoding::encode(&result.access_token)
            );
            Redirect::temporary(&url).into_response()
        }
        CallbackMode::Json => Json(result).into_response(),
    }
}

/// Terminal failure of one login attempt, delivered per deployment mode.
fn failure(state: &OAuthAppState, status: StatusCode, message: &str) -> Response {
    match state.callback_mode {
        CallbackMode::Redirect => {
            let url = format!(
                "{}/?error={}",
                state.frontend_origin,
                urlencoding::encode(message)
            );
            Redirect::temporary(&url).into_response()
        }
        CallbackMode::Json => (
            status,
            Json(ErrorResponse {
                error: message.to_string(),
            }),
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oauth_callback_deserialization() {
        // Success case
        let query = "code=auth_code_123&state=csrf_state_456";
        let callback: OAuthCallback = serde_urlencoded::from_str(query).unwrap();
        assert_eq!(callback.code, Some("auth_code_123".to_string()));
        assert_eq!(callback.state, Some("csrf_state_456".to_string()));
        assert_eq!(callback.error, None);

        // Error case
        let query = "error=access_denied";
        let callback: OAuthCallback = serde_urlencoded::from_str(query).unwrap();
        assert_eq!(callback.error, Some("access_denied".to_string()));
        assert_eq!(callback.code, None);
    }

    #[test]
    fn test_login_success_serialization() {
        let result = LoginSuccess {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            channel_id: "UC123".to_string(),
            access_token: "ya29.token".to_string(),
        };

        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"channel_id\":\"UC123\""));
        assert!(json.contains("\"access_token\":\"ya29.token\""));
    }
}
