//! Bearer-token-authenticated session API.
//!
//! Every protected handler authenticates independently against the
//! credential store; nothing is cached across requests. Provider calls use
//! a transient client built from the looked-up record, valid for the
//! duration of that one request.

use crate::api::error::ApiError;
use crate::auth::extract_bearer_token;
use crate::oauth::{exchange, GoogleOAuthConfig};
use crate::store::{CredentialRecord, SessionStore};
use crate::summarize::Summarizer;
use crate::youtube::{Video, YouTubeClient, YouTubeError};
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Shared application state for the session API
#[derive(Clone)]
pub struct ApiAppState {
    pub store: Arc<SessionStore>,
    pub google: GoogleOAuthConfig,
    pub summarizer: Arc<Summarizer>,
    pub youtube_base_url: String,
    pub max_videos: u32,
    pub max_comments: u32,
}

#[derive(Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

#[derive(Serialize)]
pub struct VideosResponse {
    pub videos: Vec<Video>,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub name: String,
    pub email: String,
    pub channel_id: String,
}

#[derive(Serialize)]
pub struct CommentsResponse {
    pub comments: Vec<String>,
}

/// Request body for POST /api/summarize_comments
#[derive(Deserialize)]
pub struct SummarizeRequest {
    pub video_id: Option<String>,
    pub prompt: Option<String>,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Create the session API router
pub fn create_session_router(state: ApiAppState) -> Router {
    Router::new()
        .route("/api/refresh_token", post(refresh_token))
        .route("/api/videos", get(list_videos))
        .route("/api/user", get(user_info))
        .route("/api/video/:video_id/comments", get(video_comments))
        .route("/api/summarize_comments", post(summarize_comments))
        .route("/logout", get(logout))
        .with_state(Arc::new(state))
}

/// Resolve the inbound bearer token to a credential record.
///
/// Distinguishes a missing/malformed header (store never consulted) from a
/// well-formed token the store does not know.
fn authenticate(
    headers: &HeaderMap,
    store: &SessionStore,
) -> Result<CredentialRecord, ApiError> {
    let token =
        extract_bearer_token(headers).map_err(|e| ApiError::AuthMissing(e.to_string()))?;
    store
        .find_by_access_token(&token)
        .ok_or(ApiError::AuthInvalid)
}

/// Translate a delegated-data provider error.
///
/// Only a genuine 401 maps to [`ApiError::UpstreamAuth`], so the frontend
/// refreshes exactly when the token was actually rejected.
fn map_youtube_error(error: YouTubeError, what: &str) -> ApiError {
    match error {
        YouTubeError::Auth => ApiError::UpstreamAuth,
        YouTubeError::Forbidden => ApiError::InsufficientScopes,
        other => {
            warn!(error = %other, "YouTube request failed");
            ApiError::UpstreamData(format!("Failed to fetch {}", what))
        }
    }
}

/// POST /api/refresh_token
///
/// Explicit refresh: mints a new access token from the stored refresh token
/// and mutates the record in place. The refresh token itself never changes.
/// A provider rejection is terminal; the user must log in again.
async fn refresh_token(
    State(state): State<Arc<ApiAppState>>,
    headers: HeaderMap,
) -> Result<Json<RefreshResponse>, ApiError> {
    let record = authenticate(&headers, &state.store)?;

    let tokens = exchange::refresh_access_token(&state.google, &record.refresh_token)
        .await
        .map_err(|e| {
            warn!(email = %record.email, error = %e, "Token refresh rejected");
            ApiError::RefreshFailed
        })?;

    // The record can disappear between authenticate and here if a logout
    // raced the refresh; returning the minted token would hand the client
    // a credential that never authenticates.
    if !state
        .store
        .update_tokens(&record.email, tokens.access_token.clone(), tokens.expires_at)
    {
        warn!(email = %record.email, "Record removed during token refresh");
        return Err(ApiError::AuthInvalid);
    }

    info!(email = %record.email, "Access token refreshed");
    Ok(Json(RefreshResponse {
        access_token: tokens.access_token,
    }))
}

/// GET /api/videos
async fn list_videos(
    State(state): State<Arc<ApiAppState>>,
    headers: HeaderMap,
) -> Result<Json<VideosResponse>, ApiError> {
    let record = authenticate(&headers, &state.store)?;

    let youtube = YouTubeClient::with_base_url(
        record.access_token.clone(),
        state.youtube_base_url.clone(),
    );
    let videos = youtube
        .recent_videos(&record.channel_id, state.max_videos)
        .await
        .map_err(|e| map_youtube_error(e, "videos"))?;

    debug!(email = %record.email, count = videos.len(), "Listed videos");
    Ok(Json(VideosResponse { videos }))
}

/// GET /api/user
async fn user_info(
    State(state): State<Arc<ApiAppState>>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, ApiError> {
    let record = authenticate(&headers, &state.store)?;

    Ok(Json(UserResponse {
        name: record.name,
        email: record.email,
        channel_id: record.channel_id,
    }))
}

/// GET /api/video/:video_id/comments
async fn video_comments(
    State(state): State<Arc<ApiAppState>>,
    Path(video_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<CommentsResponse>, ApiError> {
    let record = authenticate(&headers, &state.store)?;

    let youtube = YouTubeClient::with_base_url(
        record.access_token.clone(),
        state.youtube_base_url.clone(),
    );
    let comments = youtube
        .video_comments(&video_id, state.max_comments)
        .await
        .map_err(|e| map_youtube_error(e, "comments"))?;

    Ok(Json(CommentsResponse { comments }))
}

/// POST /api/summarize_comments
///
/// Fetches the video's comments, then submits them with the caller's
/// prompt to the text-generation provider. An empty comment list never
/// reaches the provider.
async fn summarize_comments(
    State(state): State<Arc<ApiAppState>>,
    headers: HeaderMap,
    Json(request): Json<SummarizeRequest>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let record = authenticate(&headers, &state.store)?;

    let Some(video_id) = request.video_id.filter(|v| !v.is_empty()) else {
        return Err(ApiError::Validation("Missing video_id".to_string()));
    };
    let Some(prompt) = request.prompt.filter(|p| !p.is_empty()) else {
        return Err(ApiError::Validation("Missing prompt".to_string()));
    };

    let youtube = YouTubeClient::with_base_url(
        record.access_token.clone(),
        state.youtube_base_url.clone(),
    );
    let comments = youtube
        .video_comments(&video_id, state.max_comments)
        .await
        .map_err(|e| map_youtube_error(e, "comments"))?;

    let summary = state
        .summarizer
        .summarize(&comments, &prompt)
        .await
        .map_err(|e| {
            warn!(video_id = %video_id, error = %e, "Summarization failed");
            ApiError::UpstreamGeneration("Failed to summarize comments".to_string())
        })?;

    info!(
        email = %record.email,
        video_id = %video_id,
        comments = comments.len(),
        "Comments summarized"
    );
    Ok(Json(SummaryResponse { summary }))
}

/// GET /logout
///
/// Removes the record matching the presented token. Idempotent: a second
/// call with the now-invalid token finds nothing and still succeeds, and a
/// missing header is not an error.
async fn logout(
    State(state): State<Arc<ApiAppState>>,
    headers: HeaderMap,
) -> Json<MessageResponse> {
    if let Ok(token) = extract_bearer_token(&headers) {
        if let Some(record) = state.store.find_by_access_token(&token) {
            state.store.delete(&record.email);
            info!(email = %record.email, "Logged out");
        }
    }

    Json(MessageResponse {
        message: "Logged out successfully".to_string(),
    })
}
