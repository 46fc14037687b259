//! YouTube Data API v3 client.
//!
//! Thin call-through using a validated access token. This client never
//! refreshes tokens itself: a 401 from YouTube surfaces as
//! [`YouTubeError::Auth`] and it is the frontend's job to invoke the
//! explicit refresh flow and retry.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

/// Production API base URL
pub const BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// One video in a channel listing.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Video {
    pub title: String,
    #[serde(rename = "videoId")]
    pub video_id: String,
    pub thumbnail: String,
    pub description: String,
}

/// YouTube API errors, split so callers can tell a rejected token from
/// any other upstream failure.
#[derive(Debug)]
pub enum YouTubeError {
    /// 401: access token expired or revoked; caller should refresh and retry
    Auth,
    /// 403: insufficient authentication scopes
    Forbidden,
    /// The account has no YouTube channel
    NoChannel,
    /// Other non-2xx response
    Api(StatusCode),
    /// Transport or decoding failure
    Request(String),
}

impl std::fmt::Display for YouTubeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            YouTubeError::Auth => write!(f, "YouTube auth error: token expired or invalid"),
            YouTubeError::Forbidden => write!(f, "YouTube error: insufficient scopes"),
            YouTubeError::NoChannel => write!(f, "No YouTube channel found for this account"),
            YouTubeError::Api(status) => write!(f, "YouTube API error: {}", status),
            YouTubeError::Request(msg) => write!(f, "YouTube request failed: {}", msg),
        }
    }
}

impl std::error::Error for YouTubeError {}

// Response shapes, limited to the fields we read

#[derive(Deserialize)]
struct ChannelListResponse {
    #[serde(default)]
    items: Vec<ChannelItem>,
}

#[derive(Deserialize)]
struct ChannelItem {
    id: String,
}

#[derive(Deserialize)]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    id: SearchItemId,
    snippet: SearchSnippet,
}

#[derive(Deserialize)]
struct SearchItemId {
    #[serde(rename = "videoId")]
    video_id: String,
}

#[derive(Deserialize)]
struct SearchSnippet {
    title: String,
    description: String,
    thumbnails: Thumbnails,
}

#[derive(Deserialize)]
struct Thumbnails {
    high: Thumbnail,
}

#[derive(Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Deserialize)]
struct CommentThreadListResponse {
    #[serde(default)]
    items: Vec<CommentThread>,
}

#[derive(Deserialize)]
struct CommentThread {
    snippet: CommentThreadSnippet,
}

#[derive(Deserialize)]
struct CommentThreadSnippet {
    #[serde(rename = "topLevelComment")]
    top_level_comment: Comment,
}

#[derive(Deserialize)]
struct Comment {
    snippet: CommentSnippet,
}

#[derive(Deserialize)]
struct CommentSnippet {
    #[serde(rename = "textDisplay")]
    text_display: String,
}

/// HTTP client for the YouTube Data API.
///
/// Constructed per request from a validated credential; holds only a
/// transient copy of the access token.
pub struct YouTubeClient {
    access_token: String,
    http_client: Client,
    base_url: String,
}

impl YouTubeClient {
    /// Create a client for the given API base URL ([`BASE_URL`] in
    /// production, a mock server in tests).
    pub fn with_base_url(access_token: String, base_url: String) -> Self {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(std::time::Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            access_token,
            http_client,
            base_url,
        }
    }

    /// Discover the authenticated user's channel ID.
    pub async fn my_channel_id(&self) -> Result<String, YouTubeError> {
        let url = format!(
            "{}/channels?part=snippet%2CcontentDetails&mine=true",
            self.base_url
        );
        let response: ChannelListResponse = self.get_json(&url).await?;

        response
            .items
            .into_iter()
            .next()
            .map(|item| item.id)
            .ok_or(YouTubeError::NoChannel)
    }

    /// List the channel's most recent videos, newest first.
    pub async fn recent_videos(
        &self,
        channel_id: &str,
        max_results: u32,
    ) -> Result<Vec<Video>, YouTubeError> {
        let url = format!(
            "{}/search?part=snippet&channelId={}&maxResults={}&order=date&type=video",
            self.base_url,
            urlencoding::encode(channel_id),
            max_results
        );
        let response: SearchListResponse = self.get_json(&url).await?;

        Ok(response
            .items
            .into_iter()
            .map(|item| Video {
                title: item.snippet.title,
                video_id: item.id.video_id,
                thumbnail: item.snippet.thumbnails.high.url,
                description: item.snippet.description,
            })
            .collect())
    }

    /// List up to `max_results` top-level comments on a video.
    ///
    /// First page only; no pagination.
    pub async fn video_comments(
        &self,
        video_id: &str,
        max_results: u32,
    ) -> Result<Vec<String>, YouTubeError> {
        let url = format!(
            "{}/commentThreads?part=snippet&videoId={}&maxResults={}",
            self.base_url,
            urlencoding::encode(video_id),
            max_results
        );
        let response: CommentThreadListResponse = self.get_json(&url).await?;

        Ok(response
            .items
            .into_iter()
            .map(|thread| thread.snippet.top_level_comment.snippet.text_display)
            .collect())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, YouTubeError> {
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(|e| YouTubeError::Request(e.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED => Err(YouTubeError::Auth),
            StatusCode::FORBIDDEN => Err(YouTubeError::Forbidden),
            s if !s.is_success() => Err(YouTubeError::Api(s)),
            _ => response
                .json::<T>()
                .await
                .map_err(|e| YouTubeError::Request(e.to_string())),
        }
    }
}
