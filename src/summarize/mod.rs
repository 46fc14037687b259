//! Comment summarization via OpenAI chat completions.
//!
//! Builds one composite user message (prompt above the newline-joined
//! comments) and returns the generated text verbatim. Provider failures
//! are surfaced as [`SummarizeError`] and never retried.

use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Production API base URL
pub const BASE_URL: &str = "https://api.openai.com";

/// Returned without calling the provider when a video has no comments.
pub const NO_COMMENTS_MESSAGE: &str = "No comments found for this video.";

const MAX_TOKENS: u32 = 500;
const TEMPERATURE: f32 = 0.7;
const SYSTEM_MESSAGE: &str = "You are a helpful assistant.";

const REQUEST_TIMEOUT_SECS: u64 = 60;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Summarization errors
#[derive(Debug)]
pub enum SummarizeError {
    /// Non-2xx response from the provider
    Api(reqwest::StatusCode),
    /// Transport or decoding failure
    Request(String),
    /// 2xx response with no usable completion
    EmptyResponse,
}

impl std::fmt::Display for SummarizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummarizeError::Api(status) => write!(f, "OpenAI API error: {}", status),
            SummarizeError::Request(msg) => write!(f, "OpenAI request failed: {}", msg),
            SummarizeError::EmptyResponse => write!(f, "OpenAI returned no completion"),
        }
    }
}

impl std::error::Error for SummarizeError {}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Compose the single user message sent to the provider.
pub fn build_prompt(comments: &[String], prompt: &str) -> String {
    format!("{}\n\nComments:\n{}", prompt, comments.join("\n"))
}

/// OpenAI chat completions client.
pub struct Summarizer {
    api_key: String,
    model: String,
    http_client: Client,
    base_url: String,
}

impl Summarizer {
    /// Create a summarizer using the production API base URL.
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_base_url(api_key, model, BASE_URL.to_string())
    }

    /// Create a summarizer with a custom base URL (for testing with a mock server).
    pub fn with_base_url(api_key: String, model: String, base_url: String) -> Self {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(std::time::Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            api_key,
            model,
            http_client,
            base_url,
        }
    }

    /// Summarize a list of comments under a user-supplied prompt.
    ///
    /// An empty comment list short-circuits to [`NO_COMMENTS_MESSAGE`]
    /// without contacting the provider.
    pub async fn summarize(
        &self,
        comments: &[String],
        prompt: &str,
    ) -> Result<String, SummarizeError> {
        if comments.is_empty() {
            return Ok(NO_COMMENTS_MESSAGE.to_string());
        }

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_MESSAGE.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: build_prompt(comments, prompt),
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        tracing::debug!(
            model = %request.model,
            comments = comments.len(),
            "Requesting comment summary"
        );

        let response = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| SummarizeError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(SummarizeError::Api(response.status()));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| SummarizeError::Request(e.to_string()))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(SummarizeError::EmptyResponse)
    }
}
