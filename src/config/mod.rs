//! Startup configuration loaded from environment variables.
//!
//! All variables use the `RECAP_` prefix. Required values fail fast at
//! startup with a descriptive error; optional values have defaults.

use anyhow::{anyhow, Context, Result};

/// How `/auth/callback` delivers the result to the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackMode {
    /// 307 redirect to the frontend with user info in query parameters
    Redirect,
    /// JSON body with the same fields (for non-browser deployments)
    Json,
}

impl CallbackMode {
    fn parse(s: &str) -> Result<Self> {
        match s {
            "redirect" => Ok(CallbackMode::Redirect),
            "json" => Ok(CallbackMode::Json),
            other => Err(anyhow!(
                "RECAP_CALLBACK_MODE must be 'redirect' or 'json', got '{}'",
                other
            )),
        }
    }
}

/// Complete service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the HTTP server
    pub port: u16,
    /// The single allowed CORS origin, also the redirect target in
    /// `CallbackMode::Redirect`
    pub frontend_origin: String,
    pub callback_mode: CallbackMode,

    // Google OAuth client
    pub google_client_id: String,
    pub google_client_secret: String,
    pub google_redirect_uri: String,

    /// Deployment session secret; validated at startup (minimum 32 bytes)
    pub session_secret: String,

    // OpenAI
    pub openai_api_key: String,
    pub openai_model: String,

    /// Maximum videos returned by GET /api/videos
    pub max_videos: u32,
    /// Maximum top-level comments fetched per video (first page only)
    pub max_comments: u32,
    /// How long a pending OAuth state token remains valid (seconds)
    pub state_ttl_secs: i64,
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through a variable lookup function.
    ///
    /// Separated from `from_env` so tests can supply variables without
    /// mutating process-global environment state.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |key: &str| {
            get(key).ok_or_else(|| anyhow!("{} is required", key))
        };

        let port: u16 = get("RECAP_PORT")
            .unwrap_or_else(|| "8000".to_string())
            .parse()
            .context("RECAP_PORT must be a valid port number")?;

        let frontend_origin = get("RECAP_FRONTEND_ORIGIN")
            .unwrap_or_else(|| "http://localhost:5173".to_string());

        let callback_mode = CallbackMode::parse(
            &get("RECAP_CALLBACK_MODE").unwrap_or_else(|| "redirect".to_string()),
        )?;

        let session_secret = required("RECAP_SESSION_SECRET")?;
        if session_secret.len() < 32 {
            return Err(anyhow!(
                "RECAP_SESSION_SECRET must be at least 32 bytes ({} given)",
                session_secret.len()
            ));
        }

        let max_videos: u32 = get("RECAP_MAX_VIDEOS")
            .unwrap_or_else(|| "15".to_string())
            .parse()
            .context("RECAP_MAX_VIDEOS must be a positive integer")?;

        let max_comments: u32 = get("RECAP_MAX_COMMENTS")
            .unwrap_or_else(|| "40".to_string())
            .parse()
            .context("RECAP_MAX_COMMENTS must be a positive integer")?;

        let state_ttl_secs: i64 = get("RECAP_STATE_TTL_SECS")
            .unwrap_or_else(|| "600".to_string())
            .parse()
            .context("RECAP_STATE_TTL_SECS must be a positive integer")?;
        if state_ttl_secs < 1 {
            return Err(anyhow!(
                "RECAP_STATE_TTL_SECS must be a positive integer, got {}",
                state_ttl_secs
            ));
        }

        Ok(Config {
            port,
            frontend_origin,
            callback_mode,
            google_client_id: required("RECAP_GOOGLE_CLIENT_ID")?,
            google_client_secret: required("RECAP_GOOGLE_CLIENT_SECRET")?,
            google_redirect_uri: required("RECAP_GOOGLE_REDIRECT_URI")?,
            session_secret,
            openai_api_key: required("RECAP_OPENAI_API_KEY")?,
            openai_model: get("RECAP_OPENAI_MODEL")
                .unwrap_or_else(|| "gpt-3.5-turbo".to_string()),
            max_videos,
            max_comments,
            state_ttl_secs,
        })
    }
}
