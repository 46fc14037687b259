//! Google OAuth endpoint configuration.

use crate::config::Config;

/// Scopes requested at consent: channel read/write, channel read-only,
/// email, profile, and OpenID Connect.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/youtube.force-ssl",
    "https://www.googleapis.com/auth/youtube.readonly",
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
    "openid",
];

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

/// Google OAuth client configuration.
///
/// Endpoint URLs are overridable so tests can point at a mock server.
#[derive(Clone, Debug)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub scopes: Vec<String>,
}

impl GoogleOAuthConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_uri: config.google_redirect_uri.clone(),
            auth_url: AUTH_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            userinfo_url: USERINFO_URL.to_string(),
            scopes: SCOPES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Build the consent URL the user is redirected to.
    ///
    /// `access_type=offline` is what makes Google issue a refresh token
    /// (once, at first consent).
    pub fn build_auth_url(&self, state: &str) -> String {
        let scopes = self.scopes.join(" ");
        format!(
            "{}?client_id={}&redirect_uri={}&scope={}&state={}&response_type=code&access_type=offline&include_granted_scopes=true",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(&scopes),
            urlencoding::encode(state)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> GoogleOAuthConfig {
        GoogleOAuthConfig {
            client_id: "test-client-id".to_string(),
            client_secret: "test-secret".to_string(),
            redirect_uri: "http://localhost:8000/auth/callback".to_string(),
            auth_url: "https://example.com/oauth/authorize".to_string(),
            token_url: "https://example.com/oauth/token".to_string(),
            userinfo_url: "https://example.com/userinfo".to_string(),
            scopes: vec!["read".to_string(), "openid".to_string()],
        }
    }

    #[test]
    fn test_build_auth_url() {
        let url = test_config().build_auth_url("state-123");

        assert!(url.starts_with("https://example.com/oauth/authorize?"));
        assert!(url.contains("client_id=test-client-id"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A8000%2Fauth%2Fcallback"));
        assert!(url.contains("scope=read%20openid"));
        assert!(url.contains("state=state-123"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("access_type=offline"));
        assert!(url.contains("include_granted_scopes=true"));
    }

    #[test]
    fn test_default_scopes_cover_channel_and_identity() {
        assert!(SCOPES.contains(&"https://www.googleapis.com/auth/youtube.readonly"));
        assert!(SCOPES.contains(&"https://www.googleapis.com/auth/userinfo.email"));
        assert!(SCOPES.contains(&"openid"));
    }
}
