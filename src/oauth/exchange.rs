//! Google token endpoint calls.
//!
//! Exchanging authorization codes, refreshing access tokens, and fetching
//! the authenticated user's identity. Each call is a single attempt:
//! authorization codes are single-use and a rejected refresh token will not
//! become valid by retrying.

use super::provider::GoogleOAuthConfig;
use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use std::collections::HashMap;

const REQUEST_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Tokens obtained from the provider.
#[derive(Debug)]
pub struct ExchangedTokens {
    pub access_token: String,
    /// Present only at first consent; absent on repeat authorizations
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Token endpoint response (standard OAuth 2.0)
#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Identity endpoint response
#[derive(Deserialize, Debug)]
pub struct UserInfo {
    pub email: String,
    pub name: String,
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .connect_timeout(std::time::Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .build()
        .expect("Failed to build HTTP client")
}

impl TokenResponse {
    fn into_tokens(self) -> ExchangedTokens {
        let expires_at = self
            .expires_in
            .map(|seconds| Utc::now() + Duration::seconds(seconds));
        ExchangedTokens {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
        }
    }
}

/// Exchange an authorization code for tokens.
///
/// Codes are single-use; failure is terminal for this login attempt.
pub async fn exchange_code_for_token(
    google: &GoogleOAuthConfig,
    code: &str,
) -> Result<ExchangedTokens> {
    let mut form_data = HashMap::new();
    form_data.insert("grant_type", "authorization_code");
    form_data.insert("code", code);
    form_data.insert("redirect_uri", google.redirect_uri.as_str());
    form_data.insert("client_id", google.client_id.as_str());
    form_data.insert("client_secret", google.client_secret.as_str());

    tracing::debug!("Exchanging authorization code at {}", google.token_url);

    let response = http_client()
        .post(&google.token_url)
        .header("Accept", "application/json")
        .form(&form_data)
        .send()
        .await
        .context("Failed to send token exchange request")?;

    if !response.status().is_success() {
        let status = response.status();
        return Err(anyhow!("Token exchange failed with status {}", status));
    }

    let token_response: TokenResponse = response
        .json()
        .await
        .context("Failed to parse token response")?;

    tracing::debug!(
        has_refresh_token = token_response.refresh_token.is_some(),
        expires_in = ?token_response.expires_in,
        "Token exchange successful"
    );

    Ok(token_response.into_tokens())
}

/// Mint a new access token from a refresh token.
///
/// Sends only the refresh token and client identity, no access token.
/// Google does not reissue refresh tokens here, so the caller keeps the one
/// it has. A rejected refresh token (revoked or expired) is terminal: the
/// user must go through the full login flow again.
pub async fn refresh_access_token(
    google: &GoogleOAuthConfig,
    refresh_token: &str,
) -> Result<ExchangedTokens> {
    let mut form_data = HashMap::new();
    form_data.insert("grant_type", "refresh_token");
    form_data.insert("refresh_token", refresh_token);
    form_data.insert("client_id", google.client_id.as_str());
    form_data.insert("client_secret", google.client_secret.as_str());

    tracing::debug!("Refreshing access token at {}", google.token_url);

    let response = http_client()
        .post(&google.token_url)
        .header("Accept", "application/json")
        .form(&form_data)
        .send()
        .await
        .context("Failed to send token refresh request")?;

    if !response.status().is_success() {
        let status = response.status();
        return Err(anyhow!("Token refresh failed with status {}", status));
    }

    let token_response: TokenResponse = response
        .json()
        .await
        .context("Failed to parse refresh response")?;

    Ok(token_response.into_tokens())
}

/// Fetch the authenticated user's email and display name.
pub async fn fetch_user_info(
    google: &GoogleOAuthConfig,
    access_token: &str,
) -> Result<UserInfo> {
    let response = http_client()
        .get(&google.userinfo_url)
        .bearer_auth(access_token)
        .send()
        .await
        .context("Failed to send userinfo request")?;

    if !response.status().is_success() {
        let status = response.status();
        return Err(anyhow!("Userinfo request failed with status {}", status));
    }

    response
        .json::<UserInfo>()
        .await
        .context("Failed to parse userinfo response")
}
