// Bearer token extraction
pub mod auth;

// Startup configuration
pub mod config;

// In-memory credential store
pub mod store;

// Google OAuth flow (login, callback, token refresh)
pub mod oauth;

// YouTube Data API client
pub mod youtube;

// Comment summarization via OpenAI
pub mod summarize;

// HTTP API
pub mod api;
