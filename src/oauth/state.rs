//! Pending-auth state management for CSRF protection.
//!
//! A state token is issued when a login starts and must come back on the
//! callback. Tokens are single-use and expire after a TTL.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Pending login attempts, keyed by state token.
#[derive(Clone)]
pub struct StateManager {
    pending: Arc<Mutex<HashMap<String, DateTime<Utc>>>>,
    expiry_duration: Duration,
}

impl StateManager {
    pub fn new(expiry_seconds: i64) -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
            expiry_duration: Duration::seconds(expiry_seconds),
        }
    }

    /// Issue a new state token for one login attempt.
    pub fn create_state(&self) -> String {
        let state = Uuid::new_v4().to_string();
        let mut pending = self.pending.lock().unwrap();
        pending.insert(state.clone(), Utc::now());
        state
    }

    /// Validate and consume a state token.
    ///
    /// Returns true if the token was issued by us and has not expired.
    /// The token is removed either way (single-use).
    pub fn validate_and_consume(&self, state: &str) -> bool {
        let mut pending = self.pending.lock().unwrap();
        match pending.remove(state) {
            Some(created_at) => Utc::now() - created_at <= self.expiry_duration,
            None => false,
        }
    }

    /// Drop expired tokens (abandoned login attempts).
    pub fn cleanup_expired(&self) {
        let mut pending = self.pending.lock().unwrap();
        let now = Utc::now();
        pending.retain(|_, created_at| now - *created_at <= self.expiry_duration);
    }

    pub fn count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }
}

/// Background task to periodically clean up expired state tokens.
pub async fn run_state_cleanup(manager: StateManager, interval_seconds: u64) {
    let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(interval_seconds));

    loop {
        interval.tick().await;
        manager.cleanup_expired();
        tracing::debug!(
            pending = manager.count(),
            "OAuth state cleanup complete"
        );
    }
}
