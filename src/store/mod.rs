//! In-memory credential store.
//!
//! Holds one `CredentialRecord` per authenticated user, keyed by email.
//! Authenticated requests look records up by access token; the token refresh
//! flow mutates tokens in place so every later lookup observes the update.
//!
//! # Thread Safety
//! Backed by a `DashMap`; lookups and writes from concurrently handled
//! requests are serialized per shard without a global lock.
//!
//! # Persistence
//! None. Contents are lost on restart and users re-login; this is an
//! accepted limitation of the deployment, not a bug.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

/// One authenticated user's delegated credentials.
#[derive(Debug, Clone, PartialEq)]
pub struct CredentialRecord {
    /// Google account email, unique store key
    pub email: String,
    /// Display name from the Google profile
    pub name: String,
    /// The user's YouTube channel ID, immutable once discovered
    pub channel_id: String,
    /// Short-lived bearer token, sole lookup key for authenticated requests
    pub access_token: String,
    /// Long-lived token issued once at first consent; never reissued
    pub refresh_token: String,
    /// Absolute expiry of `access_token`, if the provider reported one
    pub token_expiry: Option<DateTime<Utc>>,
}

/// Process-local store of credential records.
pub struct SessionStore {
    records: DashMap<String, CredentialRecord>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Upsert a record by email.
    ///
    /// Replace semantics: a concurrent second login for the same email wins
    /// wholesale (last writer), so the store never holds two records for one
    /// identity.
    pub fn insert_or_replace(&self, record: CredentialRecord) {
        self.records.insert(record.email.clone(), record);
    }

    /// Look up the record whose access token matches exactly.
    ///
    /// Linear in the number of live records, which is bounded by the number
    /// of logged-in users of a single process.
    pub fn find_by_access_token(&self, token: &str) -> Option<CredentialRecord> {
        self.records
            .iter()
            .find(|entry| entry.value().access_token == token)
            .map(|entry| entry.value().clone())
    }

    pub fn find_by_email(&self, email: &str) -> Option<CredentialRecord> {
        self.records.get(email).map(|entry| entry.value().clone())
    }

    /// Replace the access token and expiry of an existing record in place.
    ///
    /// All other fields, including the refresh token, are untouched.
    /// Returns false if no record exists for the email.
    pub fn update_tokens(
        &self,
        email: &str,
        new_access_token: String,
        new_expiry: Option<DateTime<Utc>>,
    ) -> bool {
        match self.records.get_mut(email) {
            Some(mut record) => {
                record.access_token = new_access_token;
                record.token_expiry = new_expiry;
                true
            }
            None => false,
        }
    }

    /// Remove a record. Idempotent: returns false if it was already gone.
    pub fn delete(&self, email: &str) -> bool {
        self.records.remove(email).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
