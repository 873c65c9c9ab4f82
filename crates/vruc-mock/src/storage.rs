//! In-memory storage for authorization codes and access tokens
//!
//! Nothing here is persisted; a restart forgets every code and token.
//! Entries are never evicted, only removed when a code is consumed.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Why a stored code or token could not be used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("not found")]
    Missing,
    #[error("expired")]
    Expired,
}

/// A pending authorization code
#[derive(Debug, Clone)]
pub struct StoredAuthCode {
    pub client_id: String,
    pub redirect_uri: String,
    pub scope: String,
    pub expires_at: DateTime<Utc>,
}

/// An issued access token
#[derive(Debug, Clone)]
pub struct StoredToken {
    pub uid: String,
    pub scope: String,
    pub expires_at: DateTime<Utc>,
}

/// Single expiry rule shared by codes and tokens. Valid up to and including `expires_at`.
pub fn is_expired(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    expires_at < now
}

/// Storage for OAuth data, keyed by the hash of the raw code/token
#[derive(Debug, Default)]
pub struct Storage {
    /// Pending authorization codes
    auth_codes: Mutex<HashMap<String, StoredAuthCode>>,
    /// Issued access tokens
    tokens: Mutex<HashMap<String, StoredToken>>,
}

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    // --- Authorization Code Management ---

    /// Store a new authorization code
    pub fn store_auth_code(&self, code: &str, auth_code: StoredAuthCode) {
        lock(&self.auth_codes).insert(hash_token(code), auth_code);
    }

    /// Consume an authorization code.
    ///
    /// The code is removed before its expiry is checked, so an expired code
    /// is gone after this call just like a used one.
    pub fn consume_auth_code(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<StoredAuthCode, LookupError> {
        let auth_code = lock(&self.auth_codes)
            .remove(&hash_token(code))
            .ok_or(LookupError::Missing)?;
        if is_expired(auth_code.expires_at, now) {
            return Err(LookupError::Expired);
        }
        Ok(auth_code)
    }

    pub fn pending_codes(&self) -> usize {
        lock(&self.auth_codes).len()
    }

    // --- Token Management ---

    /// Store a new access token
    pub fn store_token(&self, token: &str, stored: StoredToken) {
        lock(&self.tokens).insert(hash_token(token), stored);
    }

    /// Look up a token, checking it against the stored expiry
    pub fn validate_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<StoredToken, LookupError> {
        let tokens = lock(&self.tokens);
        let stored = tokens.get(&hash_token(token)).ok_or(LookupError::Missing)?;
        if is_expired(stored.expires_at, now) {
            return Err(LookupError::Expired);
        }
        Ok(stored.clone())
    }

    pub fn issued_tokens(&self) -> usize {
        lock(&self.tokens).len()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// --- Utility Functions ---

/// Generate a URL-safe random string from `bytes` bytes of randomness
pub fn generate_random_string(bytes: usize) -> String {
    use rand::Rng;
    let mut buf = vec![0u8; bytes];
    rand::rng().fill(buf.as_mut_slice());
    base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, buf)
}

/// Hash a token/code for storage (we don't store raw tokens)
pub fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let result = hasher.finalize();
    base64::Engine::encode(&base64::engine::general_purpose::URL_SAFE_NO_PAD, result)
}
