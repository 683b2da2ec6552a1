//! Explicit session context
//!
//! The single owner of auth-token state. Populated at login, cleared at
//! logout; the API adapter reads and rotates tokens only through this type.
//! Tokens live in the encrypted preference store so they survive restarts
//! without sitting in plaintext on disk.

use std::sync::Arc;

use crate::errors::AppError;
use crate::log_warn;
use crate::prefs::PrefStore;

const ACCESS_TOKEN_KEY: &str = "session.access_token";
const REFRESH_TOKEN_KEY: &str = "session.refresh_token";

#[derive(Clone)]
pub struct SessionContext {
    prefs: Arc<PrefStore>,
}

impl SessionContext {
    pub fn new(prefs: Arc<PrefStore>) -> Self {
        Self { prefs }
    }

    /// Store both tokens after a successful login. A persist failure is an
    /// error: reporting success while the session would not survive a
    /// restart misleads the caller.
    pub fn login(&self, access: &str, refresh: &str) -> Result<(), AppError> {
        self.prefs.set_encrypted(ACCESS_TOKEN_KEY, &access)?;
        self.prefs.set_encrypted(REFRESH_TOKEN_KEY, &refresh)?;
        Ok(())
    }

    /// Drop both tokens.
    pub fn logout(&self) {
        self.prefs.remove(ACCESS_TOKEN_KEY);
        self.prefs.remove(REFRESH_TOKEN_KEY);
    }

    pub fn access_token(&self) -> Option<String> {
        self.prefs.get_decrypted(ACCESS_TOKEN_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.prefs.get_decrypted(REFRESH_TOKEN_KEY)
    }

    /// Rotate the access token after a successful refresh. The rotated
    /// token stays usable in memory even if the persist fails, so this
    /// logs instead of failing the request that triggered the refresh.
    pub fn store_access_token(&self, access: &str) {
        if let Err(e) = self.prefs.set_encrypted(ACCESS_TOKEN_KEY, &access) {
            log_warn!(
                "SESSION",
                &format!("Failed to persist rotated access token: {}", e)
            );
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.access_token().is_some()
    }
}
