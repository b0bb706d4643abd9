//! Ephemeral, single-use credentials.
//!
//! Verification codes and password-reset tokens live in the shared store
//! under `email:verify:{address}` / `email:reset:{address}` with short
//! TTLs. At most one credential is live per (purpose, recipient): a new
//! request overwrites the previous entry and resets its TTL. A successful
//! verification consumes the entry; a mismatch leaves it in place so the
//! user can retry within the TTL.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::store::{Store, StoreError};

/// What a stored credential authorizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    /// Email-address verification code.
    EmailVerify,
    /// Password-reset token.
    PasswordReset,
}

impl Purpose {
    /// Store key for this purpose and recipient.
    pub fn key(&self, recipient: &str) -> String {
        match self {
            Self::EmailVerify => format!("email:verify:{recipient}"),
            Self::PasswordReset => format!("email:reset:{recipient}"),
        }
    }

    /// TTL applied when the caller does not override it.
    pub fn default_ttl(&self) -> Duration {
        match self {
            Self::EmailVerify => Duration::from_secs(15 * 60),
            Self::PasswordReset => Duration::from_secs(30 * 60),
        }
    }
}

/// Six-digit numeric verification code, zero-padded.
pub fn generate_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

/// 32-hex-character reset token.
pub fn generate_token() -> String {
    format!("{:032x}", rand::thread_rng().gen::<u128>())
}

/// TTL-scoped credential storage over the shared store.
#[derive(Clone)]
pub struct CredentialStore {
    backend: Arc<dyn Store>,
}

impl CredentialStore {
    pub fn new(backend: Arc<dyn Store>) -> Self {
        Self { backend }
    }

    /// Store a credential, overwriting any live one for the same
    /// (purpose, recipient) and resetting its TTL.
    pub async fn store(
        &self,
        purpose: Purpose,
        recipient: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<(), StoreError> {
        let ttl = ttl.unwrap_or_else(|| purpose.default_ttl());
        self.backend
            .set_with_ttl(&purpose.key(recipient), value, ttl)
            .await
    }

    /// Check `candidate` against the stored credential.
    ///
    /// Missing or expired entries and mismatches yield `false`; only a
    /// match consumes the entry. A missing or expired entry is a normal
    /// outcome, not an error.
    pub async fn verify(
        &self,
        purpose: Purpose,
        recipient: &str,
        candidate: &str,
    ) -> Result<bool, StoreError> {
        let key = purpose.key(recipient);
        match self.backend.get(&key).await? {
            Some(stored) if stored == candidate => {
                self.backend.delete(&key).await?;
                Ok(true)
            }
            Some(_) => Ok(false),
            None => Ok(false),
        }
    }
}
