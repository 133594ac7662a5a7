use std::sync::Arc;

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::auth::errors::CredentialError;

/// bcrypt only looks at the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hashes and verifies user passwords.
///
/// The rest of the application only ever sees opaque hash strings, so the
/// algorithm stays swappable behind this type.
#[derive(Debug, Clone)]
pub struct CredentialManager {
    cost: u32,
    /// Hash at the configured cost, checked when no stored hash exists.
    decoy_hash: Arc<str>,
}

const DECOY_PASSWORD: &str = "taskforge-decoy-credential";

impl CredentialManager {
    pub fn new(cost: u32) -> Self {
        let decoy_hash = hash(DECOY_PASSWORD, cost).unwrap_or_else(|e| {
            log::warn!("Could not prepare decoy hash at cost {}: {}", cost, e);
            String::new()
        });
        Self {
            cost,
            decoy_hash: decoy_hash.into(),
        }
    }

    /// Produces a salted bcrypt hash of `password`.
    ///
    /// Empty passwords and passwords longer than [`MAX_PASSWORD_BYTES`] are
    /// rejected instead of being truncated.
    pub fn hash(&self, password: &str) -> Result<String, CredentialError> {
        if password.is_empty() {
            return Err(CredentialError::HashingFailed(
                "password must not be empty".into(),
            ));
        }
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(CredentialError::HashingFailed(format!(
                "password exceeds {} bytes",
                MAX_PASSWORD_BYTES
            )));
        }
        hash(password, self.cost).map_err(|e| CredentialError::HashingFailed(e.to_string()))
    }

    /// Checks `password` against a stored hash.
    ///
    /// bcrypt compares digests in constant time. A hash that cannot be parsed
    /// is reported as a mismatch.
    /// Passwords over [`MAX_PASSWORD_BYTES`] never match, but still pay for a
    /// full comparison.
    pub fn verify(&self, password: &str, hashed_password: &str) -> bool {
        if password.len() > MAX_PASSWORD_BYTES {
            let _ = verify(&password.as_bytes()[..MAX_PASSWORD_BYTES], hashed_password);
            return false;
        }
        match verify(password, hashed_password) {
            Ok(matches) => matches,
            Err(e) => {
                log::warn!("Rejecting malformed password hash: {}", e);
                false
            }
        }
    }

    /// Like [`verify`](Self::verify), for a lookup that may have found nothing.
    ///
    /// A missing hash is compared against the decoy so both outcomes cost one
    /// bcrypt run, and always yields `false`.
    pub fn verify_stored(&self, password: &str, hashed_password: Option<&str>) -> bool {
        match hashed_password {
            Some(hashed_password) => self.verify(password, hashed_password),
            None => {
                let _ = self.verify(password, &self.decoy_hash);
                false
            }
        }
    }
}

impl Default for CredentialManager {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}
