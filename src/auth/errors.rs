//! Error kinds produced by the authentication core.
//!
//! These stay independent of HTTP. The conversion into client-facing
//! responses lives in `crate::error`, which collapses every token failure into
//! the same generic 401 so callers cannot tell an expired token from a forged one.

use thiserror::Error;

use crate::store::StoreError;

/// Failure to turn a plaintext password into a stored hash.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("password could not be hashed: {0}")]
    HashingFailed(String),
}

/// Failure while issuing a token, verifying it, or resolving its subject.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Bad signature, malformed token, or missing subject claim.
    #[error("token is invalid")]
    Invalid,
    /// Signature verified but `now >= exp`.
    #[error("token has expired")]
    Expired,
    /// Token verified but no user matches its subject.
    #[error("token subject does not match any user")]
    UnknownSubject,
    /// Login with a wrong password or an unknown email.
    #[error("incorrect email or password")]
    BadCredentials,
    #[error("failed to sign token: {0}")]
    Signing(String),
    /// Infrastructure failure while looking up the subject.
    #[error("identity lookup failed: {0}")]
    Store(#[source] StoreError),
}

impl From<StoreError> for AuthError {
    fn from(error: StoreError) -> Self {
        match error {
            // A lookup that times out is treated like a lookup that found nothing.
            StoreError::Timeout => AuthError::UnknownSubject,
            other => AuthError::Store(other),
        }
    }
}
