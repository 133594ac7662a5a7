use std::fmt;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::errors::AuthError;

/// Lifetime in minutes applied when a caller does not pick one.
///
/// The login flow never relies on this; it always passes the configured
/// access-token lifetime explicitly.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 15;

/// Lifetime of access tokens handed out by login unless configured otherwise.
pub const DEFAULT_ACCESS_TOKEN_TTL_MINUTES: i64 = 30;

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject of the token. This application uses the user's email.
    pub sub: String,
    /// Expiration timestamp (seconds since epoch) for the token.
    pub exp: i64,
}

/// Signing material and expiry policy, fixed for the life of the process.
#[derive(Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub access_token_ttl: Duration,
}

impl TokenConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_token_ttl: Duration::minutes(DEFAULT_ACCESS_TOKEN_TTL_MINUTES),
        }
    }

    pub fn with_access_token_ttl(mut self, ttl: Duration) -> Self {
        self.access_token_ttl = ttl;
        self
    }
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("access_token_ttl", &self.access_token_ttl)
            .finish()
    }
}

/// Issues and verifies HS256 bearer tokens.
///
/// The service owns the only copy of the signing keys. Verification checks
/// the signature before looking at the expiry, so a token signed with another
/// secret is always [`AuthError::Invalid`], never [`AuthError::Expired`].
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_token_ttl: Duration,
}

impl TokenService {
    pub fn new(config: TokenConfig) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // Expiry is checked by hand below: jsonwebtoken accepts `exp == now`
        // and applies a default leeway, both of which would extend a token's life.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            access_token_ttl: config.access_token_ttl,
        }
    }

    /// Lifetime the login flow should request for access tokens.
    pub fn access_token_ttl(&self) -> Duration {
        self.access_token_ttl
    }

    /// Signs a token for `subject` that expires `ttl` from now.
    ///
    /// `None` falls back to [`DEFAULT_TOKEN_TTL_MINUTES`]. A zero or negative
    /// `ttl` produces a token that is already expired.
    pub fn issue(&self, subject: &str, ttl: Option<Duration>) -> Result<String, AuthError> {
        let ttl = ttl.unwrap_or_else(|| Duration::minutes(DEFAULT_TOKEN_TTL_MINUTES));
        let claims = Claims {
            sub: subject.to_string(),
            exp: Utc::now().timestamp() + ttl.num_seconds(),
        };

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Checks signature and expiry, returning the subject claim.
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("Token rejected: {:?}", e.kind());
                AuthError::Invalid
            })?;

        if claims.sub.is_empty() {
            log::debug!("Token rejected: empty subject claim");
            return Err(AuthError::Invalid);
        }
        if Utc::now().timestamp() >= claims.exp {
            return Err(AuthError::Expired);
        }

        Ok(claims.sub)
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &ALGORITHM)
            .field("access_token_ttl", &self.access_token_ttl)
            .finish_non_exhaustive()
    }
}
