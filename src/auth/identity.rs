use std::sync::Arc;

use crate::auth::errors::AuthError;
use crate::auth::token::TokenService;
use crate::models::User;
use crate::store::Store;

/// Turns a presented bearer token into the user it speaks for.
///
/// Nothing is cached: every call re-verifies the token and reloads the user,
/// so a user deleted after issuance is rejected on their next request.
#[derive(Clone)]
pub struct IdentityResolver {
    tokens: TokenService,
    store: Arc<dyn Store>,
}

impl IdentityResolver {
    pub fn new(tokens: TokenService, store: Arc<dyn Store>) -> Self {
        Self { tokens, store }
    }

    pub async fn resolve(&self, token: &str) -> Result<User, AuthError> {
        let subject = self.tokens.verify(token)?;

        match self.store.find_user_by_email(&subject).await? {
            Some(user) => Ok(user),
            None => Err(AuthError::UnknownSubject),
        }
    }
}
