use std::sync::Arc;

use crate::auth::{CredentialManager, IdentityResolver, TokenService};
use crate::store::Store;

/// Shared, read-only application services handed to every worker.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: TokenService,
    pub credentials: CredentialManager,
    pub identity: IdentityResolver,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, tokens: TokenService, credentials: CredentialManager) -> Self {
        let identity = IdentityResolver::new(tokens.clone(), Arc::clone(&store));
        Self {
            store,
            tokens,
            credentials,
            identity,
        }
    }
}
