use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::service::MessageService;

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub service: MessageService,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(service: MessageService, verifier: TokenVerifier) -> Self {
        Self {
            service,
            verifier: Arc::new(verifier),
        }
    }
}
