//! In-memory token store shared by every component of a session.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::blum::structs::AuthToken;

/// Holds the live [`AuthToken`] of one session.
///
/// Cloning shares the same store: the requester reads the bearer header from it
/// on every request, so a refresh is visible to the next call of any component.
/// Only the auth session writes to it.
#[derive(Clone, Default)]
pub struct AuthContext {
    token: Arc<RwLock<Option<AuthToken>>>,
}

impl AuthContext {
    /// Create an empty, unauthenticated context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current token, if any.
    pub async fn install(&self, token: AuthToken) {
        *self.token.write().await = Some(token);
    }

    /// Value of the `Authorization` header, `None` before login.
    pub async fn bearer(&self) -> Option<String> {
        self.token
            .read()
            .await
            .as_ref()
            .map(|token| format!("Bearer {}", token.access))
    }

    /// Refresh credential of the current token.
    pub async fn refresh_token(&self) -> Option<String> {
        self.token
            .read()
            .await
            .as_ref()
            .map(|token| token.refresh.clone())
    }

    #[cfg(test)]
    pub async fn is_authenticated(&self) -> bool {
        self.token.read().await.is_some()
    }
}
