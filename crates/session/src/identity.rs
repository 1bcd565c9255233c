//! Identity providers

use async_trait::async_trait;
use corretaje_core::{BackendError, BackendResult, IdentityProvider};
use tracing::debug;

/// Provider that hands out a token obtained out of band.
///
/// The CLI uses it with a token from configuration; the interactive sign-in
/// flow of the upstream identity service is not reproduced here.
#[derive(Clone)]
pub struct StaticIdentityProvider {
    id_token: String,
}

impl StaticIdentityProvider {
    pub fn new(id_token: impl Into<String>) -> Self {
        Self {
            id_token: id_token.into(),
        }
    }
}

impl std::fmt::Debug for StaticIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticIdentityProvider")
            .field("id_token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn id_token(&self, email: &str, _password: &str) -> BackendResult<String> {
        if self.id_token.trim().is_empty() {
            return Err(BackendError::identity("no identity token configured"));
        }
        debug!(%email, "Using configured identity token");
        Ok(self.id_token.clone())
    }
}
