//! Login, company selection, logout and restore

use crate::associations::normalize_associations;
use crate::codec::{self, Claims};
use crate::config::SessionConfig;
use crate::state::{SessionSnapshot, SessionState};
use crate::storage::KeyValueStorage;
use chrono::{DateTime, Utc};
use corretaje_core::{
    AuthBackend, CompanyAssociation, IdentityProvider, LoginRequest, RawAssociation, User,
};
use std::fmt::Display;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Failures surfaced to callers.
///
/// Causes are logged where they happen and deliberately not carried here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("login failed")]
    LoginFailed,

    #[error("selection failed")]
    SelectionFailed,
}

/// Where a successful login leaves the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginOutcome {
    pub is_super_admin: bool,
    pub needs_selection: bool,
}

pub struct SessionService {
    backend: Arc<dyn AuthBackend>,
    identity: Arc<dyn IdentityProvider>,
    state: SessionState,
    config: SessionConfig,
}

impl SessionService {
    pub fn new(
        backend: Arc<dyn AuthBackend>,
        identity: Arc<dyn IdentityProvider>,
        storage: Arc<dyn KeyValueStorage>,
    ) -> Self {
        Self {
            backend,
            identity,
            state: SessionState::new(storage),
            config: SessionConfig::default(),
        }
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    /// Sign in with email and password.
    ///
    /// Explicit `isSuperAdmin`/`needsSelection` flags in the login response
    /// override the values derived from the token claims.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, SessionError> {
        info!(%email, "Signing in");
        let failed = |stage: &str, cause: &dyn Display| {
            error!(%email, "Login failed at {stage}: {cause}");
            SessionError::LoginFailed
        };

        let id_token = self
            .identity
            .id_token(email, password)
            .await
            .map_err(|e| failed("identity provider", &e))?;

        let request = LoginRequest {
            id_token,
            email: email.to_string(),
            password: password.to_string(),
        };
        let payload = self.backend.login(&request).await.map_err(|e| {
            if e.is_unauthorized() {
                warn!(%email, "Credentials were rejected");
            }
            failed("authentication endpoint", &e)
        })?;

        let claims = codec::decode(&payload.token).map_err(|e| failed("token decoding", &e))?;
        let expires_at = self
            .expiration(&claims)
            .map_err(|e| failed("token decoding", &e))?;

        let mut user = claims.to_user();
        if let Some(is_super_admin) = payload.is_super_admin {
            user.is_super_admin = is_super_admin;
        }
        if let Some(needs_selection) = payload.needs_selection {
            user.requires_company_selection = needs_selection;
        }

        let outcome = LoginOutcome {
            is_super_admin: user.is_super_admin,
            needs_selection: user.requires_company_selection,
        };

        self.state
            .persist(&payload.token, user, expires_at)
            .map_err(|e| failed("session storage", &e))?;

        let pending = if outcome.needs_selection {
            self.fetch_pending(&payload.token, &payload.companias).await
        } else {
            Vec::new()
        };
        if let Err(e) = self.state.set_pending(&pending) {
            error!("Failed to store pending companies: {e}");
        }

        info!(
            %email,
            is_super_admin = outcome.is_super_admin,
            needs_selection = outcome.needs_selection,
            pending = pending.len(),
            "Signed in"
        );
        Ok(outcome)
    }

    /// Scope the session to `company_id`
    pub async fn select_company(&self, company_id: &str) -> Result<User, SessionError> {
        let failed = |stage: &str, cause: &dyn Display| {
            error!(%company_id, "Company selection failed at {stage}: {cause}");
            SessionError::SelectionFailed
        };

        let company_id = company_id.trim();
        if company_id.is_empty() {
            return Err(failed("input", &"empty company id"));
        }

        let token = self
            .state
            .token()
            .ok_or_else(|| failed("session", &"no active session"))?;

        let payload = self
            .backend
            .select_company(&token, company_id)
            .await
            .map_err(|e| {
                if e.is_unauthorized() {
                    warn!(%company_id, "Company selection was refused for this session");
                }
                failed("authentication endpoint", &e)
            })?;

        let claims = codec::decode(&payload.token).map_err(|e| failed("token decoding", &e))?;
        let expires_at = self
            .expiration(&claims)
            .map_err(|e| failed("token decoding", &e))?;

        let mut user = claims.to_user();
        user.requires_company_selection = false;

        self.state
            .persist(&payload.token, user.clone(), expires_at)
            .map_err(|e| failed("session storage", &e))?;
        if let Err(e) = self.state.set_pending(&[]) {
            error!("Failed to clear pending companies: {e}");
        }

        info!(
            email = %user.email,
            company_id = user.company_id.as_deref().unwrap_or(company_id),
            "Company selected"
        );
        Ok(user)
    }

    pub fn logout(&self) {
        self.state.clear();
        info!("Signed out");
    }

    /// Reload the session persisted by an earlier run
    pub fn restore_session(&self) -> Option<User> {
        self.state.restore()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.current_user().is_some()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.current_user()
    }

    pub fn needs_company_selection(&self) -> bool {
        self.state
            .current_user()
            .is_some_and(|user| user.requires_company_selection)
    }

    pub fn pending_companies(&self) -> Vec<CompanyAssociation> {
        self.state.pending_companies()
    }

    pub fn token(&self) -> Option<String> {
        self.state.token()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.state.subscribe()
    }

    /// Expiration for a freshly issued token
    fn expiration(&self, claims: &Claims) -> Result<DateTime<Utc>, &'static str> {
        let now = Utc::now();
        let expires_at = match claims.expires_at() {
            Some(expires_at) => expires_at,
            None => now
                .checked_add_signed(self.config.session_window)
                .ok_or("session window overflows the calendar")?,
        };
        if expires_at < now {
            return Err("token is already expired");
        }
        Ok(expires_at)
    }

    /// Authoritative association list, or the one embedded in the login
    /// response when the lookup fails or comes back empty
    async fn fetch_pending(
        &self,
        token: &str,
        embedded: &[RawAssociation],
    ) -> Vec<CompanyAssociation> {
        match self.backend.list_associations(token).await {
            Ok(records) => {
                let associations = normalize_associations(&records);
                if !associations.is_empty() {
                    return associations;
                }
                debug!("Association lookup returned nothing usable, using login response");
            }
            Err(e) => warn!("Association lookup failed, using login response: {e}"),
        }
        normalize_associations(embedded)
    }
}
