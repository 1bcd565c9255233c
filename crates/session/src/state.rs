//! In-process view of the persisted session
//!
//! [`SessionState`] is the only writer of the session keys. It mirrors the
//! current user into a [`watch`] channel so observers can react to sign-in,
//! selection and sign-out without polling storage.

use crate::codec;
use crate::storage::{KeyValueStorage, StorageError};
use crate::store::SessionStore;
use chrono::{DateTime, Utc};
use corretaje_core::{CompanyAssociation, User};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Point-in-time copy of the session, consumed by the route guards
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    pub pending_companies: Vec<CompanyAssociation>,
}

impl SessionSnapshot {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn needs_company_selection(&self) -> bool {
        self.user
            .as_ref()
            .is_some_and(|user| user.requires_company_selection)
    }

    pub fn is_super_admin(&self) -> bool {
        self.user.as_ref().is_some_and(|user| user.is_super_admin)
    }
}

pub struct SessionState {
    store: SessionStore,
    user: watch::Sender<Option<User>>,
}

impl SessionState {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        let (user, _) = watch::channel(None);
        Self {
            store: SessionStore::new(storage),
            user,
        }
    }

    /// Persist a full session and publish its user
    pub fn persist(
        &self,
        token: &str,
        user: User,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        self.store.persist(token, &user, expires_at)?;
        self.user.send_replace(Some(user));
        Ok(())
    }

    pub fn set_pending(&self, companies: &[CompanyAssociation]) -> Result<(), StorageError> {
        self.store.persist_pending(companies)
    }

    /// Drop every session key and publish the anonymous state
    pub fn clear(&self) {
        if let Err(e) = self.store.clear() {
            error!("Failed to clear session storage: {e}");
        }
        self.user.send_replace(None);
    }

    /// Rebuild the in-memory user from storage.
    ///
    /// An expired or undecodable token clears the whole session. A missing or
    /// corrupt stored user is re-derived from the token claims.
    pub fn restore(&self) -> Option<User> {
        let Some(session) = self.store.read() else {
            debug!("No stored session");
            self.clear();
            return None;
        };

        if session.is_expired_at(Utc::now()) {
            info!("Stored session has expired");
            self.clear();
            return None;
        }

        let claims = match codec::decode(&session.token) {
            Ok(claims) => claims,
            Err(e) => {
                warn!("Stored token is invalid: {e}");
                self.clear();
                return None;
            }
        };

        let user = match session.user {
            Some(user) => user,
            None => {
                debug!("Re-deriving session user from token claims");
                claims.to_user()
            }
        };

        if !user.requires_company_selection && !session.pending_companies.is_empty() {
            debug!("Dropping stale pending companies");
            if let Err(e) = self.store.persist_pending(&[]) {
                warn!("Failed to drop stale pending companies: {e}");
            }
        }

        info!(email = %user.email, "Session restored");
        self.user.send_replace(Some(user.clone()));
        Some(user)
    }

    /// User of a live session.
    ///
    /// A missing or expired token clears the session. If nothing has been
    /// loaded yet the session is restored from storage first.
    pub fn current_user(&self) -> Option<User> {
        let token = self.store.token();
        if token.is_none() || self.store.is_expired() {
            let loaded = self.user.borrow().is_some();
            if loaded || token.is_some() {
                info!("Session is no longer valid");
                self.clear();
            }
            return None;
        }

        let loaded = self.user.borrow().clone();
        loaded.or_else(|| self.restore())
    }

    /// Bearer token of a live session
    pub fn token(&self) -> Option<String> {
        self.current_user()?;
        self.store.token()
    }

    /// Companies awaiting a choice; empty unless selection is required
    pub fn pending_companies(&self) -> Vec<CompanyAssociation> {
        self.snapshot().pending_companies
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let Some(user) = self.current_user() else {
            return SessionSnapshot::anonymous();
        };

        let pending_companies = if user.requires_company_selection {
            self.store
                .read()
                .map(|session| session.pending_companies)
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        SessionSnapshot {
            user: Some(user),
            pending_companies,
        }
    }

    /// Receive the current user on every change
    pub fn subscribe(&self) -> watch::Receiver<Option<User>> {
        self.user.subscribe()
    }
}
