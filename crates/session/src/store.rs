//! Durable session record

use crate::storage::{KeyValueStorage, StorageError};
use chrono::{DateTime, SecondsFormat, Utc};
use corretaje_core::{CompanyAssociation, User};
use std::sync::Arc;
use tracing::{error, warn};

/// Storage keys owned by the session
pub mod keys {
    pub const TOKEN: &str = "token";
    pub const TOKEN_EXPIRATION: &str = "token_expiration";
    pub const USER: &str = "user";
    pub const PENDING_COMPANIES: &str = "pending_companies";

    pub const ALL: [&str; 4] = [TOKEN, TOKEN_EXPIRATION, USER, PENDING_COMPANIES];
}

/// Session as read back from storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSession {
    pub token: String,
    /// `None` when missing or unparsable
    pub expires_at: Option<DateTime<Utc>>,
    /// `None` when missing or corrupt
    pub user: Option<User>,
    pub pending_companies: Vec<CompanyAssociation>,
}

impl PersistedSession {
    /// Missing expiration counts as expired
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expires_at| expires_at < now)
    }
}

/// Reads and writes the four session keys
#[derive(Clone)]
pub struct SessionStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Write token, expiration and user together
    pub fn persist(
        &self,
        token: &str,
        user: &User,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let serialized_user = serde_json::to_string(user)?;
        self.storage.set(keys::TOKEN, token)?;
        self.storage
            .set(keys::TOKEN_EXPIRATION, &format_expiration(expires_at))?;
        self.storage.set(keys::USER, &serialized_user)?;
        Ok(())
    }

    /// Replace the pending company list; an empty list removes the key
    pub fn persist_pending(&self, companies: &[CompanyAssociation]) -> Result<(), StorageError> {
        if companies.is_empty() {
            return self.storage.remove(keys::PENDING_COMPANIES);
        }
        let serialized = serde_json::to_string(companies)?;
        self.storage.set(keys::PENDING_COMPANIES, &serialized)
    }

    /// Stored token, if any
    pub fn token(&self) -> Option<String> {
        match self.storage.get(keys::TOKEN) {
            Ok(token) => token.filter(|token| !token.is_empty()),
            Err(e) => {
                error!("Failed to read session token: {e}");
                None
            }
        }
    }

    /// Stored expiration, if present and parsable
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match self.storage.get(keys::TOKEN_EXPIRATION) {
            Ok(value) => value.as_deref().and_then(parse_expiration),
            Err(e) => {
                error!("Failed to read session expiration: {e}");
                None
            }
        }
    }

    /// Read the whole session.
    ///
    /// Returns `None` when there is no token. A corrupt user or pending list is
    /// dropped from storage and reported as absent without invalidating the
    /// token.
    pub fn read(&self) -> Option<PersistedSession> {
        let token = self.token()?;

        Some(PersistedSession {
            token,
            expires_at: self.expires_at(),
            user: self.read_json(keys::USER),
            pending_companies: self
                .read_json(keys::PENDING_COMPANIES)
                .unwrap_or_default(),
        })
    }

    /// Remove every session key
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut result = Ok(());
        for key in keys::ALL {
            if let Err(e) = self.storage.remove(key) {
                error!("Failed to remove {key} from session storage: {e}");
                result = Err(e);
            }
        }
        result
    }

    /// Whether the stored expiration has passed; missing counts as expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at()
            .is_none_or(|expires_at| expires_at < now)
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.storage.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                error!("Failed to read {key} from session storage: {e}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Discarding corrupt {key} in session storage: {e}");
                if let Err(e) = self.storage.remove(key) {
                    error!("Failed to remove corrupt {key}: {e}");
                }
                None
            }
        }
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix
pub fn format_expiration(expires_at: DateTime<Utc>) -> String {
    expires_at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn parse_expiration(value: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(value.trim()) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        Err(e) => {
            warn!("Unparsable session expiration {value:?}: {e}");
            None
        }
    }
}
