//! Session lifecycle for the brokerage back office
//!
//! The pieces, bottom up:
//!
//! - [`codec`] reads the claims out of a bearer token
//! - [`store`] keeps the session in a [`KeyValueStorage`]
//! - [`SessionService`] drives login, company selection, logout and restore
//! - [`guards`] decide whether a navigation target is allowed
//!
//! Guards never touch storage; they evaluate a [`SessionSnapshot`] taken from
//! the service.

pub mod associations;
pub mod codec;
pub mod config;
pub mod guards;
pub mod identity;
pub mod service;
pub mod state;
pub mod storage;
pub mod store;

pub use associations::normalize_associations;
pub use codec::{Claims, DecodeError, decode};
pub use config::SessionConfig;
pub use guards::{Decision, RouteGuard};
pub use identity::StaticIdentityProvider;
pub use service::{LoginOutcome, SessionError, SessionService};
pub use state::{SessionSnapshot, SessionState};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
pub use store::{PersistedSession, SessionStore};
