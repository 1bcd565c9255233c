//! Corretaje core types and backend traits
//!
//! Shared by the HTTP client (which implements [`AuthBackend`]) and the
//! session crate (which consumes it).

pub mod backend;
pub mod error;
pub mod types;

pub use backend::{AuthBackend, IdentityProvider};
pub use error::{BackendError, BackendResult};
pub use types::{
    CompanyAssociation, EntityRef, LoginPayload, LoginRequest, RawAssociation, RawEntity,
    SelectCompanyPayload, SelectCompanyRequest, User,
};

#[cfg(any(test, feature = "tests"))]
pub use backend::mock::{MockAuthBackend, MockIdentityProvider};
