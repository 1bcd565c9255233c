//! Corretaje HTTP client
//!
//! Typed access to the back-office authentication and association endpoints.
//! [`client::ApiClient`] implements [`corretaje_core::AuthBackend`] so the
//! session layer can drive it without knowing about HTTP.

pub mod client;
pub mod types;

pub use client::{ApiClient, ApiClientBuilder, BearerInterceptor, error::ClientError};
pub use types::ApiEnvelope;
