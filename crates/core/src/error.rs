//! Errors raised by remote collaborators of the session layer

/// Standard result type for backend calls
pub type BackendResult<T> = std::result::Result<T, BackendError>;

/// Failure of an [`AuthBackend`](crate::AuthBackend) or
/// [`IdentityProvider`](crate::IdentityProvider) call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("Transport error: {message}")]
    Transport { message: String },

    #[error("Request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected response: {message}")]
    InvalidResponse { message: String },

    #[error("Identity provider error: {message}")]
    Identity { message: String },
}

impl BackendError {
    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a rejection error from a status code
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// Create an invalid response error
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Create an identity provider error
    pub fn identity(message: impl Into<String>) -> Self {
        Self::Identity {
            message: message.into(),
        }
    }

    /// Whether the backend refused the credentials or token
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Rejected { status: 401 | 403, .. })
    }
}

impl From<serde_json::Error> for BackendError {
    fn from(err: serde_json::Error) -> Self {
        Self::invalid_response(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_detection() {
        assert!(BackendError::rejected(401, "nope").is_unauthorized());
        assert!(BackendError::rejected(403, "nope").is_unauthorized());
        assert!(!BackendError::rejected(500, "boom").is_unauthorized());
        assert!(!BackendError::transport("reset").is_unauthorized());
    }

    #[test]
    fn test_display_includes_status() {
        let err = BackendError::rejected(409, "conflict");
        assert_eq!(err.to_string(), "Request rejected with status 409: conflict");
    }
}
