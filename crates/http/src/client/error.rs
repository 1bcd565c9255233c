//! Failures of calls to the back-office API

use corretaje_core::BackendError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The API host could not be reached or the exchange broke off
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Any non-success status without a dedicated variant, including an
    /// envelope whose `status.success` is false
    #[error("Back office answered {status}: {message}")]
    ServerError { status: u16, message: String },

    /// 401: bad credentials or a bearer token the back office no longer accepts
    #[error("Not authenticated: {0}")]
    AuthenticationFailed(String),

    /// 404
    #[error("Endpoint not found: {0}")]
    NotFound(String),

    /// 400: the back office rejected the request body
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// 403: authenticated, but not allowed for this company
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Envelope carried no `body.data`
    #[error("Response carried no data: {0}")]
    MissingData(String),

    /// Payload did not match the expected shape
    #[error("Malformed payload: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Unusable client settings, such as an api_host that is not a URL
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// Map a non-success HTTP status onto a variant
    pub fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::AuthenticationFailed(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            code => Self::ServerError {
                status: code,
                message,
            },
        }
    }
}

impl From<ClientError> for BackendError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Request(e) => Self::transport(e.to_string()),
            ClientError::ServerError { status, message } => Self::rejected(status, message),
            ClientError::BadRequest(message) => Self::rejected(400, message),
            ClientError::AuthenticationFailed(message) => Self::rejected(401, message),
            ClientError::Forbidden(message) => Self::rejected(403, message),
            ClientError::NotFound(message) => Self::rejected(404, message),
            ClientError::MissingData(message) => Self::invalid_response(message),
            ClientError::Serialization(e) => Self::invalid_response(e.to_string()),
            ClientError::Configuration(message) => Self::transport(message),
        }
    }
}
