//! Wire envelope shared by every back-office endpoint

use crate::client::error::ClientError;
use serde::{Deserialize, Serialize};

/// `{ header, body, status }` wrapper around every response payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    #[serde(default)]
    pub header: Option<EnvelopeHeader>,
    pub body: EnvelopeBody<T>,
    #[serde(default)]
    pub status: Option<EnvelopeStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeHeader {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeBody<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvelopeStatus {
    pub code: u16,
    pub success: bool,
}

impl<T> ApiEnvelope<T> {
    /// Unwrap `body.data`, honouring an explicit `status.success = false`
    pub fn into_data(self) -> Result<T, ClientError> {
        let message = self.body.message;

        if let Some(status) = self.status.filter(|status| !status.success) {
            return Err(ClientError::ServerError {
                status: status.code,
                message: message.unwrap_or_else(|| "request was not successful".to_string()),
            });
        }

        self.body
            .data
            .ok_or_else(|| ClientError::MissingData(message.unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_into_data() {
        let envelope: ApiEnvelope<String> = serde_json::from_value(json!({
            "header": { "timestamp": "2024-05-01T10:00:00Z" },
            "body": { "data": "ok" },
            "status": { "code": 200, "success": true }
        }))
        .unwrap();
        assert_eq!(envelope.into_data().unwrap(), "ok");
    }

    #[test]
    fn test_unsuccessful_status() {
        let envelope: ApiEnvelope<String> = serde_json::from_value(json!({
            "body": { "message": "Credenciales inválidas" },
            "status": { "code": 401, "success": false }
        }))
        .unwrap();

        match envelope.into_data() {
            Err(ClientError::ServerError { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "Credenciales inválidas");
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_missing_data() {
        let envelope: ApiEnvelope<String> =
            serde_json::from_value(json!({ "body": {} })).unwrap();
        assert!(matches!(
            envelope.into_data(),
            Err(ClientError::MissingData(_))
        ));
    }
}
