//! Authentication API client methods

use super::{ApiClient, ClientError};
use async_trait::async_trait;
use corretaje_core::{
    AuthBackend, BackendResult, LoginPayload, LoginRequest, RawAssociation,
    SelectCompanyPayload, SelectCompanyRequest,
};
use reqwest::Method;
use serde_json::Value as JsonValue;

/// Endpoint paths, relative to the API base
pub mod paths {
    pub const LOGIN: &str = "/auth/login";
    pub const SELECT_COMPANY: &str = "/auth/select/company";
    pub const ASSOCIATIONS: &str = "/users/me/associations";
}

impl ApiClient {
    /// Exchange identity token and credentials for an application token
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginPayload, ClientError> {
        let req = self.request(Method::POST, paths::LOGIN).json(request);
        self.execute_envelope(req).await
    }

    /// Scope the session to one company
    pub async fn select_company(
        &self,
        token: &str,
        company_id: &str,
    ) -> Result<SelectCompanyPayload, ClientError> {
        let req = self
            .authorized_request(Method::POST, paths::SELECT_COMPANY, token)
            .json(&SelectCompanyRequest {
                compania_id: company_id.to_string(),
            });
        self.execute_envelope(req).await
    }

    /// List the caller's company associations.
    ///
    /// Accepts both the enveloped form and a bare JSON array.
    pub async fn list_associations(
        &self,
        token: &str,
    ) -> Result<Vec<RawAssociation>, ClientError> {
        let req = self.authorized_request(Method::GET, paths::ASSOCIATIONS, token);
        let value: JsonValue = self.execute(req).await?;

        let records = match value {
            JsonValue::Array(records) => records,
            other => {
                let data: JsonValue = serde_json::from_value::<crate::ApiEnvelope<JsonValue>>(
                    other,
                )?
                .into_data()?;
                match data {
                    JsonValue::Array(records) => records,
                    JsonValue::Null => Vec::new(),
                    _ => {
                        return Err(ClientError::MissingData(
                            "associations payload is not a list".to_string(),
                        ));
                    }
                }
            }
        };

        Ok(RawAssociation::from_values(records))
    }
}

#[async_trait]
impl AuthBackend for ApiClient {
    async fn login(&self, request: &LoginRequest) -> BackendResult<LoginPayload> {
        Ok(Self::login(self, request).await?)
    }

    async fn select_company(
        &self,
        token: &str,
        company_id: &str,
    ) -> BackendResult<SelectCompanyPayload> {
        Ok(Self::select_company(self, token, company_id).await?)
    }

    async fn list_associations(&self, token: &str) -> BackendResult<Vec<RawAssociation>> {
        Ok(Self::list_associations(self, token).await?)
    }
}
