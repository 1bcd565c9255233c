use crate::{
    BackendResult, LoginPayload, LoginRequest, RawAssociation, SelectCompanyPayload,
};
use async_trait::async_trait;

/// Remote authentication and association endpoints
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Exchange an identity token plus credentials for an application token
    async fn login(&self, request: &LoginRequest) -> BackendResult<LoginPayload>;

    /// Trade the current token for one scoped to `company_id`
    async fn select_company(
        &self,
        token: &str,
        company_id: &str,
    ) -> BackendResult<SelectCompanyPayload>;

    /// Associations of the bearer of `token`
    async fn list_associations(&self, token: &str) -> BackendResult<Vec<RawAssociation>>;
}

/// Upstream identity provider consulted before the application login
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn id_token(&self, email: &str, password: &str) -> BackendResult<String>;
}

// Mock implementations for testing
#[cfg(any(test, feature = "tests"))]
pub mod mock {
    use super::*;
    use mockall::mock;

    mock! {
        pub AuthBackend {}

        #[async_trait]
        impl AuthBackend for AuthBackend {
            async fn login(&self, request: &LoginRequest) -> BackendResult<LoginPayload>;
            async fn select_company(
                &self,
                token: &str,
                company_id: &str,
            ) -> BackendResult<SelectCompanyPayload>;
            async fn list_associations(&self, token: &str) -> BackendResult<Vec<RawAssociation>>;
        }
    }

    mock! {
        pub IdentityProvider {}

        #[async_trait]
        impl IdentityProvider for IdentityProvider {
            async fn id_token(&self, email: &str, password: &str) -> BackendResult<String>;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockAuthBackend;
    use super::*;
    use crate::BackendError;

    #[tokio::test]
    async fn test_mock_backend_select_company() {
        let mut backend = MockAuthBackend::new();
        backend
            .expect_select_company()
            .times(1)
            .returning(|token, company_id| {
                assert_eq!(token, "tok");
                assert_eq!(company_id, "c1");
                Ok(SelectCompanyPayload {
                    token: "scoped".into(),
                })
            });
        backend
            .expect_list_associations()
            .returning(|_| Err(BackendError::rejected(500, "down")));

        let payload = backend.select_company("tok", "c1").await.unwrap();
        assert_eq!(payload.token, "scoped");
        assert!(backend.list_associations("tok").await.is_err());
    }
}
