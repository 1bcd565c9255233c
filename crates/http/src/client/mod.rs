//! Back-office HTTP client

pub mod auth;
pub mod error;
pub mod interceptor;

pub use interceptor::BearerInterceptor;

use crate::types::ApiEnvelope;
use error::ClientError;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use url::Url;

/// Default path prefix under which the API is mounted
pub const DEFAULT_API_PREFIX: &str = "/api";

/// Back-office API client
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    api_base: String,
    interceptor: BearerInterceptor,
}

impl ApiClient {
    /// Create a new client with default configuration
    pub fn new(api_host: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().api_host(api_host).build()
    }

    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Base URL every endpoint path is appended to
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Absolute URL of an endpoint path
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    /// Create a request builder for an endpoint path, without credentials
    pub fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.client.request(method, self.endpoint(path))
    }

    /// Create a request builder for an endpoint path carrying `token`
    pub fn authorized_request(
        &self,
        method: reqwest::Method,
        path: &str,
        token: &str,
    ) -> reqwest::RequestBuilder {
        self.request_url(method, &self.endpoint(path), Some(token))
    }

    /// Create a request builder for an arbitrary URL.
    ///
    /// The token is only attached when the URL belongs to the API host, so
    /// callers may pass it unconditionally when fetching third-party resources.
    pub fn request_url(
        &self,
        method: reqwest::Method,
        url: &str,
        token: Option<&str>,
    ) -> reqwest::RequestBuilder {
        let request = self.client.request(method, url);
        match token {
            Some(token) => self.interceptor.apply(request, url, token),
            None => request,
        }
    }

    /// Execute a request and handle common errors
    pub async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response.json().await?)
        } else {
            let message = response.text().await.unwrap_or_else(|_| status.to_string());
            Err(ClientError::from_status(status, message))
        }
    }

    /// Execute a request whose payload is wrapped in an [`ApiEnvelope`]
    pub async fn execute_envelope<T: serde::de::DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let envelope: ApiEnvelope<T> = self.execute(request).await?;
        envelope.into_data()
    }
}

/// Builder for ApiClient
#[derive(Default)]
pub struct ApiClientBuilder {
    api_host: Option<String>,
    api_prefix: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl ApiClientBuilder {
    /// Set the API host (scheme, host and port)
    pub fn api_host(mut self, url: impl Into<String>) -> Self {
        self.api_host = Some(url.into());
        self
    }

    /// Set the path prefix the API is mounted under
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = Some(prefix.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let api_host = self
            .api_host
            .ok_or_else(|| ClientError::Configuration("api_host is required".into()))?;

        // Ensure api_host ends without a trailing slash
        let api_host = api_host.trim_end_matches('/').to_string();
        let host_url = Url::parse(&api_host)
            .map_err(|e| ClientError::Configuration(format!("invalid api_host {api_host}: {e}")))?;

        let prefix = self
            .api_prefix
            .unwrap_or_else(|| DEFAULT_API_PREFIX.to_string());
        let prefix = prefix.trim_end_matches('/');
        let api_base = if prefix.is_empty() || prefix.starts_with('/') {
            format!("{api_host}{prefix}")
        } else {
            format!("{api_host}/{prefix}")
        };

        let mut client_builder = ClientBuilder::new();

        if let Some(timeout) = self.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        if let Some(user_agent) = self.user_agent {
            client_builder = client_builder.user_agent(user_agent);
        } else {
            client_builder = client_builder.user_agent(concat!(
                "corretaje-client/",
                env!("CARGO_PKG_VERSION")
            ));
        }

        let client = client_builder.build()?;

        Ok(ApiClient {
            client,
            api_base,
            interceptor: BearerInterceptor::new(host_url),
        })
    }
}
