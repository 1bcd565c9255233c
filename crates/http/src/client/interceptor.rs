//! Bearer token attachment

use reqwest::header;
use url::Url;

/// Attaches the session token to requests aimed at the API host and leaves
/// every other request untouched.
#[derive(Debug, Clone)]
pub struct BearerInterceptor {
    api_host: Url,
}

impl BearerInterceptor {
    pub fn new(api_host: Url) -> Self {
        Self { api_host }
    }

    /// Whether `url` targets the API host
    pub fn applies_to(&self, url: &str) -> bool {
        let Ok(target) = Url::parse(url) else {
            return false;
        };

        target.origin() == self.api_host.origin()
            && target.path().starts_with(self.api_host.path().trim_end_matches('/'))
    }

    /// Add `Authorization: Bearer <token>` when `url` targets the API host
    pub fn apply(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
        token: &str,
    ) -> reqwest::RequestBuilder {
        if token.is_empty() || !self.applies_to(url) {
            return request;
        }
        request.header(header::AUTHORIZATION, format!("Bearer {token}"))
    }
}
