//! Bearer token decoding
//!
//! Application tokens are compact `header.payload.signature` strings. Only the
//! payload is read; the signature is the backend's business and is never
//! checked here.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use chrono::{DateTime, Utc};
use corretaje_core::User;
use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;

/// Role name the backend assigns to platform administrators
pub const SUPER_ADMIN_ROLE: &str = "SuperAdmin";

const PAYLOAD_CONFIG: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

/// base64url, padded or not
const URL_SAFE: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, PAYLOAD_CONFIG);

/// Some issuers emit the standard alphabet in the payload segment
const STANDARD: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, PAYLOAD_CONFIG);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("token must have three dot-separated segments, found {0}")]
    SegmentCount(usize),

    #[error("token payload segment is empty")]
    EmptyPayload,

    #[error("token payload is not valid base64url: {0}")]
    Base64(String),

    #[error("token payload is not valid JSON: {0}")]
    Json(String),

    #[error("token is missing required claim `{0}`")]
    MissingClaim(&'static str),
}

/// The `user` sub-claim
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenUser {
    #[serde(default, deserialize_with = "lenient_id")]
    pub uid: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub compania_corretaje_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub oficina_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id")]
    pub ente_id: Option<String>,
    #[serde(default)]
    pub pendiente_cia: Option<bool>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Deserialize)]
struct RawClaims {
    #[serde(default, deserialize_with = "numeric_date")]
    exp: Option<i64>,
    #[serde(default, deserialize_with = "numeric_date")]
    iat: Option<i64>,
    #[serde(default)]
    user: Option<TokenUser>,
}

/// Decoded token payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Expiration, seconds since the epoch
    pub exp: Option<i64>,
    /// Issued at, seconds since the epoch
    pub iat: Option<i64>,
    pub user: TokenUser,
    email: String,
}

impl Claims {
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Absolute expiration time, if the token carries a usable `exp`
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// User as described by the claims alone
    pub fn to_user(&self) -> User {
        let role = self.user.role.clone();
        User {
            uid: self.user.uid.clone().unwrap_or_default(),
            email: self.email.clone(),
            is_super_admin: role.as_deref() == Some(SUPER_ADMIN_ROLE),
            role,
            company_id: self.user.compania_corretaje_id.clone(),
            office_id: self.user.oficina_id.clone(),
            entity_id: self.user.ente_id.clone(),
            name: self.user.name.clone(),
            requires_company_selection: self.user.pendiente_cia.unwrap_or(false),
        }
    }
}

/// Decode the payload segment of `token`
pub fn decode(token: &str) -> Result<Claims, DecodeError> {
    let segments: Vec<&str> = token.trim().split('.').collect();
    if segments.len() != 3 {
        return Err(DecodeError::SegmentCount(segments.len()));
    }

    let payload = segments[1];
    if payload.is_empty() {
        return Err(DecodeError::EmptyPayload);
    }

    let bytes = URL_SAFE
        .decode(payload)
        .or_else(|_| STANDARD.decode(payload))
        .map_err(|e| DecodeError::Base64(e.to_string()))?;

    let raw: RawClaims =
        serde_json::from_slice(&bytes).map_err(|e| DecodeError::Json(e.to_string()))?;

    let user = raw.user.ok_or(DecodeError::MissingClaim("user"))?;
    let email = user
        .email
        .as_deref()
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .ok_or(DecodeError::MissingClaim("email"))?
        .to_string();

    Ok(Claims {
        exp: raw.exp,
        iat: raw.iat,
        user,
        email,
    })
}

fn lenient_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<JsonValue>::deserialize(deserializer)? {
        Some(JsonValue::String(s)) if !s.trim().is_empty() => Some(s),
        Some(JsonValue::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Seconds since the epoch; fractional values are truncated
fn numeric_date<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<JsonValue>::deserialize(deserializer)? {
        Some(JsonValue::Number(n)) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|secs| secs.is_finite() && secs.abs() < i64::MAX as f64)
                .map(|secs| secs.trunc() as i64)
        }),
        _ => None,
    })
}
