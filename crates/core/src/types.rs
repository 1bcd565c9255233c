use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;

/// The signed-in back-office user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub uid: String,
    pub email: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_super_admin: bool,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub office_id: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub requires_company_selection: bool,
}

/// Identifier and display name of a company or office
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: String,
    pub name: String,
}

/// A user's link to one brokerage company, optionally scoped to an office
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyAssociation {
    pub association_id: String,
    pub email: String,
    pub role: String,
    pub company: EntityRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub office: Option<EntityRef>,
}

/// Nested company/office object as sent by the backend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawEntity {
    #[serde(default)]
    pub id: Option<JsonValue>,
    #[serde(default)]
    pub nombre: Option<String>,
}

/// Association record as sent by the backend.
///
/// The backend has shipped both a flat shape (`companiaCorretajeId`,
/// `companiaNombre`, ...) and a nested one (`compania.id`, `oficina.nombre`),
/// sometimes mixed within one list, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAssociation {
    #[serde(default)]
    pub id: Option<JsonValue>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub rol: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub activo: Option<bool>,
    #[serde(default)]
    pub compania_corretaje_id: Option<JsonValue>,
    #[serde(default)]
    pub compania_nombre: Option<String>,
    #[serde(default)]
    pub oficina_id: Option<JsonValue>,
    #[serde(default)]
    pub oficina_nombre: Option<String>,
    #[serde(default)]
    pub compania: Option<RawEntity>,
    #[serde(default)]
    pub oficina: Option<RawEntity>,
}

impl RawAssociation {
    /// Parse records one by one, skipping the ones that do not fit the schema
    pub fn from_values(values: Vec<JsonValue>) -> Vec<Self> {
        values
            .into_iter()
            .filter_map(|value| match serde_json::from_value(value) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!("Skipping malformed association record: {e}");
                    None
                }
            })
            .collect()
    }
}

fn lenient_associations<'de, D>(deserializer: D) -> Result<Vec<RawAssociation>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = Option::<Vec<JsonValue>>::deserialize(deserializer)?;
    Ok(RawAssociation::from_values(values.unwrap_or_default()))
}

/// Body of `POST /auth/login`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub id_token: String,
    pub email: String,
    pub password: String,
}

/// Data returned by `POST /auth/login`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginPayload {
    pub token: String,
    #[serde(default, deserialize_with = "lenient_associations")]
    pub companias: Vec<RawAssociation>,
    #[serde(default)]
    pub needs_selection: Option<bool>,
    #[serde(default)]
    pub is_super_admin: Option<bool>,
}

/// Body of `POST /auth/select/company`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectCompanyRequest {
    pub compania_id: String,
}

/// Data returned by `POST /auth/select/company`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectCompanyPayload {
    pub token: String,
}
