//! Normalization of company association records

use corretaje_core::{CompanyAssociation, EntityRef, RawAssociation};
use serde_json::Value as JsonValue;
use tracing::debug;

/// Normalize raw association records, dropping those without a company id.
///
/// Nested `compania`/`oficina` objects take precedence over the flat
/// `companiaCorretajeId`/`oficinaId` fields. Names fall back to ids.
pub fn normalize_associations(records: &[RawAssociation]) -> Vec<CompanyAssociation> {
    records.iter().filter_map(normalize_association).collect()
}

/// Normalize one record; `None` if no company id can be resolved
pub fn normalize_association(raw: &RawAssociation) -> Option<CompanyAssociation> {
    let nested_company = raw.compania.as_ref();
    let Some(company_id) = json_id(nested_company.and_then(|c| c.id.as_ref()))
        .or_else(|| json_id(raw.compania_corretaje_id.as_ref()))
    else {
        debug!("Dropping association without company id");
        return None;
    };

    let company_name = text(nested_company.and_then(|c| c.nombre.as_deref()))
        .or_else(|| text(raw.compania_nombre.as_deref()))
        .unwrap_or_else(|| company_id.clone());

    let nested_office = raw.oficina.as_ref();
    let office = json_id(nested_office.and_then(|o| o.id.as_ref()))
        .or_else(|| json_id(raw.oficina_id.as_ref()))
        .map(|office_id| EntityRef {
            name: text(nested_office.and_then(|o| o.nombre.as_deref()))
                .or_else(|| text(raw.oficina_nombre.as_deref()))
                .unwrap_or_else(|| office_id.clone()),
            id: office_id,
        });

    Some(CompanyAssociation {
        association_id: json_id(raw.id.as_ref()).unwrap_or_else(|| company_id.clone()),
        email: text(raw.email.as_deref()).unwrap_or_default(),
        role: text(raw.rol.as_deref())
            .or_else(|| text(raw.role.as_deref()))
            .unwrap_or_default(),
        company: EntityRef {
            id: company_id,
            name: company_name,
        },
        office,
    })
}

/// Non-empty id from a string or numeric JSON value
fn json_id(value: Option<&JsonValue>) -> Option<String> {
    match value? {
        JsonValue::String(s) => text(Some(s.as_str())),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: JsonValue) -> RawAssociation {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_nested_company_only() {
        let result = normalize_associations(&[raw(json!({ "compania": { "id": "c1" } }))]);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].company.id, "c1");
        assert_eq!(result[0].company.name, "c1");
        assert_eq!(result[0].association_id, "c1");
        assert_eq!(result[0].office, None);
    }

    #[test]
    fn test_record_without_company_is_dropped() {
        let records = [
            raw(json!({ "id": "a1", "email": "ana@corretaje.test", "rol": "Agente" })),
            raw(json!({ "compania": { "id": "" }, "companiaCorretajeId": "   " })),
            raw(json!({ "compania": { "nombre": "Sin id" } })),
        ];
        assert!(normalize_associations(&records).is_empty());
    }

    #[test]
    fn test_flat_shape() {
        let result = normalize_associations(&[raw(json!({
            "id": "a-9",
            "email": "ana@corretaje.test",
            "rol": "Supervisor",
            "companiaCorretajeId": "c2",
            "companiaNombre": "Seguros Sur",
            "oficinaId": 31,
            "oficinaNombre": "Valparaíso"
        }))]);

        let association = &result[0];
        assert_eq!(association.association_id, "a-9");
        assert_eq!(association.email, "ana@corretaje.test");
        assert_eq!(association.role, "Supervisor");
        assert_eq!(
            association.company,
            EntityRef {
                id: "c2".into(),
                name: "Seguros Sur".into()
            }
        );
        assert_eq!(
            association.office,
            Some(EntityRef {
                id: "31".into(),
                name: "Valparaíso".into()
            })
        );
    }

    #[test]
    fn test_nested_shape_wins_over_flat() {
        let result = normalize_associations(&[raw(json!({
            "companiaCorretajeId": "flat",
            "companiaNombre": "Flat Name",
            "compania": { "id": "nested", "nombre": "Nested Name" },
            "oficinaId": "o-flat",
            "oficina": { "id": "o-nested" },
            "role": "Agente"
        }))]);

        let association = &result[0];
        assert_eq!(association.company.id, "nested");
        assert_eq!(association.company.name, "Nested Name");
        // Office name falls back to the flat field, then the id
        let office = association.office.as_ref().unwrap();
        assert_eq!(office.id, "o-nested");
        assert_eq!(office.name, "o-nested");
        assert_eq!(association.role, "Agente");
    }

    #[test]
    fn test_nested_without_id_falls_back_to_flat() {
        let result = normalize_associations(&[raw(json!({
            "compania": { "nombre": "Nested Name" },
            "companiaCorretajeId": 77
        }))]);

        assert_eq!(result[0].company.id, "77");
        assert_eq!(result[0].company.name, "Nested Name");
    }

    #[test]
    fn test_order_is_preserved() {
        let records = [
            raw(json!({ "companiaCorretajeId": "c3" })),
            raw(json!({})),
            raw(json!({ "companiaCorretajeId": "c1" })),
            raw(json!({ "compania": { "id": "c2" } })),
        ];
        let ids: Vec<_> = normalize_associations(&records)
            .into_iter()
            .map(|a| a.company.id)
            .collect();
        assert_eq!(ids, ["c3", "c1", "c2"]);
    }
}
