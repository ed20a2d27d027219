//! Product entity and validation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A persisted product.
///
/// Backends assign the identifier; `name` and `price` are the only required
/// fields, everything else the client sends is carried through untouched in
/// `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A validated product body, ready for persistence but not yet identified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDraft {
    pub name: String,
    pub price: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProductDraft {
    /// Validate an incoming JSON body.
    ///
    /// Collects every violated rule so clients see all of them at once.
    pub fn from_value(body: &Value) -> Result<Self, Vec<String>> {
        let Some(obj) = body.as_object() else {
            return Err(vec!["request body must be a JSON object".to_string()]);
        };

        let mut errors = Vec::new();

        let name = match obj.get("name") {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
            Some(Value::String(_)) | None => {
                errors.push("field \"name\" is required and cannot be empty".to_string());
                None
            }
            Some(_) => {
                errors.push("field \"name\" must be a string".to_string());
                None
            }
        };

        let price = match obj.get("price") {
            Some(v) if v.is_number() => match v.as_f64() {
                Some(p) if p >= 0.0 => Some(p),
                _ => {
                    errors.push("field \"price\" must be >= 0".to_string());
                    None
                }
            },
            None => {
                errors.push("field \"price\" is required".to_string());
                None
            }
            Some(_) => {
                errors.push("field \"price\" must be a number".to_string());
                None
            }
        };

        match (name, price) {
            (Some(name), Some(price)) => Ok(Self {
                name,
                price,
                extra: collect_extra(obj),
            }),
            _ => Err(errors),
        }
    }

    /// Attach the backend-assigned identifier.
    pub fn into_product(self, id: String) -> Product {
        Product {
            id,
            name: self.name,
            price: self.price,
            extra: self.extra,
        }
    }
}

fn collect_extra(obj: &Map<String, Value>) -> Map<String, Value> {
    obj.iter()
        .filter(|(k, _)| !matches!(k.as_str(), "name" | "price" | "id" | "_id"))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Validate a product update patch.
///
/// All fields are optional, but `name` and `price` must be well-typed when
/// present.
pub fn validate_patch(patch: &Map<String, Value>) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    match patch.get("name") {
        None => {}
        Some(Value::String(s)) if !s.trim().is_empty() => {}
        Some(Value::String(_)) => errors.push("field \"name\" cannot be empty".to_string()),
        Some(_) => errors.push("field \"name\" must be a string".to_string()),
    }

    match patch.get("price") {
        None => {}
        Some(v) if v.is_number() => {
            if v.as_f64().is_some_and(|p| p < 0.0) {
                errors.push("field \"price\" must be >= 0".to_string());
            }
        }
        Some(_) => errors.push("field \"price\" must be a number".to_string()),
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Strip identifier keys from an update patch. A patch never rewrites the id.
pub fn sanitize_patch(mut patch: Map<String, Value>) -> Map<String, Value> {
    patch.remove("id");
    patch.remove("_id");
    patch
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn valid_body_with_extra_fields() {
        let body = json!({
            "name": "Teclado",
            "price": 49.99,
            "stock": 12,
            "tags": ["perifericos"]
        });

        let draft = ProductDraft::from_value(&body).unwrap();
        assert_eq!(draft.name, "Teclado");
        assert_eq!(draft.price, 49.99);
        assert_eq!(draft.extra.get("stock"), Some(&json!(12)));
        assert_eq!(draft.extra.get("tags"), Some(&json!(["perifericos"])));
    }

    #[test]
    fn missing_fields_reported_together() {
        let errors = ProductDraft::from_value(&json!({})).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("name"));
        assert!(errors[1].contains("price"));
    }

    #[test]
    fn wrong_types_rejected() {
        let errors = ProductDraft::from_value(&json!({"name": 3, "price": "free"})).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("\"name\" must be a string")));
        assert!(errors.iter().any(|e| e.contains("\"price\" must be a number")));
    }

    #[test]
    fn negative_price_rejected() {
        let errors = ProductDraft::from_value(&json!({"name": "x", "price": -1})).unwrap_err();
        assert_eq!(errors, vec!["field \"price\" must be >= 0".to_string()]);
    }

    #[test]
    fn non_object_body_rejected() {
        assert!(ProductDraft::from_value(&json!([1, 2])).is_err());
    }

    #[test]
    fn client_supplied_ids_ignored() {
        let body = json!({"name": "x", "price": 1, "id": "evil", "_id": "evil"});
        let draft = ProductDraft::from_value(&body).unwrap();
        assert!(draft.extra.is_empty());
    }

    #[test]
    fn patch_type_checks() {
        assert!(validate_patch(serde_json::json!({"price": 10}).as_object().unwrap()).is_ok());
        assert!(validate_patch(serde_json::json!({}).as_object().unwrap()).is_ok());

        let errors =
            validate_patch(serde_json::json!({"name": "", "price": -2}).as_object().unwrap())
                .unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn patch_id_keys_stripped() {
        let patch = serde_json::json!({"id": "a", "_id": "b", "name": "c"});
        let sanitized = sanitize_patch(patch.as_object().unwrap().clone());
        assert_eq!(sanitized.len(), 1);
        assert!(sanitized.contains_key("name"));
    }
}
