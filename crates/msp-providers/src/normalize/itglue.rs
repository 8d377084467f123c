//! IT Glue JSON:API documents.
//!
//! IT Glue resources are records, not alerts. A resource object
//! `{id, type, attributes, relationships}` is flattened into
//! `{id, type, ...attributes, relationships: {name: {id,type} | [{id,type}]}}`.

use serde_json::{Map, Value, json};

/// Flatten one JSON:API resource object.
///
/// Attributes are merged after `id`/`type` and win on key collisions.
/// Relationships with null data are dropped; to-many relationships stay lists.
pub fn flatten_resource(resource: &Value, resource_type: &str) -> Value {
    let mut flat = Map::new();
    flat.insert(
        "id".to_string(),
        resource.get("id").cloned().unwrap_or(Value::Null),
    );
    flat.insert("type".to_string(), Value::String(resource_type.to_string()));

    if let Some(attributes) = resource.get("attributes").and_then(Value::as_object) {
        for (key, value) in attributes {
            flat.insert(key.clone(), value.clone());
        }
    }

    if let Some(relationships) = resource.get("relationships").and_then(Value::as_object) {
        let mut flat_relationships = Map::new();
        for (name, relationship) in relationships {
            match relationship.get("data") {
                Some(Value::Array(items)) => {
                    let items = items.iter().map(identifier).collect();
                    flat_relationships.insert(name.clone(), Value::Array(items));
                }
                Some(Value::Null) | None => {}
                Some(item) => {
                    flat_relationships.insert(name.clone(), identifier(item));
                }
            }
        }
        flat.insert("relationships".to_string(), Value::Object(flat_relationships));
    }

    Value::Object(flat)
}

fn identifier(item: &Value) -> Value {
    json!({
        "id": item.get("id").cloned().unwrap_or(Value::Null),
        "type": item.get("type").cloned().unwrap_or(Value::Null),
    })
}
