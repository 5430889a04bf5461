use super::{Field, FieldType, ParameterSchema};
use serde_json::{json, Map, Value};

impl ParameterSchema {
    /// Project into a JSON Schema object, the shape every supported framework consumes.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in self.fields() {
            properties.insert(field.name.clone(), field.to_json_schema());
        }

        let mut schema = Map::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));
        let required = self.required();
        if !required.is_empty() {
            schema.insert("required".into(), json!(required));
        }
        // Undeclared fields are stripped by validation, not rejected, so the
        // projection leaves `additionalProperties` open.
        Value::Object(schema)
    }
}

impl Field {
    pub fn to_json_schema(&self) -> Value {
        let mut schema = type_schema(&self.ty);
        if let (Some(description), Value::Object(map)) = (&self.description, &mut schema) {
            map.insert("description".into(), json!(description));
        }
        schema
    }
}

fn type_schema(ty: &FieldType) -> Value {
    let mut map = Map::new();
    map.insert("type".into(), json!(ty.json_type()));
    match ty {
        FieldType::String {
            min_length,
            max_length,
        } => {
            if let Some(min) = min_length {
                map.insert("minLength".into(), json!(min));
            }
            if let Some(max) = max_length {
                map.insert("maxLength".into(), json!(max));
            }
        }
        FieldType::Integer { minimum, maximum } => {
            if let Some(min) = minimum {
                map.insert("minimum".into(), json!(min));
            }
            if let Some(max) = maximum {
                map.insert("maximum".into(), json!(max));
            }
        }
        FieldType::Number { minimum, maximum } => {
            if let Some(min) = minimum {
                map.insert("minimum".into(), json!(min));
            }
            if let Some(max) = maximum {
                map.insert("maximum".into(), json!(max));
            }
        }
        FieldType::Boolean => {}
        FieldType::Array(items) => {
            map.insert("items".into(), type_schema(items));
        }
        FieldType::Record => {
            map.insert("additionalProperties".into(), json!({}));
        }
    }
    Value::Object(map)
}
