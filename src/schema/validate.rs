use super::{FieldType, ParameterSchema};
use crate::error::{FieldError, FieldErrors, ToolError};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Input that passed schema validation, with undeclared fields removed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidatedInput {
    fields: Map<String, Value>,
}

impl ValidatedInput {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }

    /// Deserialize into a tool's typed argument struct.
    pub fn parse<T: DeserializeOwned>(&self, tool: &str) -> Result<T, ToolError> {
        serde_json::from_value(Value::Object(self.fields.clone()))
            .map_err(|err| ToolError::invalid_input(tool, vec![FieldError::new("", err.to_string())]))
    }
}

impl ParameterSchema {
    /// Check `args` against every declared field, collecting all failures.
    pub fn validate(&self, args: &Value) -> Result<ValidatedInput, FieldErrors> {
        let object = match args {
            Value::Object(map) => map,
            other => {
                return Err(vec![FieldError::new(
                    "",
                    format!("expected an object, received {}", describe(other)),
                )]
                .into())
            }
        };

        let mut errors = FieldErrors::new();
        let mut fields = Map::new();

        for field in self.fields() {
            match object.get(&field.name) {
                None if field.required => {
                    errors.push(FieldError::new(field.name.clone(), "is required"));
                }
                None => {}
                Some(value) => {
                    if check(&field.ty, value, &field.name, &mut errors) {
                        fields.insert(field.name.clone(), normalize(&field.ty, value));
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(ValidatedInput { fields })
        } else {
            Err(errors)
        }
    }
}

/// Validate one value, pushing failures under `path`. Returns whether it passed.
fn check(ty: &FieldType, value: &Value, path: &str, errors: &mut FieldErrors) -> bool {
    let before = errors.len();
    match (ty, value) {
        (
            FieldType::String {
                min_length,
                max_length,
            },
            Value::String(s),
        ) => {
            let len = s.chars().count();
            if let Some(min) = min_length {
                if len < *min {
                    errors.push(FieldError::new(
                        path,
                        format!("must contain at least {} character(s)", min),
                    ));
                }
            }
            if let Some(max) = max_length {
                if len > *max {
                    errors.push(FieldError::new(
                        path,
                        format!("must contain at most {} character(s)", max),
                    ));
                }
            }
        }
        (FieldType::Integer { minimum, maximum }, Value::Number(n)) => match as_integer(n) {
            Some(i) => {
                if let Some(min) = minimum {
                    if i < *min {
                        errors.push(FieldError::new(
                            path,
                            format!("must be greater than or equal to {}", min),
                        ));
                    }
                }
                if let Some(max) = maximum {
                    if i > *max {
                        errors.push(FieldError::new(
                            path,
                            format!("must be less than or equal to {}", max),
                        ));
                    }
                }
            }
            None => errors.push(FieldError::new(path, "expected an integer, received a float")),
        },
        (FieldType::Number { minimum, maximum }, Value::Number(n)) => {
            let x = n.as_f64().unwrap_or(f64::NAN);
            if let Some(min) = minimum {
                if x.is_nan() || x < *min {
                    errors.push(FieldError::new(
                        path,
                        format!("must be greater than or equal to {}", min),
                    ));
                }
            }
            if let Some(max) = maximum {
                if x.is_nan() || x > *max {
                    errors.push(FieldError::new(
                        path,
                        format!("must be less than or equal to {}", max),
                    ));
                }
            }
        }
        (FieldType::Boolean, Value::Bool(_)) => {}
        (FieldType::Array(items), Value::Array(values)) => {
            for (i, item) in values.iter().enumerate() {
                check(items, item, &format!("{}[{}]", path, i), errors);
            }
        }
        (FieldType::Record, Value::Object(_)) => {}
        (ty, other) => errors.push(FieldError::new(
            path,
            format!("expected {}, received {}", ty.json_type(), describe(other)),
        )),
    }
    errors.len() == before
}

/// Rewrite whole floats in integer positions (`5.0` -> `5`) so typed parsing accepts them.
fn normalize(ty: &FieldType, value: &Value) -> Value {
    match (ty, value) {
        (FieldType::Integer { .. }, Value::Number(n)) => {
            as_integer(n).map(Value::from).unwrap_or_else(|| value.clone())
        }
        (FieldType::Array(items), Value::Array(values)) => {
            Value::Array(values.iter().map(|v| normalize(items, v)).collect())
        }
        _ => value.clone(),
    }
}

/// Integral JSON numbers, including whole floats such as `5.0`.
fn as_integer(n: &serde_json::Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    let f = n.as_f64()?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use crate::schema::{Field, FieldType, ParameterSchema};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn search_schema() -> ParameterSchema {
        ParameterSchema::new()
            .field(Field::string("q").min_length(1).max_length(200))
            .field(Field::integer("limit").range(1, 100).optional())
    }

    #[test]
    fn accepts_valid_input_and_strips_unknown_fields() {
        let input = search_schema()
            .validate(&json!({ "q": "slack", "limit": 5, "extra": true }))
            .expect("valid");
        assert_eq!(input.into_value(), json!({ "q": "slack", "limit": 5 }));
    }

    #[test]
    fn reports_every_offending_field() {
        let errors = search_schema()
            .validate(&json!({ "limit": 0 }))
            .expect_err("invalid");
        assert_eq!(errors.fields(), vec!["q", "limit"]);
    }

    #[test]
    fn enforces_string_length_in_characters() {
        let schema = ParameterSchema::new().field(Field::string("intent").max_length(3));
        assert!(schema.validate(&json!({ "intent": "äöü" })).is_ok());
        assert!(schema.validate(&json!({ "intent": "abcd" })).is_err());

        let errors = search_schema()
            .validate(&json!({ "q": "" }))
            .expect_err("empty query");
        assert_eq!(errors[0].message, "must contain at least 1 character(s)");
    }

    #[test]
    fn integers_reject_fractions_but_accept_whole_floats() {
        let schema = ParameterSchema::new().field(Field::integer("timeout").range(1, 60));
        let input = schema
            .validate(&json!({ "timeout": 30.0 }))
            .expect("whole float");
        assert_eq!(input.get("timeout"), Some(&json!(30)));
        assert!(schema.validate(&json!({ "timeout": 1.5 })).is_err());
        assert!(schema.validate(&json!({ "timeout": 61 })).is_err());
        assert!(schema.validate(&json!({ "timeout": "30" })).is_err());
    }

    #[test]
    fn null_is_not_an_absent_optional() {
        let errors = search_schema()
            .validate(&json!({ "q": "x", "limit": null }))
            .expect_err("null limit");
        assert_eq!(errors[0].message, "expected integer, received null");
    }

    #[test]
    fn records_and_arrays_are_typed() {
        let schema = ParameterSchema::new()
            .field(Field::record("input").optional())
            .field(
                Field::array(
                    "ids",
                    FieldType::String {
                        min_length: Some(1),
                        max_length: None,
                    },
                )
                .optional(),
            );

        assert!(schema.validate(&json!({ "input": { "a": [1, 2] } })).is_ok());
        assert!(schema.validate(&json!({ "input": "text" })).is_err());

        let errors = schema
            .validate(&json!({ "ids": ["a", "", 3] }))
            .expect_err("bad items");
        assert_eq!(errors.fields(), vec!["ids[1]", "ids[2]"]);
    }

    #[test]
    fn non_object_arguments_fail_at_the_root() {
        let errors = search_schema().validate(&json!([1])).expect_err("array");
        assert_eq!(errors.fields(), vec![""]);
    }

    #[test]
    fn parse_yields_typed_arguments() {
        #[derive(serde::Deserialize)]
        struct Args {
            q: String,
            limit: Option<u32>,
        }

        let input = search_schema().validate(&json!({ "q": "hub" })).expect("valid");
        let args: Args = input.parse("search-connectors").expect("parse");
        assert_eq!(args.q, "hub");
        assert_eq!(args.limit, None);
    }
}
