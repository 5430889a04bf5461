//! Closed description of a tool's parameters.
//!
//! Every tool declares its input as a flat object of named fields. The same
//! description drives input validation ([`ParameterSchema::validate`]) and
//! the JSON Schema handed to agent frameworks
//! ([`ParameterSchema::to_json_schema`]), so the two cannot drift apart.

mod json_schema;
mod validate;

pub use validate::ValidatedInput;

/// Leaf types a parameter can take, with their constraints.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    String {
        min_length: Option<usize>,
        max_length: Option<usize>,
    },
    Integer {
        minimum: Option<i64>,
        maximum: Option<i64>,
    },
    Number {
        minimum: Option<f64>,
        maximum: Option<f64>,
    },
    Boolean,
    Array(Box<FieldType>),
    /// Object with arbitrary string keys and values of any type.
    Record,
}

impl FieldType {
    /// JSON Schema `type` keyword for this leaf.
    pub fn json_type(&self) -> &'static str {
        match self {
            Self::String { .. } => "string",
            Self::Integer { .. } => "integer",
            Self::Number { .. } => "number",
            Self::Boolean => "boolean",
            Self::Array(_) => "array",
            Self::Record => "object",
        }
    }
}

/// One named parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: FieldType,
    pub required: bool,
    pub description: Option<String>,
}

impl Field {
    fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: true,
            description: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(
            name,
            FieldType::String {
                min_length: None,
                max_length: None,
            },
        )
    }

    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(
            name,
            FieldType::Integer {
                minimum: None,
                maximum: None,
            },
        )
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(
            name,
            FieldType::Number {
                minimum: None,
                maximum: None,
            },
        )
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    pub fn array(name: impl Into<String>, items: FieldType) -> Self {
        Self::new(name, FieldType::Array(Box::new(items)))
    }

    pub fn record(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Record)
    }

    /// Mark the field as optional (fields are required by default).
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Minimum string length in characters. No effect on non-string fields.
    pub fn min_length(mut self, min: usize) -> Self {
        if let FieldType::String { min_length, .. } = &mut self.ty {
            *min_length = Some(min);
        }
        self
    }

    /// Maximum string length in characters. No effect on non-string fields.
    pub fn max_length(mut self, max: usize) -> Self {
        if let FieldType::String { max_length, .. } = &mut self.ty {
            *max_length = Some(max);
        }
        self
    }

    /// Inclusive bounds for integer and number fields.
    pub fn range(mut self, min: i64, max: i64) -> Self {
        match &mut self.ty {
            FieldType::Integer { minimum, maximum } => {
                *minimum = Some(min);
                *maximum = Some(max);
            }
            FieldType::Number { minimum, maximum } => {
                *minimum = Some(min as f64);
                *maximum = Some(max as f64);
            }
            _ => {}
        }
        self
    }
}

/// Ordered set of fields making up a tool's input object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSchema {
    fields: Vec<Field>,
}

impl ParameterSchema {
    /// Schema with no parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. A later field with the same name replaces the earlier one.
    pub fn field(mut self, field: Field) -> Self {
        self.fields.retain(|f| f.name != field.name);
        self.fields.push(field);
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect()
    }

    pub fn optional(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| !f.required)
            .map(|f| f.name.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn builder_tracks_required_and_optional() {
        let schema = ParameterSchema::new()
            .field(Field::string("q").min_length(1).max_length(200))
            .field(Field::integer("limit").range(1, 100).optional());

        assert_eq!(schema.required(), vec!["q"]);
        assert_eq!(schema.optional(), vec!["limit"]);
        assert_eq!(
            schema.get("limit").map(|f| f.ty.clone()),
            Some(FieldType::Integer {
                minimum: Some(1),
                maximum: Some(100)
            })
        );
    }

    #[test]
    fn redeclared_field_replaces_previous() {
        let schema = ParameterSchema::new()
            .field(Field::string("id"))
            .field(Field::string("id").optional());
        assert_eq!(schema.fields().len(), 1);
        assert!(!schema.fields()[0].required);
    }

    #[test]
    fn length_constraints_ignore_non_string_fields() {
        let field = Field::boolean("wait").min_length(3);
        assert_eq!(field.ty, FieldType::Boolean);
    }
}
