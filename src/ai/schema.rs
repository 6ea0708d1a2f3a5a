//! Declared response shapes for structured (JSON) generation

use serde_json::{json, Map, Value};

/// Shape the model is asked to produce
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseSchema {
    String,
    Boolean,
    Integer,
    Array(Box<ResponseSchema>),
    Object(Vec<Property>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub schema: ResponseSchema,
    pub required: bool,
    pub description: Option<String>,
}

impl ResponseSchema {
    pub fn array_of(items: ResponseSchema) -> Self {
        ResponseSchema::Array(Box::new(items))
    }

    pub fn object() -> Self {
        ResponseSchema::Object(Vec::new())
    }

    /// Add a required property (only meaningful on objects)
    pub fn required(self, name: &str, schema: ResponseSchema) -> Self {
        self.with_property(name, schema, true, None)
    }

    /// Add an optional property (only meaningful on objects)
    pub fn optional(self, name: &str, schema: ResponseSchema) -> Self {
        self.with_property(name, schema, false, None)
    }

    /// Add a required property with a description shown to the model
    pub fn described(self, name: &str, schema: ResponseSchema, description: &str) -> Self {
        self.with_property(name, schema, true, Some(description.to_string()))
    }

    fn with_property(
        self,
        name: &str,
        schema: ResponseSchema,
        required: bool,
        description: Option<String>,
    ) -> Self {
        match self {
            ResponseSchema::Object(mut props) => {
                props.push(Property {
                    name: name.to_string(),
                    schema,
                    required,
                    description,
                });
                ResponseSchema::Object(props)
            }
            other => other,
        }
    }

    /// Provider wire format (OpenAPI subset with upper-case type names)
    pub fn to_json(&self) -> Value {
        match self {
            ResponseSchema::String => json!({ "type": "STRING" }),
            ResponseSchema::Boolean => json!({ "type": "BOOLEAN" }),
            ResponseSchema::Integer => json!({ "type": "INTEGER" }),
            ResponseSchema::Array(items) => json!({ "type": "ARRAY", "items": items.to_json() }),
            ResponseSchema::Object(props) => {
                let mut properties = Map::new();
                let mut required = Vec::new();
                let mut ordering = Vec::new();
                for prop in props {
                    let mut value = prop.schema.to_json();
                    if let (Some(desc), Some(obj)) = (&prop.description, value.as_object_mut()) {
                        obj.insert("description".to_string(), Value::String(desc.clone()));
                    }
                    properties.insert(prop.name.clone(), value);
                    ordering.push(Value::String(prop.name.clone()));
                    if prop.required {
                        required.push(Value::String(prop.name.clone()));
                    }
                }
                json!({
                    "type": "OBJECT",
                    "properties": properties,
                    "required": required,
                    "propertyOrdering": ordering,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_schema_wire_format() {
        let schema = ResponseSchema::array_of(
            ResponseSchema::object()
                .required("french", ResponseSchema::String)
                .optional("isOverview", ResponseSchema::Boolean),
        );

        let value = schema.to_json();
        assert_eq!(value["type"], "ARRAY");
        assert_eq!(value["items"]["type"], "OBJECT");
        assert_eq!(value["items"]["properties"]["french"]["type"], "STRING");
        assert_eq!(value["items"]["properties"]["isOverview"]["type"], "BOOLEAN");
        assert_eq!(value["items"]["required"], json!(["french"]));
        assert_eq!(value["items"]["propertyOrdering"], json!(["french", "isOverview"]));
    }

    #[test]
    fn test_description_is_attached() {
        let schema = ResponseSchema::object().described(
            "phonetic",
            ResponseSchema::String,
            "English-style sound-it-out guide",
        );
        let value = schema.to_json();
        assert_eq!(
            value["properties"]["phonetic"]["description"],
            "English-style sound-it-out guide"
        );
    }

    #[test]
    fn test_properties_ignored_on_scalars() {
        let schema = ResponseSchema::String.required("x", ResponseSchema::Integer);
        assert_eq!(schema, ResponseSchema::String);
    }
}
