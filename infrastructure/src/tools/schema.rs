//! JSON Schema tool converter.
//!
//! Maps [`ToolDefinition`]s to the `tools/list` wire descriptors and back.

use crate::rpc::protocol::ToolDescriptor;
use dbassist_domain::tool::entities::{ToolDefinition, ToolParameter, ToolSpec};

/// Converts between domain tool definitions and JSON Schema descriptors.
///
/// Handles param_type → JSON Schema type mapping:
/// - `"string"` → `"string"`
/// - `"integer"` → `"integer"`
/// - `"boolean"` → `"boolean"`
/// - anything else → `"string"`
pub struct JsonSchemaToolConverter;

impl JsonSchemaToolConverter {
    /// `inputSchema` object for one tool
    pub fn input_schema(tool: &ToolDefinition) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for param in &tool.parameters {
            let schema_type = match param.param_type.as_str() {
                "integer" => "integer",
                "boolean" => "boolean",
                _ => "string",
            };

            let mut prop = serde_json::Map::new();
            prop.insert("type".to_string(), serde_json::json!(schema_type));
            prop.insert(
                "description".to_string(),
                serde_json::json!(param.description),
            );
            if let Some(default) = &param.default {
                prop.insert("default".to_string(), serde_json::json!(default));
            }
            properties.insert(param.name.clone(), serde_json::Value::Object(prop));

            if param.required {
                required.push(serde_json::json!(param.name));
            }
        }

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }

    pub fn to_descriptor(tool: &ToolDefinition) -> ToolDescriptor {
        ToolDescriptor {
            name: tool.name.clone(),
            description: tool.description.clone(),
            input_schema: Self::input_schema(tool),
        }
    }

    /// Descriptors for every tool in a [`ToolSpec`], sorted by name
    pub fn descriptors(spec: &ToolSpec) -> Vec<ToolDescriptor> {
        spec.sorted().into_iter().map(Self::to_descriptor).collect()
    }

    /// Rebuild a definition from a descriptor received over the wire.
    ///
    /// Properties without a usable schema still become string parameters.
    pub fn from_descriptor(descriptor: &ToolDescriptor) -> ToolDefinition {
        let schema = &descriptor.input_schema;
        let required: Vec<&str> = schema["required"]
            .as_array()
            .map(|names| names.iter().filter_map(|n| n.as_str()).collect())
            .unwrap_or_default();

        let mut tool = ToolDefinition::new(&descriptor.name, &descriptor.description);
        if let Some(properties) = schema["properties"].as_object() {
            for (name, prop) in properties {
                let mut param = ToolParameter::new(
                    name,
                    prop["description"].as_str().unwrap_or_default(),
                    required.contains(&name.as_str()),
                )
                .with_type(prop["type"].as_str().unwrap_or("string"));
                if let Some(default) = prop["default"].as_str() {
                    param = param.with_default(default);
                }
                tool = tool.with_parameter(param);
            }
        }
        tool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbassist_domain::tool::catalog::{ToolKind, default_tool_spec};

    #[test]
    fn test_input_schema() {
        let schema = JsonSchemaToolConverter::input_schema(&ToolKind::InsertUser.definition());

        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["name"]["type"], "string");
        assert_eq!(schema["properties"]["email"]["type"], "string");

        let required = schema["required"].as_array().unwrap();
        assert!(required.contains(&serde_json::json!("name")));
        assert!(required.contains(&serde_json::json!("email")));
    }

    #[test]
    fn test_optional_parameter_carries_default() {
        let schema = JsonSchemaToolConverter::input_schema(&ToolKind::CreateTable.definition());
        assert_eq!(schema["properties"]["table_name"]["default"], "users");
        assert!(schema["required"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_descriptors_sorted() {
        let descriptors = JsonSchemaToolConverter::descriptors(&default_tool_spec());
        let names: Vec<&str> = descriptors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["create_table", "insert_user", "list_users"]);
    }

    #[test]
    fn test_descriptor_back_to_definition() {
        for kind in ToolKind::ALL {
            let original = kind.definition();
            let rebuilt =
                JsonSchemaToolConverter::from_descriptor(&JsonSchemaToolConverter::to_descriptor(
                    &original,
                ));
            assert_eq!(rebuilt.name, original.name);
            let mut names: Vec<&str> = rebuilt.parameter_names().collect();
            let mut expected: Vec<&str> = original.parameter_names().collect();
            names.sort();
            expected.sort();
            assert_eq!(names, expected);
            for param in &original.parameters {
                let other = rebuilt
                    .parameters
                    .iter()
                    .find(|p| p.name == param.name)
                    .unwrap();
                assert_eq!(other.required, param.required);
                assert_eq!(other.default, param.default);
            }
        }
    }

    #[test]
    fn test_descriptor_without_schema() {
        let descriptor = ToolDescriptor {
            name: "odd".into(),
            description: String::new(),
            input_schema: serde_json::json!({}),
        };
        let tool = JsonSchemaToolConverter::from_descriptor(&descriptor);
        assert!(tool.parameters.is_empty());
    }
}
