use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{
    ConfigurationError, FieldType, FormMode, SubmitActions, TabDescriptor, ValidationMode,
    ValuesMap,
};

/// Declarative form document, the shape accepted from JSON/YAML/TOML files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub mode: FormMode,
    pub tabs: Vec<TabDescriptor>,
    #[serde(default)]
    pub initial_values: ValuesMap,
    /// Optional JSON Schema replacing the one derived from the descriptors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit_button_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_button_text: Option<String>,
    #[serde(default)]
    pub actions: SubmitActions,
    #[serde(default)]
    pub validation_mode: ValidationMode,
}

/// Parses a definition document, reporting unknown field type tags by field.
pub fn parse_form_definition(document: &Value) -> Result<FormDefinition, ConfigurationError> {
    check_field_types(document)?;
    serde_json::from_value(document.clone())
        .map_err(|err| ConfigurationError::InvalidDefinition(err.to_string()))
}

fn check_field_types(document: &Value) -> Result<(), ConfigurationError> {
    let fields = document
        .get("tabs")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|tab| tab.get("sections").and_then(Value::as_array))
        .flatten()
        .filter_map(|section| section.get("fields").and_then(Value::as_array))
        .flatten();

    for field in fields {
        let Some(tag) = field.get("type").and_then(Value::as_str) else {
            continue;
        };
        if tag.parse::<FieldType>().is_err() {
            let name = field
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("<unnamed>");
            return Err(ConfigurationError::UnknownFieldType {
                field: name.to_string(),
                tag: tag.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SubmitAction;
    use serde_json::json;

    fn document() -> Value {
        json!({
            "title": "User",
            "mode": "edit",
            "validationMode": "on_change",
            "actions": { "saveAndStay": false },
            "initialValues": { "name": "Ada" },
            "tabs": [{
                "id": "general",
                "label": "General",
                "sections": [{
                    "title": "Profile",
                    "fields": [
                        { "name": "name", "label": "Name", "type": "text", "required": true,
                          "validation": { "maxLength": 32 } },
                        { "name": "role", "label": "Role", "type": "select",
                          "options": [{ "value": "admin", "label": "Admin" }] }
                    ]
                }]
            }]
        })
    }

    #[test]
    fn parses_camel_case_document() {
        let definition = parse_form_definition(&document()).unwrap();
        assert_eq!(definition.mode, FormMode::Edit);
        assert_eq!(definition.validation_mode, ValidationMode::OnChange);
        assert!(definition.actions.offers(SubmitAction::Save));
        assert!(!definition.actions.offers(SubmitAction::SaveAndStay));
        assert_eq!(definition.initial_values["name"], json!("Ada"));

        let field = &definition.tabs[0].sections[0].fields[0];
        assert!(field.required);
        assert_eq!(field.validation.max_length, Some(32));
    }

    #[test]
    fn unknown_type_names_the_field() {
        let mut doc = document();
        doc["tabs"][0]["sections"][0]["fields"][1]["type"] = json!("colour");
        let err = parse_form_definition(&doc).unwrap_err();
        match err {
            ConfigurationError::UnknownFieldType { field, tag } => {
                assert_eq!(field, "role");
                assert_eq!(tag, "colour");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_tabs_is_invalid_definition() {
        let err = parse_form_definition(&json!({ "title": "x" })).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidDefinition(_)));
    }
}
