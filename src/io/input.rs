use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::domain::{FormDefinition, SelectOption, ValuesMap, parse_form_definition};

use super::DocumentFormat;

/// Parse structured data in any supported format into a `serde_json::Value`.
pub fn parse_document_str(contents: &str, format: DocumentFormat) -> Result<Value> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str::<Value>(contents).with_context(|| "failed to parse JSON document")
        }
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => {
            serde_yaml::from_str::<Value>(contents).with_context(|| "failed to parse YAML document")
        }
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => contents
            .parse::<toml::Value>()
            .with_context(|| "failed to parse TOML document")
            .and_then(|value| {
                serde_json::to_value(value).context("failed to convert TOML to JSON")
            }),
    }
}

/// Parse a form definition document.
pub fn form_definition_from_str(contents: &str, format: DocumentFormat) -> Result<FormDefinition> {
    let document = parse_document_str(contents, format)?;
    parse_form_definition(&document).context("invalid form definition")
}

/// Parse a flat `field -> value` document used to seed a form.
pub fn values_from_str(contents: &str, format: DocumentFormat) -> Result<ValuesMap> {
    let document = parse_document_str(contents, format)?;
    values_from_value(document)
}

pub fn values_from_value(document: Value) -> Result<ValuesMap> {
    match document {
        Value::Object(map) => Ok(map.into_iter().collect()),
        Value::Null => Ok(ValuesMap::new()),
        other => bail!("initial values must be an object, got {}", kind_of(&other)),
    }
}

/// Accepts `["a", "b"]`, `[{"value": .., "label": ..}]` or `{"value": "label"}`.
pub fn options_from_value(document: &Value) -> Result<Vec<SelectOption>> {
    match document {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| option_from_item(item).with_context(|| format!("option #{index}")))
            .collect(),
        Value::Object(map) => Ok(map
            .iter()
            .map(|(value, label)| {
                let label = label
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_else(|| label.to_string());
                SelectOption::new(value.clone(), label)
            })
            .collect()),
        other => bail!("option list must be an array or object, got {}", kind_of(other)),
    }
}

fn option_from_item(item: &Value) -> Result<SelectOption> {
    match item {
        Value::Object(map) => {
            let value = map
                .get("value")
                .cloned()
                .context("option object needs a `value`")?;
            let label = match map.get("label") {
                Some(Value::String(label)) => label.clone(),
                Some(other) => other.to_string(),
                None => label_for(&value),
            };
            Ok(SelectOption { value, label })
        }
        Value::Array(_) => bail!("nested arrays are not valid options"),
        scalar => Ok(SelectOption {
            value: scalar.clone(),
            label: label_for(scalar),
        }),
    }
}

fn label_for(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
