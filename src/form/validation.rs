use std::future::Future;

use futures::future::{self, FutureExt, LocalBoxFuture};
use indexmap::IndexMap;
use jsonschema::{Draft, Validator, error::ValidationErrorKind};
use serde_json::{Map, Value, json};

use crate::domain::{
    ConfigurationError, ErrorMap, FieldDescriptor, FieldType, FormLayout, SelectOption, ValuesMap,
};

/// Validation collaborator: maps field values to per-field messages.
///
/// The form only ever hands over the values of active fields.
pub trait FormValidator {
    fn validate(&self, values: &ValuesMap) -> ErrorMap;
}

impl<F> FormValidator for F
where
    F: Fn(&ValuesMap) -> ErrorMap,
{
    fn validate(&self, values: &ValuesMap) -> ErrorMap {
        self(values)
    }
}

/// Validation collaborator whose verdict may arrive later, such as a
/// uniqueness check against a backend. Every [`FormValidator`] is one, with
/// a verdict that is ready immediately.
pub trait AsyncValidator {
    fn verdict(&self, values: ValuesMap) -> LocalBoxFuture<'static, ErrorMap>;
}

impl<V> AsyncValidator for V
where
    V: FormValidator + ?Sized,
{
    fn verdict(&self, values: ValuesMap) -> LocalBoxFuture<'static, ErrorMap> {
        future::ready(FormValidator::validate(self, &values)).boxed_local()
    }
}

/// Adapts an async closure `Fn(ValuesMap) -> impl Future<Output = ErrorMap>`.
#[derive(Debug, Clone, Copy)]
pub struct Deferred<F>(pub F);

impl<F, Fut> AsyncValidator for Deferred<F>
where
    F: Fn(ValuesMap) -> Fut,
    Fut: Future<Output = ErrorMap> + 'static,
{
    fn verdict(&self, values: ValuesMap) -> LocalBoxFuture<'static, ErrorMap> {
        (self.0)(values).boxed_local()
    }
}

/// Accepts everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValidation;

impl FormValidator for NoValidation {
    fn validate(&self, _values: &ValuesMap) -> ErrorMap {
        ErrorMap::new()
    }
}

#[derive(Debug, Clone)]
struct FieldMeta {
    label: String,
    field_type: FieldType,
}

/// JSON Schema backed validator.
///
/// Blank values (`null`, `""`, `[]`) are left out of the validated instance
/// so `required` reads as "must not be empty". Errors that cannot be pinned
/// to a field are reported under the empty key.
pub struct SchemaValidator {
    validator: Validator,
    fields: IndexMap<String, FieldMeta>,
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl SchemaValidator {
    /// Compiles a caller supplied schema.
    pub fn new(schema: &Value) -> Result<Self, ConfigurationError> {
        let validator = jsonschema::validator_for(schema)
            .map_err(|err| ConfigurationError::InvalidSchema(err.to_string()))?;
        Ok(Self {
            validator,
            fields: IndexMap::new(),
        })
    }

    /// Compiles a caller supplied schema, borrowing labels from the layout.
    pub fn with_layout(schema: &Value, layout: &FormLayout) -> Result<Self, ConfigurationError> {
        let mut validator = Self::new(schema)?;
        validator.fields = field_meta(layout);
        Ok(validator)
    }

    /// Builds a draft-07 schema from the descriptors' advisory constraints.
    pub fn derive(layout: &FormLayout) -> Result<Self, ConfigurationError> {
        let schema = derive_schema(layout);
        let validator = jsonschema::options()
            .with_draft(Draft::Draft7)
            .should_validate_formats(true)
            .build(&schema)
            .map_err(|err| ConfigurationError::InvalidSchema(err.to_string()))?;
        Ok(Self {
            validator,
            fields: field_meta(layout),
        })
    }

    fn label<'a>(&'a self, name: &'a str) -> &'a str {
        self.fields
            .get(name)
            .map(|meta| meta.label.as_str())
            .unwrap_or(name)
    }

    fn message_for(&self, field: &str, kind: &ValidationErrorKind, fallback: String) -> String {
        let meta = self.fields.get(field);
        match kind {
            ValidationErrorKind::Required { .. } => format!("{} is required", self.label(field)),
            _ if meta.is_some_and(|meta| meta.field_type.is_toggle()) => {
                format!("{} must be checked", self.label(field))
            }
            _ => fallback,
        }
    }
}

impl FormValidator for SchemaValidator {
    fn validate(&self, values: &ValuesMap) -> ErrorMap {
        let instance = Value::Object(
            values
                .iter()
                .filter(|(_, value)| !is_blank(value))
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect::<Map<String, Value>>(),
        );

        let mut errors = ErrorMap::new();
        for error in self.validator.iter_errors(&instance) {
            let pointer = error.instance_path.to_string();
            let field = match &error.kind {
                ValidationErrorKind::Required { property } => property
                    .as_str()
                    .map(str::to_string)
                    .unwrap_or_default(),
                _ => first_segment(&pointer),
            };
            if errors.contains_key(&field) {
                continue;
            }
            let message = self.message_for(&field, &error.kind, error.to_string());
            errors.insert(field, message);
        }
        errors
    }
}

fn field_meta(layout: &FormLayout) -> IndexMap<String, FieldMeta> {
    layout
        .fields()
        .map(|field| {
            (
                field.name.clone(),
                FieldMeta {
                    label: field.display_label().to_string(),
                    field_type: field.field_type,
                },
            )
        })
        .collect()
}

fn first_segment(pointer: &str) -> String {
    pointer
        .trim_start_matches('/')
        .split('/')
        .next()
        .unwrap_or_default()
        .replace("~1", "/")
        .replace("~0", "~")
}

pub(crate) fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

pub(crate) fn derive_schema(layout: &FormLayout) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in layout.fields() {
        let rules = &field.validation;
        let mut property = Map::new();
        match field.field_type {
            FieldType::Text
            | FieldType::Password
            | FieldType::Textarea
            | FieldType::RichText
            | FieldType::Email
            | FieldType::Url
            | FieldType::Date => {
                property.insert("type".into(), json!("string"));
                if let Some(min) = rules.min_length {
                    property.insert("minLength".into(), json!(min));
                }
                if let Some(max) = rules.max_length {
                    property.insert("maxLength".into(), json!(max));
                }
                if let Some(pattern) = &rules.pattern {
                    property.insert("pattern".into(), json!(pattern));
                }
                let format = match field.field_type {
                    FieldType::Email => Some("email"),
                    FieldType::Url => Some("uri"),
                    FieldType::Date => Some("date"),
                    _ => None,
                };
                if let Some(format) = format {
                    property.insert("format".into(), json!(format));
                }
            }
            FieldType::Number => {
                property.insert("type".into(), json!("number"));
                if let Some(min) = rules.min {
                    property.insert("minimum".into(), json!(min));
                }
                if let Some(max) = rules.max {
                    property.insert("maximum".into(), json!(max));
                }
                if let Some(step) = rules.step.filter(|step| *step > 0.0) {
                    property.insert("multipleOf".into(), json!(step));
                }
            }
            // Option membership depends on the live option list, see `choice_error`.
            FieldType::Select => {}
            FieldType::MultiSelect | FieldType::RoleMultiSelect => {
                property.insert("type".into(), json!("array"));
                property.insert("uniqueItems".into(), json!(true));
            }
            FieldType::Checkbox | FieldType::Switch => {
                property.insert("type".into(), json!("boolean"));
                if field.required {
                    property.insert("const".into(), json!(true));
                }
            }
        }
        if field.required {
            required.push(Value::String(field.name.clone()));
        }
        properties.insert(field.name.clone(), Value::Object(property));
    }

    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// Checks a choice value against the options currently offered for it.
///
/// An empty list means the field takes free values.
pub(crate) fn choice_error(
    field: &FieldDescriptor,
    value: &Value,
    options: &[SelectOption],
) -> Option<String> {
    if options.is_empty() || is_blank(value) {
        return None;
    }
    let offered = |candidate: &Value| options.iter().any(|option| &option.value == candidate);
    let accepted = match value {
        Value::Array(items) if field.field_type.is_multi() => items.iter().all(offered),
        single => offered(single),
    };
    (!accepted).then(|| format!("{} is not an available option", field.display_label()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        FieldDescriptor, SectionDescriptor, SelectOption, TabDescriptor, ValidationRules,
    };

    fn layout() -> FormLayout {
        FormLayout::new(vec![
            TabDescriptor::new("main", "Main").with_section(
                SectionDescriptor::new("Profile").with_fields([
                    FieldDescriptor::new("name", "Name", FieldType::Text)
                        .required()
                        .with_validation(ValidationRules::default().with_length(Some(2), Some(8))),
                    FieldDescriptor::new("email", "Email", FieldType::Email),
                    FieldDescriptor::new("age", "Age", FieldType::Number)
                        .with_validation(ValidationRules::default().with_range(Some(0.0), Some(130.0))),
                    FieldDescriptor::new("role", "Role", FieldType::Select).with_options(vec![
                        SelectOption::new("admin", "Admin"),
                        SelectOption::new("user", "User"),
                    ]),
                    FieldDescriptor::new("terms", "Terms", FieldType::Checkbox).required(),
                ]),
            ),
        ])
        .unwrap()
    }

    fn values(value: Value) -> ValuesMap {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn blank_required_field_reports_label() {
        let validator = SchemaValidator::derive(&layout()).unwrap();
        let errors = validator.validate(&values(json!({ "name": "", "terms": true })));
        assert_eq!(errors.get("name").map(String::as_str), Some("Name is required"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn constraint_errors_are_keyed_by_field() {
        let validator = SchemaValidator::derive(&layout()).unwrap();
        let errors = validator.validate(&values(json!({
            "name": "a much too long name",
            "email": "not-an-email",
            "age": 200,
            "role": "root",
            "terms": false,
        })));
        for key in ["name", "email", "age", "terms"] {
            assert!(errors.contains_key(key), "missing error for {key}: {errors:?}");
        }
        assert_eq!(errors["terms"], "Terms must be checked");
    }

    #[test]
    fn valid_values_pass() {
        let validator = SchemaValidator::derive(&layout()).unwrap();
        let errors = validator.validate(&values(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "age": 36,
            "role": "admin",
            "terms": true,
            "undeclared": 1,
        })));
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn number_step_is_enforced() {
        let layout = FormLayout::new(vec![TabDescriptor::new("main", "Main").with_section(
            SectionDescriptor::new("Pricing").with_field(
                FieldDescriptor::new("price", "Price", FieldType::Number)
                    .with_validation(ValidationRules::default().with_step(0.5)),
            ),
        )])
        .unwrap();
        let validator = SchemaValidator::derive(&layout).unwrap();
        assert!(validator.validate(&values(json!({ "price": 2.5 }))).is_empty());
        assert!(validator.validate(&values(json!({ "price": 2.25 }))).contains_key("price"));
    }

    #[test]
    fn choices_are_checked_against_offered_options() {
        let layout = layout();
        let role = layout.field("role").unwrap();
        let offered = [SelectOption::new("admin", "Admin")];
        assert!(choice_error(role, &json!("admin"), &offered).is_none());
        assert_eq!(
            choice_error(role, &json!("root"), &offered).as_deref(),
            Some("Role is not an available option")
        );
        assert!(choice_error(role, &json!("root"), &[]).is_none());
        assert!(choice_error(role, &Value::Null, &offered).is_none());

        let tags = FieldDescriptor::new("tags", "Tags", FieldType::MultiSelect);
        assert!(choice_error(&tags, &json!(["admin"]), &offered).is_none());
        assert!(choice_error(&tags, &json!(["admin", "x"]), &offered).is_some());
    }

    #[test]
    fn plain_validators_have_ready_verdicts() {
        let verdict = NoValidation.verdict(values(json!({ "name": "" })));
        assert_eq!(verdict.now_or_never(), Some(ErrorMap::new()));
    }

    #[test]
    fn deferred_closures_are_async_validators() {
        let validator = Deferred(|values: ValuesMap| async move {
            let mut errors = ErrorMap::new();
            if values.get("name") == Some(&json!("taken")) {
                errors.insert("name".into(), "already in use".into());
            }
            errors
        });
        let errors = futures::executor::block_on(validator.verdict(values(json!({ "name": "taken" }))));
        assert_eq!(errors["name"], "already in use");
    }

    #[test]
    fn repeated_validation_is_stable() {
        let validator = SchemaValidator::derive(&layout()).unwrap();
        let input = values(json!({ "name": "x", "age": -1 }));
        assert_eq!(validator.validate(&input), validator.validate(&input));
    }

    #[test]
    fn custom_schema_uses_layout_labels() {
        let schema = json!({ "type": "object", "required": ["email"] });
        let validator = SchemaValidator::with_layout(&schema, &layout()).unwrap();
        let errors = validator.validate(&values(json!({ "email": "" })));
        assert_eq!(errors["email"], "Email is required");
    }

    #[test]
    fn malformed_schema_is_configuration_error() {
        let err = SchemaValidator::new(&json!({ "type": 12 })).unwrap_err();
        assert!(matches!(err, ConfigurationError::InvalidSchema(_)));
    }

    #[test]
    fn closures_are_validators() {
        let validator = |values: &ValuesMap| {
            let mut errors = ErrorMap::new();
            if values.get("name") == Some(&json!("root")) {
                errors.insert("name".into(), "reserved".into());
            }
            errors
        };
        assert_eq!(validator.validate(&values(json!({ "name": "root" }))).len(), 1);
        assert!(NoValidation.validate(&values(json!({ "name": "root" }))).is_empty());
    }
}
