use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::UnknownFieldType;

/// Closed set of controls a field descriptor can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldType {
    Text,
    Email,
    Password,
    Url,
    Textarea,
    RichText,
    Number,
    Select,
    MultiSelect,
    RoleMultiSelect,
    Checkbox,
    Switch,
    Date,
}

impl FieldType {
    pub const ALL: [FieldType; 13] = [
        FieldType::Text,
        FieldType::Email,
        FieldType::Password,
        FieldType::Url,
        FieldType::Textarea,
        FieldType::RichText,
        FieldType::Number,
        FieldType::Select,
        FieldType::MultiSelect,
        FieldType::RoleMultiSelect,
        FieldType::Checkbox,
        FieldType::Switch,
        FieldType::Date,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Email => "email",
            FieldType::Password => "password",
            FieldType::Url => "url",
            FieldType::Textarea => "textarea",
            FieldType::RichText => "richtext",
            FieldType::Number => "number",
            FieldType::Select => "select",
            FieldType::MultiSelect => "multiselect",
            FieldType::RoleMultiSelect => "role-multiselect",
            FieldType::Checkbox => "checkbox",
            FieldType::Switch => "switch",
            FieldType::Date => "date",
        }
    }

    /// Types edited as a free text buffer.
    pub fn is_textual(self) -> bool {
        matches!(
            self,
            FieldType::Text
                | FieldType::Email
                | FieldType::Password
                | FieldType::Url
                | FieldType::Textarea
                | FieldType::RichText
                | FieldType::Date
        )
    }

    pub fn is_option_backed(self) -> bool {
        matches!(
            self,
            FieldType::Select | FieldType::MultiSelect | FieldType::RoleMultiSelect
        )
    }

    pub fn is_multi(self) -> bool {
        matches!(self, FieldType::MultiSelect | FieldType::RoleMultiSelect)
    }

    pub fn is_toggle(self) -> bool {
        matches!(self, FieldType::Checkbox | FieldType::Switch)
    }

    pub fn is_multiline(self) -> bool {
        matches!(self, FieldType::Textarea | FieldType::RichText)
    }

    /// Value a declared field starts with when the seed omits it.
    pub fn empty_value(self) -> Value {
        match self {
            FieldType::Text
            | FieldType::Email
            | FieldType::Password
            | FieldType::Url
            | FieldType::Textarea
            | FieldType::RichText => Value::String(String::new()),
            FieldType::Number | FieldType::Select | FieldType::Date => Value::Null,
            FieldType::MultiSelect | FieldType::RoleMultiSelect => Value::Array(Vec::new()),
            FieldType::Checkbox | FieldType::Switch => Value::Bool(false),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = UnknownFieldType;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let normalized = tag.trim().to_ascii_lowercase();
        let field_type = match normalized.as_str() {
            "text" => FieldType::Text,
            "email" => FieldType::Email,
            "password" => FieldType::Password,
            "url" => FieldType::Url,
            "textarea" => FieldType::Textarea,
            "richtext" | "rich-text" => FieldType::RichText,
            "number" => FieldType::Number,
            "select" => FieldType::Select,
            "multiselect" | "multi-select" => FieldType::MultiSelect,
            "role-multiselect" | "role-multi-select" => FieldType::RoleMultiSelect,
            "checkbox" => FieldType::Checkbox,
            "switch" => FieldType::Switch,
            "date" => FieldType::Date,
            _ => return Err(UnknownFieldType(tag.to_string())),
        };
        Ok(field_type)
    }
}

impl TryFrom<String> for FieldType {
    type Error = UnknownFieldType;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        tag.parse()
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tags_round_trip_through_display() {
        for field_type in FieldType::ALL {
            assert_eq!(field_type.as_str().parse::<FieldType>().unwrap(), field_type);
        }
    }

    #[test]
    fn accepts_dashed_aliases() {
        assert_eq!("rich-text".parse::<FieldType>().unwrap(), FieldType::RichText);
        assert_eq!(
            "Multi-Select".parse::<FieldType>().unwrap(),
            FieldType::MultiSelect
        );
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = "colour".parse::<FieldType>().unwrap_err();
        assert_eq!(err.0, "colour");
    }

    #[test]
    fn deserializes_from_tag() {
        let parsed: FieldType = serde_json::from_value(json!("role-multiselect")).unwrap();
        assert_eq!(parsed, FieldType::RoleMultiSelect);
        assert!(serde_json::from_value::<FieldType>(json!("slider")).is_err());
    }

    #[test]
    fn empty_values_match_control_shape() {
        assert_eq!(FieldType::Text.empty_value(), json!(""));
        assert_eq!(FieldType::Number.empty_value(), Value::Null);
        assert_eq!(FieldType::Switch.empty_value(), json!(false));
        assert_eq!(FieldType::RoleMultiSelect.empty_value(), json!([]));
    }
}
