mod definition;
mod descriptor;
mod error;
mod field_type;
mod layout;
mod settings;

pub use definition::{FormDefinition, parse_form_definition};
pub use descriptor::{
    DependsOn, FieldDescriptor, SectionDescriptor, SelectOption, TabDescriptor, ValidationRules,
};
pub use error::{ConfigurationError, UnknownFieldType};
pub use field_type::FieldType;
pub use layout::{FieldLocation, FormLayout};
pub use settings::{FormMode, SubmitAction, SubmitActions, ValidationMode};

use indexmap::IndexMap;
use serde_json::Value;

/// Current form values keyed by field name, in insertion order.
pub type ValuesMap = IndexMap<String, Value>;

/// Validation messages keyed by field name.
pub type ErrorMap = IndexMap<String, String>;
