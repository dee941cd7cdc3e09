use thiserror::Error;

/// Raised when a field type tag is not part of the closed [`FieldType`](super::FieldType) set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown field type `{0}`")]
pub struct UnknownFieldType(pub String);

/// Developer-facing misconfiguration, surfaced once while a form is mounted.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("field `{field}` uses unknown field type `{tag}`")]
    UnknownFieldType { field: String, tag: String },
    #[error("field `{field}` depends on undeclared field `{target}`")]
    UnknownDependency { field: String, target: String },
    #[error("field `{0}` depends on itself")]
    SelfDependency(String),
    #[error("dependency cycle: {}", chain.join(" -> "))]
    DependencyCycle { chain: Vec<String> },
    #[error("duplicate field name `{0}`")]
    DuplicateField(String),
    #[error("duplicate tab id `{0}`")]
    DuplicateTab(String),
    #[error("invalid pattern for field `{field}`: {message}")]
    InvalidPattern { field: String, message: String },
    #[error("no field named `{0}` is declared")]
    UnknownField(String),
    #[error("field `{0}` does not take an option list")]
    NotOptionBacked(String),
    #[error("no submit action is offered")]
    NoSubmitActions,
    #[error("invalid validation schema: {0}")]
    InvalidSchema(String),
    #[error("invalid form definition: {0}")]
    InvalidDefinition(String),
}
