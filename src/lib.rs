#![deny(rust_2018_idioms)]

//! Tabbed entity forms: typed field descriptors, dependency-driven
//! visibility, validation and tagged submissions, with an optional
//! terminal front end.

pub mod domain;
pub mod form;
pub mod io;

#[cfg(feature = "tui")]
mod app;
#[cfg(feature = "tui")]
mod presentation;

#[cfg(feature = "tui")]
pub use app::{FormUI, UiOptions};
pub use domain::{
    ConfigurationError, FieldDescriptor, FieldType, FormDefinition, FormMode, SectionDescriptor,
    SelectOption, SubmitAction, SubmitActions, TabDescriptor, ValidationMode, ValidationRules,
};
pub use form::{
    EntityForm, FormConfig, FormHandle, FormPhase, SubmissionError, SubmitAttempt, SubmitContext,
};

pub mod prelude {
    #[cfg(feature = "tui")]
    pub use super::{FormUI, UiOptions};
    pub use super::{
        ConfigurationError, EntityForm, FieldDescriptor, FieldType, FormConfig, FormMode,
        FormPhase, SectionDescriptor, SelectOption, SubmissionError, SubmitAction, SubmitActions,
        SubmitAttempt, SubmitContext, TabDescriptor, ValidationMode, ValidationRules,
    };
    pub use super::domain::{ErrorMap, ValuesMap};
    pub use super::io::{DocumentFormat, OutputDestination, OutputOptions};
}
