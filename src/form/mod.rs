mod dependency;
mod engine;
mod error;
mod field;
mod options;
mod state;
mod submit;
mod tabs;
mod validation;

pub use dependency::{ActiveSet, is_active};
pub use engine::{
    EntityForm, FormConfig, FormHandle, FormPhase, PendingSubmission, PendingValidation,
    RenderedSection, RenderedTab, SubmitAttempt, SubmitOutcome, TabSummary,
};
pub use error::SubmissionError;
pub use field::{
    Control, FieldInput, FieldRenderer, InputKind, OptionView, OptionsStatus, RichLine, RichLineKind,
    RichPreview, RichSpan, ToggleStyle, Widget, apply_input, value_to_string,
};
pub use options::{OptionSnapshot, OptionSource, SharedOptions};
pub use state::FormStateController;
pub use submit::{
    ButtonState, SubmitContext, SubmitFuture, SubmitHandler, SubmitRequest, SubmitRouter,
    SubmitStage, SubmitTicket,
};
pub use tabs::{TabChange, TabControl, TabNavigator};
pub use validation::{AsyncValidator, Deferred, FormValidator, NoValidation, SchemaValidator};
