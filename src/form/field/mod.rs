mod control;
mod convert;
mod edit;
mod render;
mod richtext;

pub use control::{Control, InputKind, OptionView, OptionsStatus, ToggleStyle, Widget};
pub use convert::value_to_string;
pub use edit::{FieldInput, apply_input};
pub use render::FieldRenderer;
pub use richtext::{RichLine, RichLineKind, RichPreview, RichSpan};
