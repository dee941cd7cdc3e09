mod format;
mod input;
mod output;

pub use format::DocumentFormat;
pub use input::{
    form_definition_from_str, options_from_value, parse_document_str, values_from_str,
    values_from_value,
};
pub use output::{OutputDestination, OutputOptions, emit};
