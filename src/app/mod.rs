mod form_ui;
pub(crate) mod input;
mod options;
mod popup;
mod runtime;
mod status;
mod terminal;

pub use form_ui::FormUI;
pub use options::UiOptions;
