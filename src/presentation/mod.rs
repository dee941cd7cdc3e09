mod components;
mod view;

pub use view::{ButtonView, PopupRender, UiContext, draw};
