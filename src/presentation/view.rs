use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::form::{ButtonState, RenderedTab, TabSummary};

use super::components::{render_body, render_footer, render_popup};

pub struct UiContext<'a> {
    pub title: Option<&'a str>,
    pub tabs: &'a [TabSummary],
    pub active_tab: usize,
    pub tab: Option<&'a RenderedTab>,
    pub focus: Option<&'a str>,
    pub buttons: &'a [ButtonView],
    pub cancel_label: &'a str,
    pub status_message: &'a str,
    pub dirty: bool,
    pub error_count: usize,
    /// Error not tied to a single field.
    pub form_error: Option<&'a str>,
    pub help: Option<&'a str>,
    pub popup: Option<PopupRender<'a>>,
}

/// One submit control as shown in the footer.
#[derive(Debug, Clone)]
pub struct ButtonView {
    pub label: String,
    pub shortcut: &'static str,
    pub state: ButtonState,
}

pub struct PopupRender<'a> {
    pub title: &'a str,
    pub options: &'a [String],
    pub selected: usize,
    pub multi: bool,
    pub marks: &'a [bool],
}

pub fn draw(frame: &mut Frame<'_>, ctx: UiContext<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(7), Constraint::Length(4)])
        .split(frame.area());

    render_body(frame, chunks[0], &ctx);
    render_footer(frame, chunks[1], &ctx);

    if let Some(popup) = &ctx.popup {
        render_popup(frame, popup);
    }
}
