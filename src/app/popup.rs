use crate::{
    form::{Control, FieldInput, Widget},
    presentation::PopupRender,
};

/// Option picker opened on a select-like control.
pub(crate) struct PopupState {
    field: String,
    title: String,
    options: Vec<String>,
    marks: Vec<bool>,
    selected: usize,
    multi: bool,
}

impl PopupState {
    pub(crate) fn from_control(control: &Control) -> Option<Self> {
        if control.disabled {
            return None;
        }
        let (options, selected, multi) = match &control.widget {
            Widget::Choice {
                options, selected, ..
            } => (options, selected.unwrap_or(0), false),
            Widget::MultiChoice { options, .. } => (options, 0, true),
            _ => return None,
        };
        Some(Self {
            field: control.name.clone(),
            title: control.label.clone(),
            options: options.iter().map(|option| option.label.clone()).collect(),
            marks: options.iter().map(|option| option.selected).collect(),
            selected,
            multi,
        })
    }

    pub(crate) fn select_previous(&mut self) {
        if self.options.is_empty() {
            return;
        }
        if self.selected == 0 {
            self.selected = self.options.len().saturating_sub(1);
        } else {
            self.selected -= 1;
        }
    }

    pub(crate) fn select_next(&mut self) {
        if self.options.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.options.len();
    }

    pub(crate) fn field(&self) -> &str {
        &self.field
    }

    pub(crate) fn is_multi(&self) -> bool {
        self.multi
    }

    /// Input that applies the highlighted entry to the field.
    pub(crate) fn input(&self) -> FieldInput {
        if self.multi {
            FieldInput::ToggleOption(self.selected)
        } else {
            FieldInput::Choose(self.selected)
        }
    }

    /// Refreshes check marks after a multi-select toggle.
    pub(crate) fn sync_marks(&mut self, control: &Control) {
        if let Widget::MultiChoice { options, .. } = &control.widget {
            self.marks = options.iter().map(|option| option.selected).collect();
        }
    }

    pub(crate) fn as_render(&self) -> PopupRender<'_> {
        PopupRender {
            title: &self.title,
            options: &self.options,
            selected: self.selected,
            multi: self.multi,
            marks: &self.marks,
        }
    }
}
