use std::collections::HashSet;

use serde_json::Value;

use crate::{
    domain::{FieldDescriptor, FieldType, SelectOption},
    form::options::OptionSnapshot,
};

use super::{
    control::{Control, InputKind, OptionView, OptionsStatus, ToggleStyle, Widget},
    convert::value_to_string,
    richtext::RichPreview,
};

const EMPTY_OPTIONS_LABEL: &str = "No options available";

/// Maps a descriptor plus its value and error to a [`Control`].
///
/// Also owns per-field transient state (password reveal) keyed by field name.
#[derive(Debug, Clone)]
pub struct FieldRenderer {
    mask: char,
    revealed: HashSet<String>,
}

impl Default for FieldRenderer {
    fn default() -> Self {
        Self::new('•')
    }
}

impl FieldRenderer {
    pub fn new(mask: char) -> Self {
        Self {
            mask,
            revealed: HashSet::new(),
        }
    }

    pub fn with_mask(mut self, mask: char) -> Self {
        self.mask = mask;
        self
    }

    pub fn toggle_reveal(&mut self, name: &str) -> bool {
        if !self.revealed.remove(name) {
            self.revealed.insert(name.to_string());
            return true;
        }
        false
    }

    pub fn is_revealed(&self, name: &str) -> bool {
        self.revealed.contains(name)
    }

    /// Drops transient state for a field that left the active set.
    pub fn forget(&mut self, name: &str) {
        self.revealed.remove(name);
    }

    pub fn clear(&mut self) {
        self.revealed.clear();
    }

    /// `options` overrides the descriptor's static list for option-backed types.
    pub fn render(
        &self,
        field: &FieldDescriptor,
        value: Option<&Value>,
        error: Option<&str>,
        options: Option<&OptionSnapshot>,
    ) -> Control {
        let empty = field.field_type.empty_value();
        let value = value.unwrap_or(&empty);
        let mut disabled = field.disabled;

        let widget = match field.field_type {
            FieldType::Text => input(field, value, InputKind::Text),
            FieldType::Email => input(field, value, InputKind::Email),
            FieldType::Url => input(field, value, InputKind::Url),
            FieldType::Date => input(field, value, InputKind::Date),
            FieldType::Password => self.secret(field, value),
            FieldType::Textarea => text_area(field, value),
            FieldType::RichText => rich_text(value),
            FieldType::Number => number(field, value),
            FieldType::Checkbox => toggle(value, ToggleStyle::Checkbox),
            FieldType::Switch => toggle(value, ToggleStyle::Switch),
            FieldType::Select => {
                let snapshot = snapshot_for(field, options);
                disabled |= snapshot.is_loading;
                choice(snapshot.options(), value, status_of(&snapshot))
            }
            FieldType::MultiSelect => {
                let snapshot = snapshot_for(field, options);
                disabled |= snapshot.is_loading;
                multi_choice(snapshot.options(), value, status_of(&snapshot), false)
            }
            FieldType::RoleMultiSelect => {
                let snapshot = snapshot_for(field, options);
                disabled |= snapshot.is_loading;
                multi_choice(snapshot.options(), value, status_of(&snapshot), true)
            }
        };

        Control {
            name: field.name.clone(),
            label: field.display_label().to_string(),
            field_type: field.field_type,
            required: field.required,
            placeholder: field.placeholder.clone(),
            description: field.description.clone(),
            disabled,
            error: error.filter(|message| !message.is_empty()).map(str::to_string),
            widget,
        }
    }

    fn secret(&self, field: &FieldDescriptor, value: &Value) -> Widget {
        let text = value_to_string(value);
        let revealed = self.is_revealed(&field.name);
        let display = if revealed {
            text.clone()
        } else {
            std::iter::repeat_n(self.mask, text.chars().count()).collect()
        };
        Widget::Secret {
            text,
            display,
            revealed,
        }
    }
}

fn input(field: &FieldDescriptor, value: &Value, kind: InputKind) -> Widget {
    Widget::Input {
        text: value_to_string(value),
        kind,
        max_length: field.validation.max_length,
    }
}

fn text_area(field: &FieldDescriptor, value: &Value) -> Widget {
    let text = value_to_string(value);
    Widget::TextArea {
        lines: text.lines().map(str::to_string).collect(),
        max_length: field.validation.max_length,
    }
}

fn rich_text(value: &Value) -> Widget {
    let source = value_to_string(value);
    let preview = RichPreview::parse(&source);
    Widget::RichText { source, preview }
}

fn number(field: &FieldDescriptor, value: &Value) -> Widget {
    let rules = &field.validation;
    Widget::Number {
        text: value_to_string(value),
        min: rules.min,
        max: rules.max,
        step: rules.step,
    }
}

fn toggle(value: &Value, style: ToggleStyle) -> Widget {
    Widget::Toggle {
        on: value.as_bool().unwrap_or(false),
        style,
    }
}

fn choice(options: &[SelectOption], value: &Value, status: OptionsStatus) -> Widget {
    let mut views = option_views(options, |option| &option.value == value);
    if status == OptionsStatus::Empty {
        views.push(placeholder_option());
    }
    let selected = views.iter().position(|view| view.selected);
    Widget::Choice {
        options: views,
        selected,
        status,
    }
}

fn multi_choice(options: &[SelectOption], value: &Value, status: OptionsStatus, roles: bool) -> Widget {
    let chosen = value.as_array().map(Vec::as_slice).unwrap_or_default();
    let mut views = option_views(options, |option| chosen.contains(&option.value));
    if status == OptionsStatus::Empty {
        views.push(placeholder_option());
    }
    Widget::MultiChoice {
        options: views,
        status,
        roles,
    }
}

fn option_views(options: &[SelectOption], is_selected: impl Fn(&SelectOption) -> bool) -> Vec<OptionView> {
    options
        .iter()
        .map(|option| OptionView {
            value: option.value.clone(),
            label: option.label.clone(),
            selected: is_selected(option),
            placeholder: false,
        })
        .collect()
}

fn placeholder_option() -> OptionView {
    OptionView {
        value: Value::Null,
        label: EMPTY_OPTIONS_LABEL.to_string(),
        selected: false,
        placeholder: true,
    }
}

fn snapshot_for(field: &FieldDescriptor, bound: Option<&OptionSnapshot>) -> OptionSnapshot {
    bound
        .cloned()
        .unwrap_or_else(|| OptionSnapshot::ready(field.options.clone()))
}

fn status_of(snapshot: &OptionSnapshot) -> OptionsStatus {
    if snapshot.is_loading {
        OptionsStatus::Loading
    } else if snapshot.options().is_empty() {
        OptionsStatus::Empty
    } else {
        OptionsStatus::Ready
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn select() -> FieldDescriptor {
        FieldDescriptor::new("channel", "Channel", FieldType::Select).with_options(vec![
            SelectOption::new("web", "Web"),
            SelectOption::new("pos", "Point of sale"),
        ])
    }

    #[test]
    fn password_is_masked_until_revealed() {
        let mut renderer = FieldRenderer::default();
        let field = FieldDescriptor::new("secret", "Secret", FieldType::Password);
        let value = json!("hunter2");

        let control = renderer.render(&field, Some(&value), None, None);
        assert_eq!(control.summary(), "•••••••");

        assert!(renderer.toggle_reveal("secret"));
        let control = renderer.render(&field, Some(&value), None, None);
        assert_eq!(control.summary(), "hunter2");

        renderer.forget("secret");
        assert!(!renderer.is_revealed("secret"));
    }

    #[test]
    fn loading_options_disable_the_control() {
        let renderer = FieldRenderer::default();
        let loading = OptionSnapshot::loading();
        let control = renderer.render(&select(), None, None, Some(&loading));
        assert!(control.disabled);
        assert!(control.is_loading());
    }

    #[test]
    fn loaded_empty_options_show_placeholder() {
        let renderer = FieldRenderer::default();
        let empty = OptionSnapshot::ready(Vec::new());
        let control = renderer.render(&select(), None, None, Some(&empty));
        assert!(!control.disabled);
        match control.widget {
            Widget::Choice {
                options, status, ..
            } => {
                assert_eq!(status, OptionsStatus::Empty);
                assert_eq!(options.len(), 1);
                assert!(options[0].placeholder);
            }
            other => panic!("unexpected widget {other:?}"),
        }
    }

    #[test]
    fn missing_option_list_is_treated_as_empty() {
        let renderer = FieldRenderer::default();
        let unset = OptionSnapshot::default();
        let field = FieldDescriptor::new("roles", "Roles", FieldType::RoleMultiSelect);
        let control = renderer.render(&field, Some(&json!(["admin"])), None, Some(&unset));
        assert!(matches!(
            control.widget,
            Widget::MultiChoice {
                status: OptionsStatus::Empty,
                roles: true,
                ..
            }
        ));
    }

    #[test]
    fn static_options_mark_selection() {
        let renderer = FieldRenderer::default();
        let control = renderer.render(&select(), Some(&json!("pos")), Some("pick one"), None);
        assert_eq!(control.summary(), "Point of sale");
        assert_eq!(control.error.as_deref(), Some("pick one"));
    }

    #[test]
    fn empty_error_is_not_shown() {
        let renderer = FieldRenderer::default();
        let field = FieldDescriptor::new("name", "Name", FieldType::Text);
        let control = renderer.render(&field, None, Some(""), None);
        assert!(control.error.is_none());
    }
}
