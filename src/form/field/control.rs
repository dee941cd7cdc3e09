use serde_json::Value;

use crate::domain::FieldType;

use super::richtext::RichPreview;

/// Concrete, display-ready control for one active field.
#[derive(Debug, Clone, PartialEq)]
pub struct Control {
    pub name: String,
    pub label: String,
    pub field_type: FieldType,
    pub required: bool,
    pub placeholder: Option<String>,
    pub description: Option<String>,
    pub disabled: bool,
    pub error: Option<String>,
    pub widget: Widget,
}

impl Control {
    /// Single-line rendition used by compact views.
    pub fn summary(&self) -> String {
        match &self.widget {
            Widget::Input { text, .. } | Widget::Number { text, .. } => text.clone(),
            Widget::Secret { display, .. } => display.clone(),
            Widget::TextArea { lines, .. } => match lines.len() {
                0 => String::new(),
                1 => lines[0].clone(),
                n => format!("{} (+{} lines)", lines[0], n - 1),
            },
            Widget::RichText { source, .. } => source.lines().next().unwrap_or_default().to_string(),
            Widget::Toggle { on, style } => style.label(*on).to_string(),
            Widget::Choice { options, status, .. } => match status {
                OptionsStatus::Loading => "Loading…".to_string(),
                _ => options
                    .iter()
                    .find(|option| option.selected)
                    .map(|option| option.label.clone())
                    .unwrap_or_default(),
            },
            Widget::MultiChoice { options, status, .. } => match status {
                OptionsStatus::Loading => "Loading…".to_string(),
                _ => options
                    .iter()
                    .filter(|option| option.selected)
                    .map(|option| option.label.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            },
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(
            &self.widget,
            Widget::Choice {
                status: OptionsStatus::Loading,
                ..
            } | Widget::MultiChoice {
                status: OptionsStatus::Loading,
                ..
            }
        )
    }

    pub fn has_popup(&self) -> bool {
        matches!(
            self.widget,
            Widget::Choice { .. } | Widget::MultiChoice { .. }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Text,
    Email,
    Url,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleStyle {
    Checkbox,
    Switch,
}

impl ToggleStyle {
    pub fn label(self, on: bool) -> &'static str {
        match (self, on) {
            (ToggleStyle::Checkbox, true) => "[x]",
            (ToggleStyle::Checkbox, false) => "[ ]",
            (ToggleStyle::Switch, true) => "● on",
            (ToggleStyle::Switch, false) => "○ off",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsStatus {
    Ready,
    Loading,
    /// Loaded but without entries; a placeholder entry is shown instead.
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OptionView {
    pub value: Value,
    pub label: String,
    pub selected: bool,
    pub placeholder: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    Input {
        text: String,
        kind: InputKind,
        max_length: Option<usize>,
    },
    Secret {
        text: String,
        display: String,
        revealed: bool,
    },
    TextArea {
        lines: Vec<String>,
        max_length: Option<usize>,
    },
    RichText {
        source: String,
        preview: RichPreview,
    },
    Number {
        text: String,
        min: Option<f64>,
        max: Option<f64>,
        step: Option<f64>,
    },
    Toggle {
        on: bool,
        style: ToggleStyle,
    },
    Choice {
        options: Vec<OptionView>,
        selected: Option<usize>,
        status: OptionsStatus,
    },
    MultiChoice {
        options: Vec<OptionView>,
        status: OptionsStatus,
        roles: bool,
    },
}
